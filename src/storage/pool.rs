//! SQLite pool setup.
//!
//! The database file is created on first use and every pooled connection
//! runs in WAL mode, so readers do not block on a concurrent writer.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

/// Opens a pool over the SQLite file at `db_path`, creating the file if needed.
///
/// The parent directory must already exist.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => info!("Created empty database {}", db_path.display()),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Using existing database {}", db_path.display())
        }
        Err(e) => {
            error!("Cannot create database {}: {e}", db_path.display());
            return Err(DatabaseError::FileCreationError(format!(
                "{}: {e}",
                db_path.display()
            )));
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePool::connect_with(options).await.map_err(|e| {
        error!("Cannot open database {}: {e}", db_path.display());
        DatabaseError::SqlError(e)
    })?;

    Ok(Arc::new(pool))
}
