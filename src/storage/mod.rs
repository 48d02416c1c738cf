// storage/mod.rs
// SQLite pool setup and the sqlx-backed runner

pub mod pool;
pub mod sqlite;

// Re-export commonly used items
pub use pool::init_db_pool_with_path;
pub use sqlite::{SqliteCursor, SqliteRunner};
