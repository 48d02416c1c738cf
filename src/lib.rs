//! rowmap library: load SQL query results into caller-owned Rust values
//!
//! A [`Select`] binds query text to a [`Runner`]. Its three load methods map
//! result columns onto the fields of a [`Record`] type by name, or scan a
//! single column into a scalar.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use rowmap::{init_db_pool_with_path, FieldSpec, Record, Scannable, Select, SqliteRunner};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     email: Option<String>,
//! }
//!
//! impl Record for User {
//!     fn fields() -> Vec<FieldSpec> {
//!         vec![FieldSpec::new("ID"), FieldSpec::new("Email")]
//!     }
//!
//!     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
//!         vec![&mut self.id, &mut self.email]
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = init_db_pool_with_path(Path::new("./rowmap.db")).await?;
//! let runner = SqliteRunner::new(pool);
//!
//! let mut users: Vec<User> = Vec::new();
//! let count = Select::new(&runner, "SELECT id, email FROM users")
//!     .load_all(&mut users)
//!     .await?;
//! println!("loaded {count} users");
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Loads are async and need a Tokio runtime when used with [`SqliteRunner`].

#![warn(missing_docs)]

pub mod config;
mod cursor;
mod destination;
mod error_handling;
mod events;
pub mod initialization;
mod mapping;
mod record;
mod select;
mod storage;

// Re-export public API
pub use config::{Config, ConfigValidationError, LogFormat, LogLevel};
pub use cursor::{MemoryCursor, MemoryRunner, RowCursor, Runner, ScanTarget, ScanTargets};
pub use destination::{DestinationKind, Identified, RecordSink};
pub use error_handling::{
    CursorError, DatabaseError, InitializationError, LoadError, LoadFailure, LoadMethod,
    LoadStats, LoadStep, MappingError, Operation, QueryTextError,
};
pub use events::{EventReceiver, LogEventReceiver, NullEventReceiver};
pub use mapping::{build_targets, map_fields, FieldMap, MappedField};
pub use record::{
    describe, to_column_name, ConversionError, DescriptorError, FieldKind, FieldSpec, FromValue,
    Record, RecordType, ResolvedField, Scannable, Value,
};
pub use select::{Select, ToQueryText};
pub use storage::{init_db_pool_with_path, SqliteCursor, SqliteRunner};
