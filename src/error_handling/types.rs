//! Error type definitions.
//!
//! This module defines the errors returned by loads, the operation identifiers
//! they are tagged with, and the errors raised while initializing logging and
//! the database pool.

use std::fmt;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::OPERATION_PREFIX;
use crate::record::{ConversionError, DescriptorError};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// The public load entry point an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum LoadMethod {
    /// `load_all`
    All,
    /// `load_one`
    One,
    /// `load_value`
    Value,
}

impl LoadMethod {
    /// Name used in operation identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadMethod::All => "load_all",
            LoadMethod::One => "load_one",
            LoadMethod::Value => "load_value",
        }
    }
}

/// The step of a load that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum LoadStep {
    /// Producing the query text
    QueryText,
    /// Describing the record type
    Describe,
    /// Executing the query
    Query,
    /// Reading the result columns
    Columns,
    /// Mapping columns to fields
    FieldMap,
    /// Building scan targets
    Holder,
    /// Scanning a row
    Scan,
    /// Iterating the cursor
    RowsErr,
}

impl LoadStep {
    /// Name used in operation identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStep::QueryText => "query_text",
            LoadStep::Describe => "describe",
            LoadStep::Query => "query",
            LoadStep::Columns => "columns",
            LoadStep::FieldMap => "field_map",
            LoadStep::Holder => "holder",
            LoadStep::Scan => "scan",
            LoadStep::RowsErr => "rows_err",
        }
    }
}

/// Identifies where a load failed, e.g. `select.load_all.scan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Entry point
    pub method: LoadMethod,
    /// Failing step
    pub step: LoadStep,
}

impl Operation {
    /// Creates an operation identifier.
    pub fn new(method: LoadMethod, step: LoadStep) -> Self {
        Self { method, step }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            OPERATION_PREFIX,
            self.method.as_str(),
            self.step.as_str()
        )
    }
}

/// Failure producing the final query text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryTextError {
    /// Nothing to execute.
    #[error("query text is empty")]
    Empty,

    /// The query builder rejected its input.
    #[error("invalid query: {0}")]
    Invalid(String),
}

/// Failure reconciling result columns with a record type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MappingError {
    /// A loadable field has no matching result column.
    #[error("field {field} has no matching column {column:?} in the result set")]
    UnmappedField { field: String, column: String },

    /// A mapped field could not be addressed on the record instance.
    #[error("cannot address field {path}: {detail}")]
    FieldAccess { path: String, detail: String },
}

/// Failure reported by a runner or row cursor.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum CursorError {
    /// Error from the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A column value could not be stored in its target.
    #[error("column {column}: {source}")]
    Conversion {
        column: usize,
        #[source]
        source: ConversionError,
    },

    /// The number of scan targets does not match the number of columns.
    #[error("expected {expected} scan targets, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    /// `scan` was called before `advance` returned a row.
    #[error("no current row to scan")]
    NoRow,

    /// Any other driver failure.
    #[error("{0}")]
    Other(String),
}

/// The underlying cause of a failed load.
#[derive(Error, Debug)]
pub enum LoadFailure {
    /// Query text could not be produced
    #[error(transparent)]
    QueryText(#[from] QueryTextError),

    /// Record type could not be described
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Columns could not be reconciled with the record type
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Runner or cursor failure
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Error returned by the load entry points.
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum LoadError {
    /// The query returned no rows (`load_one`, `load_value`).
    #[error("no rows found")]
    NotFound,

    /// A step of the load failed.
    #[error("{operation} failed after {rows_read} rows: {source}")]
    Failed {
        operation: Operation,
        sql: String,
        rows_read: usize,
        #[source]
        source: LoadFailure,
    },
}

impl LoadError {
    /// Whether the query simply matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound)
    }

    /// Operation that failed, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            LoadError::NotFound => None,
            LoadError::Failed { operation, .. } => Some(*operation),
        }
    }

    /// Rows read before the failure.
    pub fn rows_read(&self) -> usize {
        match self {
            LoadError::NotFound => 0,
            LoadError::Failed { rows_read, .. } => *rows_read,
        }
    }

    /// Query text the failure happened on.
    pub fn sql(&self) -> Option<&str> {
        match self {
            LoadError::NotFound => None,
            LoadError::Failed { sql, .. } => Some(sql),
        }
    }

    /// Underlying cause.
    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            LoadError::NotFound => None,
            LoadError::Failed { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_operation_display() {
        assert_eq!(
            Operation::new(LoadMethod::All, LoadStep::Query).to_string(),
            "select.load_all.query"
        );
        assert_eq!(
            Operation::new(LoadMethod::One, LoadStep::RowsErr).to_string(),
            "select.load_one.rows_err"
        );
        assert_eq!(
            Operation::new(LoadMethod::Value, LoadStep::Scan).to_string(),
            "select.load_value.scan"
        );
    }

    #[test]
    fn test_all_steps_have_string_representation() {
        for step in LoadStep::iter() {
            assert!(!step.as_str().is_empty(), "{:?} should have a name", step);
        }
        for method in LoadMethod::iter() {
            assert!(method.as_str().starts_with("load_"));
        }
    }

    #[test]
    fn test_not_found_is_distinguished() {
        let err = LoadError::NotFound;
        assert!(err.is_not_found());
        assert_eq!(err.operation(), None);
        assert_eq!(err.rows_read(), 0);
    }

    #[test]
    fn test_failed_carries_context() {
        let err = LoadError::Failed {
            operation: Operation::new(LoadMethod::All, LoadStep::FieldMap),
            sql: "SELECT id FROM users".into(),
            rows_read: 0,
            source: MappingError::UnmappedField {
                field: "Name".into(),
                column: "name".into(),
            }
            .into(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.sql(), Some("SELECT id FROM users"));
        assert_eq!(
            err.to_string(),
            "select.load_all.field_map failed after 0 rows: \
             field Name has no matching column \"name\" in the result set"
        );
        assert!(matches!(
            err.failure(),
            Some(LoadFailure::Mapping(MappingError::UnmappedField { .. }))
        ));
    }

    #[test]
    fn test_cursor_error_conversion_message() {
        let err = CursorError::Conversion {
            column: 1,
            source: ConversionError::UnexpectedNull { expected: "String" },
        };
        assert_eq!(err.to_string(), "column 1: unexpected NULL for String field");
    }
}
