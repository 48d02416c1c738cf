//! Query execution collaborators.
//!
//! The loader never talks to a database directly. It asks a [`Runner`] to
//! execute the final query text and drives the [`RowCursor`] it gets back:
//! - `columns()` once, before the first row
//! - `advance()` until it returns `false`
//! - `scan()` after each successful `advance()`
//! - `take_error()` after iteration stops
//!
//! A cursor is released when it is dropped, so every exit path of a load
//! (success, early error return, unwinding) gives it back.

mod memory;

use async_trait::async_trait;

use crate::error_handling::CursorError;
use crate::record::{Scannable, Value};

pub use memory::{MemoryCursor, MemoryRunner};

/// Executes query text and hands back a cursor over the result.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Execute `sql` and return a cursor positioned before the first row.
    async fn query<'a>(&'a self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, CursorError>;
}

/// Forward-only iteration over a query result.
#[async_trait]
pub trait RowCursor: Send {
    /// Result column names in result order.
    fn columns(&self) -> Result<Vec<String>, CursorError>;

    /// Move to the next row. Returns `false` when the result is exhausted or
    /// iteration failed; check [`take_error`](RowCursor::take_error) afterwards.
    async fn advance(&mut self) -> bool;

    /// Store the current row into `targets`, one target per column.
    fn scan(&mut self, targets: &mut ScanTargets<'_>) -> Result<(), CursorError>;

    /// The error that stopped iteration, if any.
    fn take_error(&mut self) -> Option<CursorError>;
}

/// Where one result column goes.
pub enum ScanTarget<'r> {
    /// A field of the record being loaded
    Field(&'r mut dyn Scannable),
    /// A column no field consumes
    Discard,
}

/// Scan targets for one row, aligned with the result columns.
#[derive(Default)]
pub struct ScanTargets<'r> {
    targets: Vec<ScanTarget<'r>>,
}

impl<'r> ScanTargets<'r> {
    /// Empty target list with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            targets: Vec::with_capacity(capacity),
        }
    }

    /// Appends the target for the next column.
    pub fn push(&mut self, target: ScanTarget<'r>) {
        self.targets.push(target);
    }

    /// Number of targets, one per column.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets were added.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of targets that write into a field.
    pub fn field_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t, ScanTarget::Field(_)))
            .count()
    }

    /// Writes one row of values into the targets.
    ///
    /// Fails without writing anything if the value count does not match the
    /// target count; conversion failures stop at the first bad column.
    pub fn assign(&mut self, values: Vec<Value>) -> Result<(), CursorError> {
        if values.len() != self.targets.len() {
            return Err(CursorError::ColumnCount {
                expected: values.len(),
                actual: self.targets.len(),
            });
        }
        for (column, (target, value)) in self.targets.iter_mut().zip(values).enumerate() {
            if let ScanTarget::Field(field) = target {
                field
                    .scan_value(value)
                    .map_err(|source| CursorError::Conversion { column, source })?;
            }
        }
        Ok(())
    }
}
