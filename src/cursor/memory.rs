//! In-memory runner.
//!
//! Serves a fixed result set to any query. Failures can be injected at query
//! time, at column introspection or part-way through iteration, which makes it
//! the runner of choice for testing `Record` implementations without a database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{RowCursor, Runner, ScanTargets};
use crate::error_handling::CursorError;
use crate::record::Value;

/// A runner returning the same columns and rows for every query.
///
/// # Example
///
/// ```
/// use rowmap::{MemoryRunner, Value};
///
/// let runner = MemoryRunner::new(&["id", "name"])
///     .row(vec![Value::Int(1), Value::Text("a".into())])
///     .row(vec![Value::Int(2), Value::Text("b".into())]);
/// assert_eq!(runner.open_cursors(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRunner {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    query_error: Option<String>,
    columns_error: Option<String>,
    fail_after: Option<(usize, String)>,
    executed: Mutex<Vec<String>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryRunner {
    /// A runner whose result has the given columns and no rows.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Appends a result row.
    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Makes `query` fail.
    pub fn fail_query(mut self, message: &str) -> Self {
        self.query_error = Some(message.to_string());
        self
    }

    /// Makes `columns` fail.
    pub fn fail_columns(mut self, message: &str) -> Self {
        self.columns_error = Some(message.to_string());
        self
    }

    /// Stops iteration with an error after `rows` rows were yielded.
    pub fn fail_after(mut self, rows: usize, message: &str) -> Self {
        self.fail_after = Some((rows, message.to_string()));
        self
    }

    /// Query texts executed so far, oldest first.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|executed| executed.clone())
            .unwrap_or_default()
    }

    /// Cursors handed out and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Runner for MemoryRunner {
    async fn query<'a>(&'a self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, CursorError> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
        if let Some(message) = &self.query_error {
            return Err(CursorError::Other(message.clone()));
        }

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            columns: self.columns.clone(),
            columns_error: self.columns_error.clone(),
            rows: self.rows.clone().into_iter(),
            current: None,
            fail_after: self.fail_after.clone(),
            yielded: 0,
            error: None,
            open_cursors: Arc::clone(&self.open_cursors),
        }))
    }
}

/// Cursor over a [`MemoryRunner`] result.
#[derive(Debug)]
pub struct MemoryCursor {
    columns: Vec<String>,
    columns_error: Option<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
    current: Option<Vec<Value>>,
    fail_after: Option<(usize, String)>,
    yielded: usize,
    error: Option<CursorError>,
    open_cursors: Arc<AtomicUsize>,
}

#[async_trait]
impl RowCursor for MemoryCursor {
    fn columns(&self) -> Result<Vec<String>, CursorError> {
        match &self.columns_error {
            Some(message) => Err(CursorError::Other(message.clone())),
            None => Ok(self.columns.clone()),
        }
    }

    async fn advance(&mut self) -> bool {
        self.current = None;
        if let Some((limit, message)) = &self.fail_after {
            if self.yielded == *limit {
                self.error = Some(CursorError::Other(message.clone()));
                return false;
            }
        }
        match self.rows.next() {
            Some(row) => {
                self.current = Some(row);
                self.yielded += 1;
                true
            }
            None => false,
        }
    }

    fn scan(&mut self, targets: &mut ScanTargets<'_>) -> Result<(), CursorError> {
        let values = self.current.clone().ok_or(CursorError::NoRow)?;
        targets.assign(values)
    }

    fn take_error(&mut self) -> Option<CursorError> {
        self.error.take()
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ScanTarget;

    #[tokio::test]
    async fn test_cursor_yields_rows_in_order() {
        let runner = MemoryRunner::new(&["n"])
            .row(vec![Value::Int(1)])
            .row(vec![Value::Int(2)]);
        let mut cursor = runner.query("SELECT n").await.unwrap();
        assert_eq!(cursor.columns().unwrap(), vec!["n".to_string()]);

        let mut seen = Vec::new();
        while cursor.advance().await {
            let mut n = 0i64;
            let mut targets = ScanTargets::default();
            targets.push(ScanTarget::Field(&mut n));
            cursor.scan(&mut targets).unwrap();
            drop(targets);
            seen.push(n);
        }
        assert!(cursor.take_error().is_none());
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(runner.executed(), vec!["SELECT n".to_string()]);
    }

    #[tokio::test]
    async fn test_cursor_release_is_tracked() {
        let runner = MemoryRunner::new(&["n"]);
        let cursor = runner.query("SELECT n").await.unwrap();
        assert_eq!(runner.open_cursors(), 1);
        drop(cursor);
        assert_eq!(runner.open_cursors(), 0);
    }

    #[tokio::test]
    async fn test_fail_after_stops_iteration() {
        let runner = MemoryRunner::new(&["n"])
            .row(vec![Value::Int(1)])
            .row(vec![Value::Int(2)])
            .fail_after(1, "connection reset");
        let mut cursor = runner.query("SELECT n").await.unwrap();
        assert!(cursor.advance().await);
        assert!(!cursor.advance().await);
        let err = cursor.take_error().unwrap();
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn test_scan_without_row_fails() {
        let runner = MemoryRunner::new(&["n"]);
        let mut cursor = runner.query("SELECT n").await.unwrap();
        let mut targets = ScanTargets::default();
        assert!(matches!(
            cursor.scan(&mut targets),
            Err(CursorError::NoRow)
        ));
    }
}
