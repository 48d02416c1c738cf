//! SQLite runner backed by an sqlx connection pool.
//!
//! Columns come from preparing the statement, so a query that returns no rows
//! still reports its column list. Rows are streamed; the pooled connection is
//! held by the cursor and returned to the pool when the cursor is dropped.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, SqlitePool, Statement, TypeInfo, ValueRef};

use crate::cursor::{RowCursor, Runner, ScanTargets};
use crate::error_handling::CursorError;
use crate::record::Value;

/// Runs queries against a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteRunner {
    pool: Arc<SqlitePool>,
}

impl SqliteRunner {
    /// Wraps a pool, typically one from [`init_db_pool_with_path`](crate::init_db_pool_with_path).
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        self.pool.as_ref()
    }
}

#[async_trait]
impl Runner for SqliteRunner {
    async fn query<'a>(&'a self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>, CursorError> {
        let statement = self.pool.as_ref().prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();
        log::trace!("Prepared statement with columns {:?}", columns);

        Ok(Box::new(SqliteCursor {
            columns,
            rows: sqlx::query(sql).fetch(self.pool.as_ref()),
            current: None,
            error: None,
        }))
    }
}

/// Streaming cursor over a SQLite result.
pub struct SqliteCursor<'a> {
    columns: Vec<String>,
    rows: BoxStream<'a, Result<SqliteRow, sqlx::Error>>,
    current: Option<SqliteRow>,
    error: Option<CursorError>,
}

#[async_trait]
impl<'a> RowCursor for SqliteCursor<'a> {
    fn columns(&self) -> Result<Vec<String>, CursorError> {
        Ok(self.columns.clone())
    }

    async fn advance(&mut self) -> bool {
        self.current = None;
        match self.rows.next().await {
            Some(Ok(row)) => {
                self.current = Some(row);
                true
            }
            Some(Err(e)) => {
                self.error = Some(CursorError::Database(e));
                false
            }
            None => false,
        }
    }

    fn scan(&mut self, targets: &mut ScanTargets<'_>) -> Result<(), CursorError> {
        let row = self.current.as_ref().ok_or(CursorError::NoRow)?;
        let values = (0..row.len())
            .map(|index| decode_value(row, index))
            .collect::<Result<Vec<_>, _>>()?;
        targets.assign(values)
    }

    fn take_error(&mut self) -> Option<CursorError> {
        self.error.take()
    }
}

/// Decodes one column by its SQLite storage class.
fn decode_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();
    match type_name.as_str() {
        "INTEGER" | "INT" | "INT8" | "BIGINT" => row.try_get::<i64, _>(index).map(Value::Int),
        "BOOLEAN" => row.try_get::<bool, _>(index).map(Value::Bool),
        "REAL" | "FLOAT" | "DOUBLE" => row.try_get::<f64, _>(index).map(Value::Float),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(Value::Bytes),
        _ => row.try_get::<String, _>(index).map(Value::Text),
    }
}
