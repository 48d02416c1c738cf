//! Select loads.
//!
//! A [`Select`] pairs a query with the runner that executes it. Its load
//! methods decide how result rows land in the caller's destination:
//! - [`Select::load_all`] appends or inserts one record per row
//! - [`Select::load_one`] fills one caller-owned record from the first row
//! - [`Select::load_value`] scans the first column of the first row into a scalar

mod load;

use std::sync::Arc;

use crate::cursor::Runner;
use crate::error_handling::QueryTextError;
use crate::events::{EventReceiver, NullEventReceiver};

/// Source of the final, fully interpolated query text.
pub trait ToQueryText: Send + Sync {
    /// The query text to execute.
    fn to_query_text(&self) -> Result<String, QueryTextError>;
}

impl ToQueryText for str {
    fn to_query_text(&self) -> Result<String, QueryTextError> {
        if self.trim().is_empty() {
            return Err(QueryTextError::Empty);
        }
        Ok(self.to_string())
    }
}

impl ToQueryText for String {
    fn to_query_text(&self) -> Result<String, QueryTextError> {
        self.as_str().to_query_text()
    }
}

impl<T: ToQueryText + ?Sized> ToQueryText for &T {
    fn to_query_text(&self) -> Result<String, QueryTextError> {
        (**self).to_query_text()
    }
}

/// A query bound to a runner, ready to load.
///
/// # Example
///
/// ```
/// use rowmap::{FieldSpec, MemoryRunner, Record, Scannable, Select, Value};
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Record for User {
///     fn fields() -> Vec<FieldSpec> {
///         vec![FieldSpec::new("ID"), FieldSpec::new("Name")]
///     }
///
///     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
///         vec![&mut self.id, &mut self.name]
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), rowmap::LoadError> {
/// let runner = MemoryRunner::new(&["id", "name"])
///     .row(vec![Value::Int(1), Value::Text("a".into())])
///     .row(vec![Value::Int(2), Value::Text("b".into())]);
///
/// let mut users: Vec<User> = Vec::new();
/// let count = Select::new(&runner, "SELECT id, name FROM users")
///     .load_all(&mut users)
///     .await?;
/// assert_eq!(count, 2);
/// assert_eq!(users[1].name, "b");
/// # Ok(())
/// # }
/// ```
pub struct Select<'a> {
    runner: &'a dyn Runner,
    query: Box<dyn ToQueryText + 'a>,
    receiver: Arc<dyn EventReceiver>,
    tolerant: bool,
}

impl<'a> Select<'a> {
    /// Binds `query` to `runner`. Events are dropped and mapping is strict
    /// until configured otherwise.
    pub fn new<Q: ToQueryText + 'a>(runner: &'a dyn Runner, query: Q) -> Self {
        Self {
            runner,
            query: Box::new(query),
            receiver: Arc::new(NullEventReceiver),
            tolerant: false,
        }
    }

    /// Reports timings and failures to `receiver`.
    pub fn with_receiver(mut self, receiver: Arc<dyn EventReceiver>) -> Self {
        self.receiver = receiver;
        self
    }

    /// Leaves record fields without a matching column at their default value
    /// instead of failing the load.
    pub fn tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text_rejects_blank() {
        assert_eq!("  ".to_query_text(), Err(QueryTextError::Empty));
        assert_eq!(String::new().to_query_text(), Err(QueryTextError::Empty));
        assert_eq!(
            (&"SELECT 1").to_query_text(),
            Ok("SELECT 1".to_string())
        );
    }
}
