//! Load entry points.

use std::time::Instant;

use log::debug;

use super::Select;
use crate::config::OPERATION_PREFIX;
use crate::cursor::{RowCursor, ScanTarget, ScanTargets};
use crate::destination::RecordSink;
use crate::error_handling::{LoadError, LoadFailure, LoadMethod, LoadStep, Operation};
use crate::events::EventReceiver;
use crate::mapping::{build_targets, map_fields, FieldMap};
use crate::record::{describe, Record, Scannable};

/// Reports the elapsed time of a load when dropped.
struct LoadTimer<'s> {
    receiver: &'s dyn EventReceiver,
    sql: &'s str,
    start: Instant,
}

impl<'s> LoadTimer<'s> {
    fn start(receiver: &'s dyn EventReceiver, sql: &'s str) -> Self {
        Self {
            receiver,
            sql,
            start: Instant::now(),
        }
    }
}

impl Drop for LoadTimer<'_> {
    fn drop(&mut self) {
        self.receiver
            .timing(OPERATION_PREFIX, self.start.elapsed(), self.sql);
    }
}

impl<'a> Select<'a> {
    /// Loads every row into `dest`, one new record per row.
    ///
    /// `Vec` destinations append in row order and keep their prior contents.
    /// Keyed destinations insert by [`Identified::id`], so rows sharing a key
    /// leave only the last one behind. The returned count is the number of
    /// rows read, which can exceed the number of entries a keyed destination
    /// gained.
    ///
    /// On failure the error carries the rows read so far
    /// ([`LoadError::rows_read`]). A query with no rows loads `Ok(0)`.
    ///
    /// # Destination shapes
    ///
    /// Only [`RecordSink`] implementors are accepted. A keyed map needs a
    /// record type that implements [`Identified`]:
    ///
    /// ```no_run
    /// use std::collections::HashMap;
    /// use rowmap::{Identified, MemoryRunner, Select};
    /// # use rowmap::{FieldSpec, Record, Scannable};
    /// # #[derive(Default)]
    /// # struct Tag {
    /// #     id: i64,
    /// # }
    /// # impl Record for Tag {
    /// #     fn fields() -> Vec<FieldSpec> {
    /// #         vec![FieldSpec::new("ID")]
    /// #     }
    /// #     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
    /// #         vec![&mut self.id]
    /// #     }
    /// # }
    ///
    /// impl Identified for Tag {
    ///     type Id = i64;
    ///
    ///     fn id(&self) -> i64 {
    ///         self.id
    ///     }
    /// }
    ///
    /// async fn load(runner: &MemoryRunner) {
    ///     let mut tags: HashMap<i64, Tag> = HashMap::new();
    ///     let _ = Select::new(runner, "SELECT id FROM tags").load_all(&mut tags).await;
    /// }
    /// ```
    ///
    /// Without it, the map is not a destination:
    ///
    /// ```compile_fail
    /// use std::collections::HashMap;
    /// use rowmap::{MemoryRunner, Select};
    /// # use rowmap::{FieldSpec, Record, Scannable};
    /// # #[derive(Default)]
    /// # struct Tag {
    /// #     id: i64,
    /// # }
    /// # impl Record for Tag {
    /// #     fn fields() -> Vec<FieldSpec> {
    /// #         vec![FieldSpec::new("ID")]
    /// #     }
    /// #     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
    /// #         vec![&mut self.id]
    /// #     }
    /// # }
    ///
    /// async fn load(runner: &MemoryRunner) {
    ///     let mut tags: HashMap<i64, Tag> = HashMap::new();
    ///     let _ = Select::new(runner, "SELECT id FROM tags").load_all(&mut tags).await;
    /// }
    /// ```
    ///
    /// Neither is a scalar:
    ///
    /// ```compile_fail
    /// use rowmap::{MemoryRunner, Select};
    ///
    /// async fn load(runner: &MemoryRunner) {
    ///     let mut count = 0i64;
    ///     let _ = Select::new(runner, "SELECT id FROM tags").load_all(&mut count).await;
    /// }
    /// ```
    ///
    /// [`Identified::id`]: crate::Identified::id
    /// [`Identified`]: crate::Identified
    pub async fn load_all<D: RecordSink>(&self, dest: &mut D) -> Result<usize, LoadError> {
        let method = LoadMethod::All;
        let sql = self.query_text(method)?;
        let _timer = LoadTimer::start(self.receiver.as_ref(), &sql);
        let (mut cursor, field_map) = self.open_mapped::<D::Record>(method, &sql).await?;
        debug!(
            "Loading {} into {} destination",
            std::any::type_name::<D::Record>(),
            D::KIND
        );

        let mut rows_read = 0;
        while cursor.advance().await {
            let mut record = dest.new_record();
            let mut targets = build_targets(&mut record, &field_map)
                .map_err(|e| self.fail(method, LoadStep::Holder, &sql, rows_read, e))?;
            cursor
                .scan(&mut targets)
                .map_err(|e| self.fail(method, LoadStep::Scan, &sql, rows_read, e))?;
            drop(targets);
            dest.commit(record);
            rows_read += 1;
        }

        if let Some(err) = cursor.take_error() {
            return Err(self.fail(method, LoadStep::RowsErr, &sql, rows_read, err));
        }
        Ok(rows_read)
    }

    /// Fills `dest` from the first row; later rows are ignored.
    ///
    /// Returns [`LoadError::NotFound`] when the query matches no rows, in
    /// which case `dest` is left untouched.
    ///
    /// `dest` must be a single record; collections go through
    /// [`load_all`](Select::load_all):
    ///
    /// ```compile_fail
    /// use rowmap::{MemoryRunner, Select};
    /// # use rowmap::{FieldSpec, Record, Scannable};
    /// # #[derive(Default)]
    /// # struct Tag {
    /// #     id: i64,
    /// # }
    /// # impl Record for Tag {
    /// #     fn fields() -> Vec<FieldSpec> {
    /// #         vec![FieldSpec::new("ID")]
    /// #     }
    /// #     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
    /// #         vec![&mut self.id]
    /// #     }
    /// # }
    ///
    /// async fn load(runner: &MemoryRunner) {
    ///     let mut tags: Vec<Tag> = Vec::new();
    ///     let _ = Select::new(runner, "SELECT id FROM tags").load_one(&mut tags).await;
    /// }
    /// ```
    pub async fn load_one<R: Record>(&self, dest: &mut R) -> Result<(), LoadError> {
        let method = LoadMethod::One;
        let sql = self.query_text(method)?;
        let _timer = LoadTimer::start(self.receiver.as_ref(), &sql);
        let (mut cursor, field_map) = self.open_mapped::<R>(method, &sql).await?;

        if cursor.advance().await {
            let mut targets = build_targets(dest, &field_map)
                .map_err(|e| self.fail(method, LoadStep::Holder, &sql, 0, e))?;
            cursor
                .scan(&mut targets)
                .map_err(|e| self.fail(method, LoadStep::Scan, &sql, 0, e))?;
            return Ok(());
        }

        if let Some(err) = cursor.take_error() {
            return Err(self.fail(method, LoadStep::RowsErr, &sql, 0, err));
        }
        Err(LoadError::NotFound)
    }

    /// Scans the first column of the first row into `dest`.
    ///
    /// For aggregate-style queries (`SELECT count(*) ...`) where no record
    /// mapping applies. Further columns are discarded. Returns
    /// [`LoadError::NotFound`] when the query matches no rows.
    ///
    /// Records are not scalars and must be loaded with
    /// [`load_one`](Select::load_one):
    ///
    /// ```compile_fail
    /// use rowmap::{MemoryRunner, Select};
    /// # use rowmap::{FieldSpec, Record, Scannable};
    /// # #[derive(Default)]
    /// # struct Tag {
    /// #     id: i64,
    /// # }
    /// # impl Record for Tag {
    /// #     fn fields() -> Vec<FieldSpec> {
    /// #         vec![FieldSpec::new("ID")]
    /// #     }
    /// #     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
    /// #         vec![&mut self.id]
    /// #     }
    /// # }
    ///
    /// async fn load(runner: &MemoryRunner) {
    ///     let mut tag = Tag::default();
    ///     let _ = Select::new(runner, "SELECT id FROM tags").load_value(&mut tag).await;
    /// }
    /// ```
    pub async fn load_value<V: Scannable>(&self, dest: &mut V) -> Result<(), LoadError> {
        let method = LoadMethod::Value;
        let sql = self.query_text(method)?;
        let _timer = LoadTimer::start(self.receiver.as_ref(), &sql);
        let mut cursor = self
            .runner
            .query(&sql)
            .await
            .map_err(|e| self.fail(method, LoadStep::Query, &sql, 0, e))?;
        let column_count = cursor
            .columns()
            .map_err(|e| self.fail(method, LoadStep::Columns, &sql, 0, e))?
            .len();

        if cursor.advance().await {
            let mut targets = ScanTargets::with_capacity(column_count.max(1));
            targets.push(ScanTarget::Field(dest));
            for _ in 1..column_count {
                targets.push(ScanTarget::Discard);
            }
            cursor
                .scan(&mut targets)
                .map_err(|e| self.fail(method, LoadStep::Scan, &sql, 0, e))?;
            return Ok(());
        }

        if let Some(err) = cursor.take_error() {
            return Err(self.fail(method, LoadStep::RowsErr, &sql, 0, err));
        }
        Err(LoadError::NotFound)
    }

    fn query_text(&self, method: LoadMethod) -> Result<String, LoadError> {
        self.query
            .to_query_text()
            .map_err(|e| self.fail(method, LoadStep::QueryText, "", 0, e))
    }

    /// Describes `R`, executes the query and maps its columns onto `R`.
    async fn open_mapped<'s, R: Record>(
        &'s self,
        method: LoadMethod,
        sql: &'s str,
    ) -> Result<(Box<dyn RowCursor + 's>, FieldMap), LoadError> {
        let record_type =
            describe::<R>().map_err(|e| self.fail(method, LoadStep::Describe, sql, 0, e))?;
        let cursor = self
            .runner
            .query(sql)
            .await
            .map_err(|e| self.fail(method, LoadStep::Query, sql, 0, e))?;
        let columns = cursor
            .columns()
            .map_err(|e| self.fail(method, LoadStep::Columns, sql, 0, e))?;
        let field_map = map_fields(&record_type, &columns, self.tolerant)
            .map_err(|e| self.fail(method, LoadStep::FieldMap, sql, 0, e))?;
        Ok((cursor, field_map))
    }

    /// Tags `failure` with its operation, reports it and wraps it.
    fn fail(
        &self,
        method: LoadMethod,
        step: LoadStep,
        sql: &str,
        rows_read: usize,
        failure: impl Into<LoadFailure>,
    ) -> LoadError {
        let operation = Operation::new(method, step);
        let source = failure.into();
        self.receiver.event_err(operation, sql, &source);
        LoadError::Failed {
            operation,
            sql: sql.to_string(),
            rows_read,
            source,
        }
    }
}
