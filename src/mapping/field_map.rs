//! Column-to-field mapping.
//!
//! The query's columns decide what is read; the record type's loadable fields
//! decide what must be provided. Extra columns are dropped, missing fields are
//! an error unless the load is tolerant.

use crate::error_handling::MappingError;
use crate::record::{RecordType, ResolvedField};

/// Field fed by one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    /// Slot index in the record's `slots()`
    pub slot: usize,
    /// Dotted field path, for diagnostics
    pub path: String,
}

/// Result-column index to field correspondence for one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<Option<MappedField>>,
    slot_count: usize,
}

impl FieldMap {
    /// One entry per result column; `None` for dropped columns.
    pub fn entries(&self) -> &[Option<MappedField>] {
        &self.entries
    }

    /// Number of result columns.
    pub fn column_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of slots the record type declares.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of columns that feed a field.
    pub fn mapped_count(&self) -> usize {
        self.entries.iter().flatten().count()
    }
}

/// Maps each result column onto the record field with the same column name.
///
/// Names compare case-insensitively. When several columns share a name, the
/// first one feeds the field and the rest are dropped. With `tolerant` unset,
/// the first loadable field (in declaration order) with no column fails the
/// mapping.
pub fn map_fields(
    record_type: &RecordType,
    columns: &[String],
    tolerant: bool,
) -> Result<FieldMap, MappingError> {
    let mut filled = vec![false; record_type.slot_count()];
    let entries: Vec<Option<MappedField>> = columns
        .iter()
        .map(|column| {
            record_type
                .field_for_column(column)
                .filter(|field| !std::mem::replace(&mut filled[field.slot], true))
                .map(|field| MappedField {
                    slot: field.slot,
                    path: field.path.clone(),
                })
        })
        .collect();

    if !tolerant {
        let missing: Option<&ResolvedField> = record_type
            .fields()
            .iter()
            .find(|field| !filled[field.slot]);
        if let Some(field) = missing {
            return Err(MappingError::UnmappedField {
                field: field.path.clone(),
                column: field.column.clone(),
            });
        }
    }

    let dropped = entries.iter().filter(|e| e.is_none()).count();
    if dropped > 0 {
        log::trace!("Dropping {} result columns with no matching field", dropped);
    }

    Ok(FieldMap {
        entries,
        slot_count: record_type.slot_count(),
    })
}
