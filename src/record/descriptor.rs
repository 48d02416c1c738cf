//! Record type descriptor.
//!
//! Flattens a record's declared fields into leaf fields with resolved column
//! names and slot positions. Results are cached per Rust type.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use thiserror::Error;

use super::{FieldKind, FieldSpec, Record};

static RECORD_TYPES: LazyLock<RwLock<HashMap<TypeId, Arc<RecordType>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Failure describing a record type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DescriptorError {
    /// Two fields resolve to the same column name.
    #[error("fields {first} and {second} both map to column {column:?}")]
    AmbiguousColumn {
        column: String,
        first: String,
        second: String,
    },
}

/// A loadable leaf field with its resolved column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Dotted field path, e.g. `Address.City`
    pub path: String,
    /// Resolved column name
    pub column: String,
    /// Position in [`Record::slots`]
    pub slot: usize,
}

/// The loadable shape of a record type.
#[derive(Debug, Clone, Default)]
pub struct RecordType {
    fields: Vec<ResolvedField>,
    excluded: Vec<String>,
    by_column: HashMap<String, usize>,
}

impl RecordType {
    /// Builds the descriptor from a declared field list.
    pub fn from_fields(fields: Vec<FieldSpec>) -> Result<Self, DescriptorError> {
        let mut record_type = RecordType::default();
        record_type.flatten("", fields)?;
        Ok(record_type)
    }

    fn flatten(&mut self, prefix: &str, fields: Vec<FieldSpec>) -> Result<(), DescriptorError> {
        for spec in fields {
            let path = format!("{}{}", prefix, spec.name);
            match spec.kind {
                FieldKind::Excluded => self.excluded.push(path),
                FieldKind::Embedded(nested) => self.flatten(&format!("{}.", path), nested())?,
                FieldKind::Column(explicit) => {
                    let column = explicit.unwrap_or_else(|| to_column_name(spec.name));
                    let key = column.to_lowercase();
                    if let Some(&existing) = self.by_column.get(&key) {
                        return Err(DescriptorError::AmbiguousColumn {
                            column,
                            first: self.fields[existing].path.clone(),
                            second: path,
                        });
                    }
                    let slot = self.fields.len();
                    self.by_column.insert(key, slot);
                    self.fields.push(ResolvedField { path, column, slot });
                }
            }
        }
        Ok(())
    }

    /// Loadable leaf fields in slot order.
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Paths of excluded fields.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Number of slots a record of this type must expose.
    pub fn slot_count(&self) -> usize {
        self.fields.len()
    }

    /// Finds the field for a result column, ignoring ASCII and Unicode case.
    pub fn field_for_column(&self, column: &str) -> Option<&ResolvedField> {
        self.by_column
            .get(&column.to_lowercase())
            .map(|&slot| &self.fields[slot])
    }
}

/// Describes `R`, reusing a cached descriptor when one exists.
pub fn describe<R: Record>() -> Result<Arc<RecordType>, DescriptorError> {
    let type_id = TypeId::of::<R>();
    if let Ok(cache) = RECORD_TYPES.read() {
        if let Some(record_type) = cache.get(&type_id) {
            return Ok(Arc::clone(record_type));
        }
    }

    let record_type = Arc::new(RecordType::from_fields(R::fields())?);
    log::trace!(
        "Described {} with {} loadable fields",
        std::any::type_name::<R>(),
        record_type.slot_count()
    );
    match RECORD_TYPES.write() {
        Ok(mut cache) => Ok(Arc::clone(cache.entry(type_id).or_insert(record_type))),
        Err(_) => Ok(record_type),
    }
}

/// Derives a column name from a field identifier.
///
/// Camel case becomes snake case with acronyms kept together:
/// `ID` → `id`, `UserID` → `user_id`, `HTTPServer` → `http_server`.
/// Identifiers that are already snake case come back unchanged.
pub fn to_column_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        out.extend(c.to_lowercase());
        let Some(&next) = chars.get(i + 1) else {
            break;
        };
        let boundary = next.is_uppercase()
            && (c.is_lowercase()
                || c.is_ascii_digit()
                || chars.get(i + 2).is_some_and(|after| after.is_lowercase()));
        if boundary {
            out.push('_');
        }
    }
    out
}
