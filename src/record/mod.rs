//! Record types: the shapes result rows are loaded into.
//!
//! A record type describes itself through [`Record::fields`] and exposes its
//! loadable fields through [`Record::slots`]. The descriptor turns the field
//! list into a [`RecordType`] with resolved column names.

mod descriptor;
mod value;

pub use descriptor::{describe, to_column_name, DescriptorError, RecordType, ResolvedField};
pub use value::{ConversionError, FromValue, Scannable, Value};

use crate::config::EXCLUDED_COLUMN_TAG;

/// A structure that rows can be loaded into.
///
/// # Example
///
/// ```
/// use rowmap::{FieldSpec, Record, Scannable};
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
///     cache_key: String,
/// }
///
/// impl Record for User {
///     fn fields() -> Vec<FieldSpec> {
///         vec![
///             FieldSpec::new("ID"),
///             FieldSpec::new("Name").column("full_name"),
///             FieldSpec::excluded("CacheKey"),
///         ]
///     }
///
///     fn slots(&mut self) -> Vec<&mut dyn Scannable> {
///         vec![&mut self.id, &mut self.name]
///     }
/// }
/// ```
pub trait Record: Default + Send + 'static {
    /// Field list in declaration order.
    fn fields() -> Vec<FieldSpec>;

    /// One slot per loadable leaf field, in the flattened order of [`fields`].
    ///
    /// Excluded fields have no slot. Embedded records contribute their own
    /// slots at the embedded field's position.
    ///
    /// [`fields`]: Record::fields
    fn slots(&mut self) -> Vec<&mut dyn Scannable>;
}

/// How a declared field takes part in loading.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A leaf field filled from one column
    Column(Option<String>),
    /// Never loaded
    Excluded,
    /// A nested record whose fields are promoted into the parent
    Embedded(fn() -> Vec<FieldSpec>),
}

/// One declared field of a record type.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind,
}

impl FieldSpec {
    /// A field whose column name is derived from `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Column(None),
        }
    }

    /// A field annotated with a column tag.
    ///
    /// `"-"` excludes the field, an empty tag falls back to the derived name.
    pub fn tagged(name: &'static str, tag: &str) -> Self {
        match tag {
            EXCLUDED_COLUMN_TAG => Self::excluded(name),
            "" => Self::new(name),
            column => Self::new(name).column(column),
        }
    }

    /// A field that is never loaded.
    pub fn excluded(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Excluded,
        }
    }

    /// A nested record whose leaf fields load as if declared on the parent.
    pub fn embedded<R: Record>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Embedded(R::fields),
        }
    }

    /// Sets an explicit column name. Empty names are ignored.
    pub fn column(mut self, column: &str) -> Self {
        if let FieldKind::Column(ref mut explicit) = self.kind {
            *explicit = (!column.is_empty()).then(|| column.to_string());
        }
        self
    }

    /// Declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the field takes no part in loading.
    pub fn is_excluded(&self) -> bool {
        matches!(self.kind, FieldKind::Excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_field_specs() {
        assert!(FieldSpec::tagged("Secret", "-").is_excluded());
        assert!(matches!(
            FieldSpec::tagged("Name", "").kind,
            FieldKind::Column(None)
        ));
        match FieldSpec::tagged("Name", "full_name").kind {
            FieldKind::Column(Some(column)) => assert_eq!(column, "full_name"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_column_ignored_on_excluded_field() {
        let spec = FieldSpec::excluded("Secret").column("secret");
        assert!(spec.is_excluded());
        assert_eq!(spec.name(), "Secret");
    }
}
