//! Result-set to record mapping.
//!
//! - [`map_fields`] reconciles result columns with a record type once per load
//! - [`build_targets`] turns a record instance into scan targets once per row

mod field_map;
mod holder;

pub use field_map::{map_fields, FieldMap, MappedField};
pub use holder::build_targets;
