//! Scan target construction.

use crate::cursor::{ScanTarget, ScanTargets};
use crate::error_handling::MappingError;
use crate::record::{Record, Scannable};

use super::field_map::FieldMap;

/// Builds the scan targets for one row of `record`.
///
/// Each mapped column receives the matching field slot, dropped columns a
/// discard target. Works the same for a freshly allocated record and for one
/// supplied by the caller.
pub fn build_targets<'r, R: Record>(
    record: &'r mut R,
    field_map: &FieldMap,
) -> Result<ScanTargets<'r>, MappingError> {
    let mut slots: Vec<Option<&'r mut dyn Scannable>> =
        record.slots().into_iter().map(Some).collect();
    if slots.len() != field_map.slot_count() {
        return Err(MappingError::FieldAccess {
            path: std::any::type_name::<R>().to_string(),
            detail: format!(
                "record exposes {} slots but declares {} loadable fields",
                slots.len(),
                field_map.slot_count()
            ),
        });
    }

    let mut targets = ScanTargets::with_capacity(field_map.column_count());
    for entry in field_map.entries() {
        let target = match entry {
            None => ScanTarget::Discard,
            Some(field) => {
                let slot = slots
                    .get_mut(field.slot)
                    .and_then(Option::take)
                    .ok_or_else(|| MappingError::FieldAccess {
                        path: field.path.clone(),
                        detail: format!("slot {} is not available", field.slot),
                    })?;
                ScanTarget::Field(slot)
            }
        };
        targets.push(target);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::map_fields;
    use crate::record::{describe, FieldSpec, Value};

    #[derive(Debug, Default)]
    struct Pair {
        left: i64,
        right: String,
    }

    impl Record for Pair {
        fn fields() -> Vec<FieldSpec> {
            vec![FieldSpec::new("Left"), FieldSpec::new("Right")]
        }

        fn slots(&mut self) -> Vec<&mut dyn Scannable> {
            vec![&mut self.left, &mut self.right]
        }
    }

    #[derive(Debug, Default)]
    struct Broken {
        left: i64,
    }

    impl Record for Broken {
        fn fields() -> Vec<FieldSpec> {
            vec![FieldSpec::new("Left"), FieldSpec::new("Right")]
        }

        fn slots(&mut self) -> Vec<&mut dyn Scannable> {
            vec![&mut self.left]
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_targets_follow_column_order() {
        let record_type = describe::<Pair>().unwrap();
        let map = map_fields(&record_type, &columns(&["right", "extra", "left"]), false).unwrap();
        let mut pair = Pair::default();
        let mut targets = build_targets(&mut pair, &map).unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets.field_count(), 2);
        targets
            .assign(vec![
                Value::Text("r".into()),
                Value::Int(99),
                Value::Int(5),
            ])
            .unwrap();
        drop(targets);
        assert_eq!(pair.left, 5);
        assert_eq!(pair.right, "r");
    }

    #[test]
    fn test_existing_record_is_overwritten_in_place() {
        let record_type = describe::<Pair>().unwrap();
        let map = map_fields(&record_type, &columns(&["left"]), true).unwrap();
        let mut pair = Pair {
            left: 1,
            right: "kept".into(),
        };
        let mut targets = build_targets(&mut pair, &map).unwrap();
        targets.assign(vec![Value::Int(2)]).unwrap();
        drop(targets);
        assert_eq!(pair.left, 2);
        assert_eq!(pair.right, "kept");
    }

    #[test]
    fn test_slot_mismatch_is_field_access_error() {
        let record_type = describe::<Broken>().unwrap();
        let map = map_fields(&record_type, &columns(&["left", "right"]), false).unwrap();
        let mut broken = Broken::default();
        let err = build_targets(&mut broken, &map).err().unwrap();
        assert!(matches!(err, MappingError::FieldAccess { .. }));
    }
}
