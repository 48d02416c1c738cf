//! Column values and scalar conversions.
//!
//! Every driver hands column data to the loader as a [`Value`]. Record fields
//! receive it through [`Scannable`], which is implemented for every type that
//! knows how to build itself from a `Value` ([`FromValue`]).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text layouts accepted for timestamp columns stored as TEXT.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A single column value as produced by a row cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// Any integer column (stored as 64-bit signed)
    Int(i64),
    /// Any floating point column
    Float(f64),
    /// Text column
    Text(String),
    /// Binary column
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if value is NULL
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Int(_) => "INTEGER",
            Self::Float(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Bytes(_) => "BLOB",
        }
    }
}

/// Failure converting a column value into a field type.
#[derive(Error, Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ConversionError {
    /// The column was NULL but the field cannot hold NULL.
    #[error("unexpected NULL for {expected} field")]
    UnexpectedNull { expected: &'static str },

    /// The column type cannot be converted into the field type.
    #[error("cannot convert {found} column into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The integer does not fit into the field type.
    #[error("integer {value} out of range for {expected}")]
    OutOfRange { expected: &'static str, value: i64 },

    /// The float overflows the field type.
    #[error("float {value} out of range for {expected}")]
    FloatOutOfRange { expected: &'static str, value: f64 },

    /// The text could not be parsed into the field type.
    #[error("cannot parse {value:?} as {expected}")]
    Parse { expected: &'static str, value: String },
}

/// Builds a field value from a column value.
pub trait FromValue: Sized {
    /// Converts the column value, consuming it.
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

/// A location that can receive one column value.
///
/// Record types hand out `&mut dyn Scannable` references to their fields; the
/// loader writes each scanned column through one of them.
pub trait Scannable: Send {
    /// Overwrites the target with the converted column value.
    fn scan_value(&mut self, value: Value) -> Result<(), ConversionError>;
}

impl<T: FromValue + Send> Scannable for T {
    fn scan_value(&mut self, value: Value) -> Result<(), ConversionError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    if value.is_null() {
        ConversionError::UnexpectedNull { expected }
    } else {
        ConversionError::TypeMismatch {
            expected,
            found: value.type_name(),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Bool(b) => Ok(i64::from(b)),
            Value::Text(ref s) => s.trim().parse().map_err(|_| ConversionError::Parse {
                expected: "i64",
                value: s.clone(),
            }),
            other => Err(mismatch("i64", &other)),
        }
    }
}

macro_rules! from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    let wide = i64::from_value(value).map_err(|e| match e {
                        ConversionError::UnexpectedNull { .. } => {
                            ConversionError::UnexpectedNull { expected: stringify!($ty) }
                        }
                        ConversionError::TypeMismatch { found, .. } => {
                            ConversionError::TypeMismatch { expected: stringify!($ty), found }
                        }
                        ConversionError::Parse { value, .. } => {
                            ConversionError::Parse { expected: stringify!($ty), value }
                        }
                        other => other,
                    })?;
                    <$ty>::try_from(wide).map_err(|_| ConversionError::OutOfRange {
                        expected: stringify!($ty),
                        value: wide,
                    })
                }
            }
        )*
    };
}

from_value_int!(i8, i16, i32, u8, u16, u32, u64, usize);

/// Integers up to 2^53 in magnitude convert to `f64` exactly.
const F64_EXACT_INT: u64 = 1 << f64::MANTISSA_DIGITS;

/// Integers up to 2^24 in magnitude convert to `f32` exactly.
const F32_EXACT_INT: u64 = 1 << f32::MANTISSA_DIGITS;

/// Integer columns are accepted only when the float holds them exactly.
impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) if i.unsigned_abs() <= F64_EXACT_INT => Ok(i as f64),
            Value::Int(i) => Err(ConversionError::OutOfRange {
                expected: "f64",
                value: i,
            }),
            Value::Text(ref s) => s.trim().parse().map_err(|_| ConversionError::Parse {
                expected: "f64",
                value: s.clone(),
            }),
            other => Err(mismatch("f64", &other)),
        }
    }
}

/// Float columns are rounded to the nearest `f32`; values beyond its range
/// are rejected. Integer columns must convert exactly.
impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => {
                let narrow = f as f32;
                if f.is_finite() && narrow.is_infinite() {
                    return Err(ConversionError::FloatOutOfRange {
                        expected: "f32",
                        value: f,
                    });
                }
                Ok(narrow)
            }
            Value::Int(i) if i.unsigned_abs() <= F32_EXACT_INT => Ok(i as f32),
            Value::Int(i) => Err(ConversionError::OutOfRange {
                expected: "f32",
                value: i,
            }),
            Value::Text(ref s) => s.trim().parse().map_err(|_| ConversionError::Parse {
                expected: "f32",
                value: s.clone(),
            }),
            other => Err(mismatch("f32", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Int(i) => Err(ConversionError::OutOfRange {
                expected: "bool",
                value: i,
            }),
            Value::Text(ref s) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(ConversionError::Parse {
                    expected: "bool",
                    value: s.clone(),
                }),
            },
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Bytes(bytes) => String::from_utf8(bytes).map_err(|e| ConversionError::Parse {
                expected: "String",
                value: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }),
            Value::Null => Err(ConversionError::UnexpectedNull { expected: "String" }),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("Vec<u8>", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(ref s) => DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .ok_or_else(|| ConversionError::Parse {
                    expected: "NaiveDateTime",
                    value: s.clone(),
                }),
            // Integer timestamps are milliseconds since the Unix epoch
            Value::Int(ms) => DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.naive_utc())
                .ok_or(ConversionError::OutOfRange {
                    expected: "NaiveDateTime",
                    value: ms,
                }),
            other => Err(mismatch("NaiveDateTime", &other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        if let Value::Text(ref s) = value {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
        NaiveDateTime::from_value(value).map(|naive| Utc.from_utc_datetime(&naive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions() {
        assert_eq!(i64::from_value(Value::Int(42)), Ok(42));
        assert_eq!(i32::from_value(Value::Int(-7)), Ok(-7));
        assert_eq!(u16::from_value(Value::Text(" 80 ".into())), Ok(80));
        assert_eq!(
            u8::from_value(Value::Int(300)),
            Err(ConversionError::OutOfRange {
                expected: "u8",
                value: 300
            })
        );
        assert_eq!(
            u32::from_value(Value::Null),
            Err(ConversionError::UnexpectedNull { expected: "u32" })
        );
    }

    #[test]
    fn test_float_conversions_reject_lossy_integers() {
        assert_eq!(f64::from_value(Value::Int(1 << 53)), Ok(9_007_199_254_740_992.0));
        assert_eq!(
            f64::from_value(Value::Int((1 << 53) + 1)),
            Err(ConversionError::OutOfRange {
                expected: "f64",
                value: (1 << 53) + 1
            })
        );
        assert_eq!(f32::from_value(Value::Int(-(1 << 24))), Ok(-16_777_216.0));
        assert_eq!(
            f32::from_value(Value::Int(16_777_217)),
            Err(ConversionError::OutOfRange {
                expected: "f32",
                value: 16_777_217
            })
        );
    }

    #[test]
    fn test_f32_rounds_floats_within_range() {
        assert_eq!(f32::from_value(Value::Float(0.1)), Ok(0.1f32));
        assert_eq!(f32::from_value(Value::Text("2.5".into())), Ok(2.5f32));
        assert!(f32::from_value(Value::Float(f64::INFINITY))
            .unwrap()
            .is_infinite());
        assert_eq!(
            f32::from_value(Value::Float(1e300)),
            Err(ConversionError::FloatOutOfRange {
                expected: "f32",
                value: 1e300
            })
        );
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(
            Option::<String>::from_value(Value::Text("x".into())),
            Ok(Some("x".to_string()))
        );
        assert_eq!(
            String::from_value(Value::Null),
            Err(ConversionError::UnexpectedNull { expected: "String" })
        );
    }

    #[test]
    fn test_bool_from_sqlite_integers() {
        assert_eq!(bool::from_value(Value::Int(1)), Ok(true));
        assert_eq!(bool::from_value(Value::Int(0)), Ok(false));
        assert!(bool::from_value(Value::Int(2)).is_err());
        assert_eq!(bool::from_value(Value::Text("TRUE".into())), Ok(true));
    }

    #[test]
    fn test_type_mismatch_names_both_sides() {
        let err = f64::from_value(Value::Bytes(vec![1, 2])).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "f64",
                found: "BLOB"
            }
        );
        assert_eq!(err.to_string(), "cannot convert BLOB column into f64");
    }

    #[test]
    fn test_datetime_from_text_and_millis() {
        let expected = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(
            NaiveDateTime::from_value(Value::Text("2024-01-01 00:00:00".into())),
            Ok(expected)
        );
        assert_eq!(
            NaiveDateTime::from_value(Value::Int(1_704_067_200_000)),
            Ok(expected)
        );
        let utc = DateTime::<Utc>::from_value(Value::Text("2024-01-01T00:00:00Z".into())).unwrap();
        assert_eq!(utc.timestamp_millis(), 1_704_067_200_000);
    }

    #[test]
    fn test_scan_value_overwrites_target() {
        let mut name = String::from("old");
        let target: &mut dyn Scannable = &mut name;
        target.scan_value(Value::Text("new".into())).unwrap();
        assert_eq!(name, "new");
    }
}
