// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values: data shaped by a [`TypeDescriptor`] rather than a Rust type.

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::ValueError;
use std::collections::HashMap;

/// A dynamic value that can hold anything a descriptor can describe.
///
/// Optional values have no wrapper: a present optional is the inner value,
/// an absent one is [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),

    // Composites
    Sequence(Vec<Value>),
    Record(HashMap<String, Value>),

    // Absent optional
    Null,
}

impl Value {
    /// Build a record value from `(name, value)` pairs.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The deterministic default for a type: zero, false, empty string,
    /// empty sequence, absent optional, or a record of defaults.
    pub fn default_for(desc: &TypeDescriptor) -> Self {
        match desc {
            TypeDescriptor::Primitive(kind) => match kind {
                PrimitiveKind::Bool => Self::Bool(false),
                PrimitiveKind::I8 => Self::I8(0),
                PrimitiveKind::I16 => Self::I16(0),
                PrimitiveKind::I32 => Self::I32(0),
                PrimitiveKind::I64 => Self::I64(0),
                PrimitiveKind::U8 => Self::U8(0),
                PrimitiveKind::U16 => Self::U16(0),
                PrimitiveKind::U32 => Self::U32(0),
                PrimitiveKind::U64 => Self::U64(0),
                PrimitiveKind::F32 => Self::F32(0.0),
                PrimitiveKind::F64 => Self::F64(0.0),
                PrimitiveKind::String => Self::String(String::new()),
            },
            TypeDescriptor::Optional(_) => Self::Null,
            TypeDescriptor::Sequence(_) => Self::Sequence(Vec::new()),
            TypeDescriptor::Record(record) => Self::Record(
                record
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), Self::default_for(&f.type_desc)))
                    .collect(),
            ),
        }
    }

    /// The primitive kind this value carries, if it is a primitive.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::String(_) => PrimitiveKind::String,
            Self::Sequence(_) | Self::Record(_) | Self::Null => return None,
        })
    }

    /// Short description used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
            Self::Null => "null",
            other => other.primitive_kind().map(|p| p.name()).unwrap_or("value"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Get a record field.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Set a record field. Returns false if this is not a record.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self {
            Self::Record(fields) => {
                fields.insert(name.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Unwrap a record into its field map.
    pub fn into_record(self) -> Result<HashMap<String, Value>, ValueError> {
        match self {
            Self::Record(fields) => Ok(fields),
            other => Err(ValueError::TypeMismatch {
                expected: "record".into(),
                found: other.kind_name().into(),
            }),
        }
    }

    /// Unwrap a sequence into its elements.
    pub fn into_sequence(self) -> Result<Vec<Value>, ValueError> {
        match self {
            Self::Sequence(items) => Ok(items),
            other => Err(ValueError::TypeMismatch {
                expected: "sequence".into(),
                found: other.kind_name().into(),
            }),
        }
    }
}

// Conversion traits
macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;

    #[test]
    fn test_primitive_values() {
        let v = Value::from(42i64);
        assert_eq!(v.as_i64(), Some(42));
        assert_eq!(v.as_f64(), None);

        let v = Value::from(std::f64::consts::PI);
        assert_eq!(v.as_f64(), Some(std::f64::consts::PI));

        let v = Value::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(v.primitive_kind(), Some(PrimitiveKind::String));
    }

    #[test]
    fn test_record_value() {
        let mut v = Value::record([("x", Value::I32(10))]);
        assert!(v.set_field("y", Value::I32(20)));
        assert_eq!(v.get_field("y"), Some(&Value::I32(20)));
        assert!(v.get_field("z").is_none());
        assert!(!Value::Null.clone().set_field("x", Value::Bool(true)));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<u8>), Value::Null);
        assert_eq!(Value::from(Some(3u8)), Value::U8(3));
    }

    #[test]
    fn test_default_for_record() {
        let desc = TypeDescriptor::record(
            "R",
            vec![
                FieldDescriptor::new("n", TypeDescriptor::primitive(PrimitiveKind::U16)),
                FieldDescriptor::new(
                    "items",
                    TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::F32)),
                ),
                FieldDescriptor::new(
                    "maybe",
                    TypeDescriptor::optional(TypeDescriptor::primitive(PrimitiveKind::String)),
                ),
            ],
        );
        let v = Value::default_for(&desc);
        assert_eq!(v.get_field("n"), Some(&Value::U16(0)));
        assert_eq!(v.get_field("items"), Some(&Value::Sequence(Vec::new())));
        assert_eq!(v.get_field("maybe"), Some(&Value::Null));
    }

    #[test]
    fn test_into_record_mismatch() {
        let err = Value::F32(1.0).into_record().unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                expected: "record".into(),
                found: "f32".into()
            }
        );
    }
}
