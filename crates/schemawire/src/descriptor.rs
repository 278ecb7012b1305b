// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the binary layout of a value, independent of any Rust type.

use crate::error::UnsupportedShapeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl PrimitiveKind {
    /// Encoded size in bytes (None for length-prefixed strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::String => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Short lowercase name, as used in the JSON schema form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete type descriptor.
///
/// Trees are finite by construction (children are owned), so the only
/// structural invariants left to check are the per-record name rules, see
/// [`TypeDescriptor::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDescriptor {
    /// Fixed-width scalar or length-prefixed string.
    Primitive(PrimitiveKind),
    /// Value that may be absent (one presence byte).
    Optional(Box<TypeDescriptor>),
    /// Variable-length list (32-bit element count).
    Sequence(Box<TypeDescriptor>),
    /// Named fields in binary order.
    Record(RecordDescriptor),
}

impl TypeDescriptor {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Create a record descriptor, assigning field indices from position.
    pub fn record(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::Record(RecordDescriptor::new(name, fields))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    /// Get fields if this is a record.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match self {
            Self::Record(record) => Some(&record.fields),
            _ => None,
        }
    }

    /// Get a record field by current name or alias.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        match self {
            Self::Record(record) => record.field(name),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Primitive(p) => p.name().to_string(),
            Self::Optional(inner) => format!("optional<{}>", inner.kind_name()),
            Self::Sequence(inner) => format!("sequence<{}>", inner.kind_name()),
            Self::Record(r) if r.name.is_empty() => "record".to_string(),
            Self::Record(r) => format!("record {}", r.name),
        }
    }

    /// Minimum number of bytes an encoded value of this type occupies.
    pub fn min_size(&self) -> usize {
        match self {
            Self::Primitive(p) => p.size().unwrap_or(4), // String: 4 bytes for length
            Self::Optional(_) => 1,
            Self::Sequence(_) => 4,
            Self::Record(r) => r.fields.iter().map(|f| f.type_desc.min_size()).sum(),
        }
    }

    /// Check the structural invariants of the whole tree.
    ///
    /// Within each record, every field name and alias must be non-empty and
    /// distinct from every other name and alias; field indices must match
    /// positions. `Optional(Optional(_))` is rejected because absence of the
    /// outer and inner value would be indistinguishable.
    pub fn validate(&self) -> Result<(), UnsupportedShapeError> {
        self.validate_at("$")
    }

    fn validate_at(&self, path: &str) -> Result<(), UnsupportedShapeError> {
        match self {
            Self::Primitive(_) => Ok(()),
            Self::Optional(inner) => {
                if matches!(**inner, Self::Optional(_)) {
                    return Err(UnsupportedShapeError::new(
                        path,
                        "nested optional is not representable",
                    ));
                }
                inner.validate_at(&format!("{}?", path))
            }
            Self::Sequence(inner) => inner.validate_at(&format!("{}[]", path)),
            Self::Record(record) => {
                record.validate_names(path)?;
                for field in &record.fields {
                    field
                        .type_desc
                        .validate_at(&format!("{}.{}", path, field.name))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(r) => {
                write!(f, "{} {{", r.name)?;
                for (i, field) in r.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}: {}", field.name, field.type_desc)?;
                    if !field.aliases.is_empty() {
                        write!(f, " (aka {})", field.aliases.join(", "))?;
                    }
                }
                f.write_str(" }")
            }
            Self::Optional(inner) => write!(f, "{}?", inner),
            Self::Sequence(inner) => write!(f, "[{}]", inner),
            Self::Primitive(p) => write!(f, "{}", p),
        }
    }
}

/// Record descriptor: ordered fields plus a diagnostic type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Type name. Not used when resolving writer against reader.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Fields in binary order.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>, mut fields: Vec<FieldDescriptor>) -> Self {
        for (index, field) in fields.iter_mut().enumerate() {
            field.index = index;
        }
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Find the field whose current name or any alias equals `name`.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.answers_to(name))
    }

    fn validate_names(&self, path: &str) -> Result<(), UnsupportedShapeError> {
        let mut seen = HashSet::new();
        for (position, field) in self.fields.iter().enumerate() {
            if field.index != position {
                return Err(UnsupportedShapeError::new(
                    path,
                    format!(
                        "field `{}` has index {} but sits at position {}",
                        field.name, field.index, position
                    ),
                ));
            }
            for name in field.names() {
                if name.is_empty() {
                    return Err(UnsupportedShapeError::new(
                        path,
                        format!("field at position {} has an empty name or alias", position),
                    ));
                }
                if !seen.insert(name) {
                    return Err(UnsupportedShapeError::new(
                        path,
                        format!("name `{}` is used by more than one field or alias", name),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Field descriptor for record members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Current logical name.
    pub name: String,
    /// Historical names this field still answers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Field type.
    #[serde(rename = "type")]
    pub type_desc: TypeDescriptor,
    /// Position in the binary field order.
    pub index: usize,
}

impl FieldDescriptor {
    /// Create a new field descriptor (index is fixed up by the enclosing record).
    pub fn new(name: impl Into<String>, type_desc: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            type_desc,
            index: 0,
        }
    }

    /// Add a historical name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    /// Current name followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// True if `name` is the current name or one of the aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// True if the two fields share any name or alias.
    pub fn shares_name_with(&self, other: &FieldDescriptor) -> bool {
        self.names().any(|n| other.answers_to(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_seq() -> TypeDescriptor {
        TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::F64))
    }

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), Some(1));
        assert_eq!(PrimitiveKind::U16.size(), Some(2));
        assert_eq!(PrimitiveKind::F32.size(), Some(4));
        assert_eq!(PrimitiveKind::I64.size(), Some(8));
        assert_eq!(PrimitiveKind::String.size(), None);
    }

    #[test]
    fn test_primitive_classes() {
        assert!(PrimitiveKind::F32.is_float());
        assert!(PrimitiveKind::F32.is_signed());
        assert!(!PrimitiveKind::U32.is_signed());
        assert!(PrimitiveKind::U32.is_integer());
        assert!(!PrimitiveKind::String.is_numeric());
        assert!(!PrimitiveKind::Bool.is_numeric());
    }

    #[test]
    fn test_record_indices_follow_position() {
        let desc = TypeDescriptor::record(
            "Point",
            vec![
                FieldDescriptor::new("x", TypeDescriptor::primitive(PrimitiveKind::I32)),
                FieldDescriptor::new("y", TypeDescriptor::primitive(PrimitiveKind::I32)),
            ],
        );
        let fields = desc.fields().expect("record");
        assert_eq!(fields[0].index, 0);
        assert_eq!(fields[1].index, 1);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_field_lookup_by_alias() {
        let desc = TypeDescriptor::record(
            "Readings",
            vec![FieldDescriptor::new("FilteredReadings", f64_seq()).with_alias("readings")],
        );
        assert_eq!(
            desc.field("readings").map(|f| f.name.as_str()),
            Some("FilteredReadings")
        );
        assert!(desc.field("FilteredReadings").is_some());
        assert!(desc.field("raw").is_none());
    }

    #[test]
    fn test_alias_equal_to_name_is_ignored() {
        let field = FieldDescriptor::new("a", f64_seq())
            .with_alias("a")
            .with_alias("b")
            .with_alias("b");
        assert_eq!(field.aliases, vec!["b".to_string()]);
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let desc = TypeDescriptor::record(
            "Clash",
            vec![
                FieldDescriptor::new("readings", f64_seq()),
                FieldDescriptor::new("FilteredReadings", f64_seq()).with_alias("readings"),
            ],
        );
        let err = desc.validate().unwrap_err();
        assert!(err.reason.contains("readings"));
    }

    #[test]
    fn test_nested_duplicate_reports_path() {
        let inner = TypeDescriptor::record(
            "Inner",
            vec![
                FieldDescriptor::new("a", TypeDescriptor::primitive(PrimitiveKind::U8)),
                FieldDescriptor::new("a", TypeDescriptor::primitive(PrimitiveKind::U8)),
            ],
        );
        let outer = TypeDescriptor::record(
            "Outer",
            vec![FieldDescriptor::new(
                "items",
                TypeDescriptor::sequence(inner),
            )],
        );
        let err = outer.validate().unwrap_err();
        assert_eq!(err.path, "$.items[]");
    }

    #[test]
    fn test_nested_optional_rejected() {
        let desc = TypeDescriptor::optional(TypeDescriptor::optional(TypeDescriptor::primitive(
            PrimitiveKind::Bool,
        )));
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_empty_record_is_legal() {
        let desc = TypeDescriptor::record("Empty", Vec::new());
        assert!(desc.validate().is_ok());
        assert_eq!(desc.min_size(), 0);
    }

    #[test]
    fn test_min_size() {
        let desc = TypeDescriptor::record(
            "Mixed",
            vec![
                FieldDescriptor::new("flag", TypeDescriptor::primitive(PrimitiveKind::Bool)),
                FieldDescriptor::new("value", TypeDescriptor::primitive(PrimitiveKind::F64)),
                FieldDescriptor::new("label", TypeDescriptor::primitive(PrimitiveKind::String)),
                FieldDescriptor::new("data", f64_seq()),
            ],
        );
        assert_eq!(desc.min_size(), 1 + 8 + 4 + 4);
    }

    #[test]
    fn test_display() {
        let desc = TypeDescriptor::record(
            "V2",
            vec![
                FieldDescriptor::new("Header", TypeDescriptor::primitive(PrimitiveKind::String)),
                FieldDescriptor::new("FilteredReadings", f64_seq()).with_alias("readings"),
            ],
        );
        assert_eq!(
            desc.to_string(),
            "V2 { Header: string, FilteredReadings: [f64] (aka readings) }"
        );
    }
}
