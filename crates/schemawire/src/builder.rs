// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema construction.
//!
//! Two ways to get a [`TypeDescriptor`]:
//!
//! - [`schema_of`] / [`SchemaBuilder::build`] walk the field list a
//!   [`Schematic`] type declares, capturing aliases.
//! - [`infer`] derives a descriptor from a dynamic [`Value`] sample.
//!
//! [`RecordBuilder`] is the fluent API both are built on, and can be used
//! directly to hand-write a reader schema.

use crate::descriptor::{FieldDescriptor, PrimitiveKind, RecordDescriptor, TypeDescriptor};
use crate::error::{UnsupportedShapeError, ValueError};
use crate::value::Value;
use std::collections::HashMap;

/// A Rust type with a declared binary shape.
///
/// Records implement this by listing their fields, in binary order, through
/// [`SchemaBuilder::record`]:
///
/// ```rust
/// use schemawire::{SchemaBuilder, Schematic, TypeDescriptor, UnsupportedShapeError, Value, ValueError};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Reading {
///     celsius: f64,
/// }
///
/// impl Schematic for Reading {
///     fn describe(b: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError> {
///         b.record("Reading")?.field::<f64>("celsius")?.alias("temp").finish()
///     }
///
///     fn to_value(&self) -> Value {
///         Value::record([("celsius", self.celsius.to_value())])
///     }
///
///     fn from_value(value: Value) -> Result<Self, ValueError> {
///         let mut fields = value.into_record()?;
///         Ok(Self { celsius: schemawire::take_field(&mut fields, "celsius")? })
///     }
/// }
///
/// let schema = schemawire::schema_of::<Reading>().unwrap();
/// assert!(schema.field("temp").is_some());
/// ```
pub trait Schematic: Sized {
    /// Describe the binary shape of `Self`.
    fn describe(builder: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError>;

    /// Convert to a dynamic value matching the described shape.
    fn to_value(&self) -> Value;

    /// Convert back from a dynamic value of the described shape.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

/// Build the descriptor declared by `T`.
pub fn schema_of<T: Schematic>() -> Result<TypeDescriptor, UnsupportedShapeError> {
    SchemaBuilder::new().describe::<T>()
}

/// Remove a field from a decoded record map and convert it.
pub fn take_field<T: Schematic>(
    fields: &mut HashMap<String, Value>,
    name: &str,
) -> Result<T, ValueError> {
    let value = fields
        .remove(name)
        .ok_or_else(|| ValueError::MissingField(name.to_string()))?;
    T::from_value(value)
}

/// Walks declared field lists, tracking the types currently being
/// described so that a type containing itself is reported instead of
/// recursing forever.
///
/// Cycles are detected on the Rust type, so two distinct types may share a
/// record name. Record names only label error paths.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    active: Vec<&'static str>,
    in_progress: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the schema of a sample value. The shape comes from its type.
    pub fn build<T: Schematic>(
        &mut self,
        _sample: &T,
    ) -> Result<TypeDescriptor, UnsupportedShapeError> {
        self.describe::<T>()
    }

    /// Describe `T` and validate the resulting tree.
    ///
    /// Nested types go through here too: field, sequence and optional
    /// descriptions all call back into `describe`.
    pub fn describe<T: Schematic>(&mut self) -> Result<TypeDescriptor, UnsupportedShapeError> {
        let type_name = std::any::type_name::<T>();
        if self.active.contains(&type_name) {
            let name = short_type_name(type_name);
            let path = if self.in_progress.is_empty() {
                name.to_string()
            } else {
                format!("{} -> {}", self.in_progress.join(" -> "), name)
            };
            return Err(UnsupportedShapeError::new(
                path,
                format!("record `{}` contains itself", name),
            ));
        }

        let top_level = self.active.is_empty();
        self.active.push(type_name);
        let described = T::describe(self);
        self.active.pop();
        let desc = described?;
        if top_level {
            desc.validate()?;
            log::debug!("[SCHEMA] built {}", desc);
        }
        Ok(desc)
    }

    /// Start describing a record type.
    pub fn record(&mut self, name: &str) -> Result<RecordScope<'_>, UnsupportedShapeError> {
        self.in_progress.push(name.to_string());
        Ok(RecordScope {
            record: RecordBuilder::new(name),
            builder: self,
        })
    }

    fn path(&self) -> String {
        if self.in_progress.is_empty() {
            "$".to_string()
        } else {
            self.in_progress.join(".")
        }
    }
}

/// `a::b::Tree<u8>` -> `Tree`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A record being described inside a [`SchemaBuilder`].
///
/// Dropping the scope (on success or error) ends the record.
pub struct RecordScope<'a> {
    builder: &'a mut SchemaBuilder,
    record: RecordBuilder,
}

impl RecordScope<'_> {
    /// Add a field whose type is described by `T`.
    pub fn field<T: Schematic>(mut self, name: &str) -> Result<Self, UnsupportedShapeError> {
        let type_desc = self.builder.describe::<T>()?;
        self.record.push_field(FieldDescriptor::new(name, type_desc));
        Ok(self)
    }

    /// Add a historical name to the most recently added field.
    pub fn alias(mut self, alias: &str) -> Self {
        self.record.push_alias(alias.to_string());
        self
    }

    /// Finish the record, checking the name/alias rules.
    pub fn finish(mut self) -> Result<TypeDescriptor, UnsupportedShapeError> {
        let path = self.builder.path();
        let record = std::mem::replace(&mut self.record, RecordBuilder::new(""));
        record.build_at(&path)
    }
}

impl Drop for RecordScope<'_> {
    fn drop(&mut self) {
        self.builder.in_progress.pop();
    }
}

/// Fluent builder for record descriptors.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    orphan_aliases: Vec<String>,
}

impl RecordBuilder {
    /// Create a new builder for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            orphan_aliases: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field_with_type(name, TypeDescriptor::primitive(kind))
    }

    /// Add a field with a type descriptor.
    pub fn field_with_type(mut self, name: impl Into<String>, type_desc: TypeDescriptor) -> Self {
        self.push_field(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Add an optional primitive field.
    pub fn optional_field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field_with_type(
            name,
            TypeDescriptor::optional(TypeDescriptor::primitive(kind)),
        )
    }

    /// Add a sequence-of-primitives field.
    pub fn sequence_field(self, name: impl Into<String>, element_kind: PrimitiveKind) -> Self {
        self.field_with_type(
            name,
            TypeDescriptor::sequence(TypeDescriptor::primitive(element_kind)),
        )
    }

    /// Add a historical name to the most recently added field.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.push_alias(alias.into());
        self
    }

    fn push_field(&mut self, field: FieldDescriptor) {
        self.fields.push(field);
    }

    fn push_alias(&mut self, alias: String) {
        match self.fields.pop() {
            Some(field) => self.fields.push(field.with_alias(alias)),
            None => self.orphan_aliases.push(alias),
        }
    }

    /// Build and validate the record descriptor.
    pub fn build(self) -> Result<TypeDescriptor, UnsupportedShapeError> {
        self.build_at("$")
    }

    fn build_at(self, path: &str) -> Result<TypeDescriptor, UnsupportedShapeError> {
        if let Some(alias) = self.orphan_aliases.first() {
            return Err(UnsupportedShapeError::new(
                path,
                format!("alias `{}` declared before any field", alias),
            ));
        }
        let desc = TypeDescriptor::Record(RecordDescriptor::new(self.name, self.fields));
        desc.validate().map_err(|e| UnsupportedShapeError {
            path: if e.path == "$" {
                path.to_string()
            } else {
                format!("{}{}", path, &e.path[1..])
            },
            reason: e.reason,
        })?;
        Ok(desc)
    }
}

/// Derive a descriptor from a dynamic value sample.
///
/// Record fields are ordered by name, since a dynamic record carries no
/// declaration order. Fails when the type of some part cannot be determined:
/// a bare `Null`, an empty sequence, or a sequence whose elements disagree.
pub fn infer(sample: &Value) -> Result<TypeDescriptor, UnsupportedShapeError> {
    let desc = infer_at(sample, "$")?;
    desc.validate()?;
    Ok(desc)
}

fn infer_at(sample: &Value, path: &str) -> Result<TypeDescriptor, UnsupportedShapeError> {
    if let Some(kind) = sample.primitive_kind() {
        return Ok(TypeDescriptor::primitive(kind));
    }
    match sample {
        Value::Null => Err(UnsupportedShapeError::new(
            path,
            "cannot infer the type of an absent value",
        )),
        Value::Sequence(items) => {
            let element_path = format!("{}[]", path);
            let mut items = items.iter();
            let first = items.next().ok_or_else(|| {
                UnsupportedShapeError::new(path, "cannot infer the element type of an empty sequence")
            })?;
            let element = infer_at(first, &element_path)?;
            for item in items {
                if infer_at(item, &element_path)? != element {
                    return Err(UnsupportedShapeError::new(
                        path,
                        "sequence elements have different shapes",
                    ));
                }
            }
            Ok(TypeDescriptor::sequence(element))
        }
        Value::Record(fields) => {
            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();
            let mut record = RecordBuilder::new("");
            for name in names {
                let field_path = format!("{}.{}", path, name);
                record = record.field_with_type(name.as_str(), infer_at(&fields[name], &field_path)?);
            }
            record.build_at(path)
        }
        _ => Err(UnsupportedShapeError::new(path, "unsupported value")),
    }
}

// Schematic implementations for the supported Rust types.

macro_rules! impl_schematic_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Schematic for $ty {
                fn describe(_: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError> {
                    Ok(TypeDescriptor::primitive(PrimitiveKind::$kind))
                }

                fn to_value(&self) -> Value {
                    Value::$kind(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$kind(v) => Ok(v),
                        other => Err(ValueError::TypeMismatch {
                            expected: PrimitiveKind::$kind.name().into(),
                            found: other.kind_name().into(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_schematic_primitive!(
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

impl<T: Schematic> Schematic for Vec<T> {
    fn describe(builder: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError> {
        Ok(TypeDescriptor::sequence(builder.describe::<T>()?))
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(Schematic::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.into_sequence()?.into_iter().map(T::from_value).collect()
    }
}

impl<T: Schematic> Schematic for Option<T> {
    fn describe(builder: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError> {
        Ok(TypeDescriptor::optional(builder.describe::<T>()?))
    }

    fn to_value(&self) -> Value {
        self.as_ref().map(Schematic::to_value).unwrap_or(Value::Null)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
