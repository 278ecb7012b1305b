// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer/reader schema reconciliation.
//!
//! A [`Resolution`] is computed once from a writer schema (how the bytes were
//! produced) and a reader schema (the shape the caller wants). Decoding then
//! walks the writer layout to consume bytes and emits values in the reader
//! layout:
//!
//! - record fields match when the writer field's name set (name + aliases)
//!   intersects the reader field's name set; the first unclaimed reader field
//!   in declaration order wins;
//! - unmatched writer fields are consumed and dropped;
//! - reader fields with no writer counterpart get [`Value::default_for`];
//! - numeric primitives convert with Rust `as` semantics (widening exact,
//!   float narrowing rounds to nearest, integer narrowing truncates, float to
//!   integer saturates);
//! - any other kind change is an [`IncompatibleSchemaError`].

use crate::builder::Schematic;
use crate::codec::ByteReader;
use crate::descriptor::{PrimitiveKind, RecordDescriptor, TypeDescriptor};
use crate::error::{DecodeError, IncompatibleSchemaError};
use crate::value::Value;
use std::collections::HashMap;

/// A precomputed decoding plan for one (writer, reader) schema pair.
#[derive(Debug, Clone)]
pub struct Resolution {
    plan: Plan,
}

#[derive(Debug, Clone)]
enum Plan {
    Primitive {
        writer: PrimitiveKind,
        reader: PrimitiveKind,
    },
    Optional {
        present: Box<Plan>,
        absent: Value,
    },
    Sequence {
        element: Box<Plan>,
        element_min_size: usize,
    },
    Record {
        steps: Vec<FieldStep>,
        defaults: Vec<(String, Value)>,
    },
}

#[derive(Debug, Clone)]
enum FieldStep {
    Store { target: String, plan: Plan },
    Skip(TypeDescriptor),
}

impl Resolution {
    /// Reconcile `writer` against `reader`.
    pub fn new(
        writer: &TypeDescriptor,
        reader: &TypeDescriptor,
    ) -> Result<Self, IncompatibleSchemaError> {
        let plan = resolve(writer, reader, "$")?;
        Ok(Self { plan })
    }

    /// Decode one payload. The whole buffer must be consumed.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let value = run(&self.plan, &mut reader)?;
        match reader.remaining() {
            0 => Ok(value),
            extra => Err(DecodeError::TrailingBytes(extra)),
        }
    }

    /// Decode one payload straight into `T`.
    ///
    /// The resolution must have been built with `T`'s schema as the reader.
    pub fn decode_as<T: Schematic>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        Ok(T::from_value(self.decode(bytes)?)?)
    }
}

fn incompatible(path: &str, writer: &TypeDescriptor, reader: &TypeDescriptor) -> IncompatibleSchemaError {
    IncompatibleSchemaError {
        path: path.to_string(),
        writer: writer.kind_name(),
        reader: reader.kind_name(),
    }
}

fn primitives_compatible(writer: PrimitiveKind, reader: PrimitiveKind) -> bool {
    writer == reader || (writer.is_numeric() && reader.is_numeric())
}

fn resolve(
    writer: &TypeDescriptor,
    reader: &TypeDescriptor,
    path: &str,
) -> Result<Plan, IncompatibleSchemaError> {
    match (writer, reader) {
        (TypeDescriptor::Optional(w), TypeDescriptor::Optional(r)) => Ok(Plan::Optional {
            present: Box::new(resolve(w, r, path)?),
            absent: Value::Null,
        }),
        (TypeDescriptor::Optional(w), r) => Ok(Plan::Optional {
            present: Box::new(resolve(w, r, path)?),
            absent: Value::default_for(r),
        }),
        // A present value stands for itself when the reader made it optional.
        (w, TypeDescriptor::Optional(r)) => resolve(w, r, path),
        (TypeDescriptor::Primitive(w), TypeDescriptor::Primitive(r)) => {
            if primitives_compatible(*w, *r) {
                Ok(Plan::Primitive {
                    writer: *w,
                    reader: *r,
                })
            } else {
                Err(incompatible(path, writer, reader))
            }
        }
        (TypeDescriptor::Sequence(w), TypeDescriptor::Sequence(r)) => Ok(Plan::Sequence {
            element: Box::new(resolve(w, r, &format!("{}[]", path))?),
            element_min_size: w.min_size(),
        }),
        (TypeDescriptor::Record(w), TypeDescriptor::Record(r)) => resolve_record(w, r, path),
        _ => Err(incompatible(path, writer, reader)),
    }
}

fn resolve_record(
    writer: &RecordDescriptor,
    reader: &RecordDescriptor,
    path: &str,
) -> Result<Plan, IncompatibleSchemaError> {
    let mut claimed = vec![false; reader.fields.len()];
    let mut steps = Vec::with_capacity(writer.fields.len());

    for wf in &writer.fields {
        let target = reader
            .fields
            .iter()
            .enumerate()
            .find(|(i, rf)| !claimed[*i] && rf.shares_name_with(wf));

        match target {
            Some((i, rf)) => {
                claimed[i] = true;
                let plan = resolve(&wf.type_desc, &rf.type_desc, &format!("{}.{}", path, rf.name))?;
                if wf.name != rf.name {
                    log::debug!(
                        "[RESOLVE] {}: writer field `{}` read as `{}`",
                        path,
                        wf.name,
                        rf.name
                    );
                }
                steps.push(FieldStep::Store {
                    target: rf.name.clone(),
                    plan,
                });
            }
            None => {
                log::debug!("[RESOLVE] {}: writer field `{}` skipped", path, wf.name);
                steps.push(FieldStep::Skip(wf.type_desc.clone()));
            }
        }
    }

    let defaults = reader
        .fields
        .iter()
        .zip(&claimed)
        .filter(|(_, claimed)| !**claimed)
        .map(|(rf, _)| {
            log::debug!("[RESOLVE] {}: reader field `{}` defaulted", path, rf.name);
            (rf.name.clone(), Value::default_for(&rf.type_desc))
        })
        .collect();

    Ok(Plan::Record { steps, defaults })
}

fn run(plan: &Plan, reader: &mut ByteReader<'_>) -> Result<Value, DecodeError> {
    match plan {
        Plan::Primitive {
            writer,
            reader: target,
        } => {
            let value = reader.read_primitive(*writer)?;
            convert(value, *target)
        }
        Plan::Optional { present, absent } => {
            if reader.read_presence()? {
                run(present, reader)
            } else {
                Ok(absent.clone())
            }
        }
        Plan::Sequence {
            element,
            element_min_size,
        } => {
            let count = reader.read_len()?;
            reader.check_count(count, *element_min_size)?;
            let mut items = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                items.push(run(element, reader)?);
            }
            Ok(Value::Sequence(items))
        }
        Plan::Record { steps, defaults } => {
            let mut fields = HashMap::with_capacity(steps.len() + defaults.len());
            for step in steps {
                match step {
                    FieldStep::Store { target, plan } => {
                        fields.insert(target.clone(), run(plan, reader)?);
                    }
                    FieldStep::Skip(desc) => reader.skip(desc)?,
                }
            }
            for (name, value) in defaults {
                fields.insert(name.clone(), value.clone());
            }
            Ok(Value::Record(fields))
        }
    }
}

macro_rules! cast_number {
    ($v:expr, $target:expr) => {
        match $target {
            PrimitiveKind::I8 => Some(Value::I8($v as i8)),
            PrimitiveKind::I16 => Some(Value::I16($v as i16)),
            PrimitiveKind::I32 => Some(Value::I32($v as i32)),
            PrimitiveKind::I64 => Some(Value::I64($v as i64)),
            PrimitiveKind::U8 => Some(Value::U8($v as u8)),
            PrimitiveKind::U16 => Some(Value::U16($v as u16)),
            PrimitiveKind::U32 => Some(Value::U32($v as u32)),
            PrimitiveKind::U64 => Some(Value::U64($v as u64)),
            PrimitiveKind::F32 => Some(Value::F32($v as f32)),
            PrimitiveKind::F64 => Some(Value::F64($v as f64)),
            PrimitiveKind::Bool | PrimitiveKind::String => None,
        }
    };
}

/// Convert a decoded primitive to the reader's primitive kind.
fn convert(value: Value, target: PrimitiveKind) -> Result<Value, DecodeError> {
    if value.primitive_kind() == Some(target) {
        return Ok(value);
    }
    let converted = match &value {
        Value::I8(v) => cast_number!(*v as i128, target),
        Value::I16(v) => cast_number!(*v as i128, target),
        Value::I32(v) => cast_number!(*v as i128, target),
        Value::I64(v) => cast_number!(*v as i128, target),
        Value::U8(v) => cast_number!(*v as i128, target),
        Value::U16(v) => cast_number!(*v as i128, target),
        Value::U32(v) => cast_number!(*v as i128, target),
        Value::U64(v) => cast_number!(*v as i128, target),
        Value::F32(v) => cast_number!(*v, target),
        Value::F64(v) => cast_number!(*v, target),
        _ => None,
    };
    converted.ok_or_else(|| {
        DecodeError::Incompatible(IncompatibleSchemaError {
            path: "$".into(),
            writer: value.kind_name().into(),
            reader: target.name().into(),
        })
    })
}
