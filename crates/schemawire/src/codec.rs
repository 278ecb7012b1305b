// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary encoding/decoding of dynamic values.
//!
//! Layout, all little-endian, no padding:
//!
//! ```text
//! bool            1 byte (0 / 1)
//! i8..u64, f32/64 fixed width
//! string          u32 byte length, UTF-8 bytes
//! sequence        u32 element count, elements
//! optional        u8 presence (0 absent, 1 present), value if present
//! record          fields in schema order, no framing
//! ```

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::{DecodeError, EncodeError};
use crate::resolve::Resolution;
use crate::value::Value;

/// Most elements a decoded sequence may hold when each element encodes to
/// zero bytes (a record with no fields). Such counts cannot be checked
/// against the remaining input.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// Encode `value` according to `schema`.
pub fn encode(schema: &TypeDescriptor, value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::with_capacity(schema.min_size());
    encode_into(schema, value, &mut buffer)?;
    Ok(buffer)
}

/// Encode `value` according to `schema`, appending to `buffer`.
///
/// On error `buffer` may hold a partial encoding.
pub fn encode_into(
    schema: &TypeDescriptor,
    value: &Value,
    buffer: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let mut encoder = Encoder { buffer };
    encoder
        .encode_value(value, schema)
        .map_err(|e| e.within("$"))
}

/// Decode bytes written with `writer` into the shape of `reader`.
///
/// Builds a [`Resolution`] for the pair on every call; callers decoding many
/// payloads against the same schemas should build it once.
pub fn decode(
    writer: &TypeDescriptor,
    reader: &TypeDescriptor,
    bytes: &[u8],
) -> Result<Value, DecodeError> {
    Resolution::new(writer, reader)?.decode(bytes)
}

/// Binary encoder for dynamic values.
struct Encoder<'a> {
    buffer: &'a mut Vec<u8>,
}

impl Encoder<'_> {
    fn mismatch(expected: &TypeDescriptor, found: &Value) -> EncodeError {
        EncodeError::TypeMismatch {
            path: String::new(),
            expected: expected.kind_name(),
            found: found.kind_name().to_string(),
        }
    }

    fn write_len(&mut self, length: usize) -> Result<(), EncodeError> {
        let length = u32::try_from(length).map_err(|_| EncodeError::LengthOverflow {
            path: String::new(),
            length,
        })?;
        self.buffer.extend_from_slice(&length.to_le_bytes());
        Ok(())
    }

    fn encode_value(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<(), EncodeError> {
        match desc {
            TypeDescriptor::Primitive(p) => self.encode_primitive(value, *p, desc),
            TypeDescriptor::Optional(inner) => match value {
                Value::Null => {
                    self.buffer.push(0);
                    Ok(())
                }
                present => {
                    self.buffer.push(1);
                    self.encode_value(present, inner)
                }
            },
            TypeDescriptor::Sequence(element) => {
                if let Value::Sequence(items) = value {
                    self.write_len(items.len())?;
                    for (i, item) in items.iter().enumerate() {
                        self.encode_value(item, element)
                            .map_err(|e| e.within(&format!("[{}]", i)))?;
                    }
                    Ok(())
                } else {
                    Err(Self::mismatch(desc, value))
                }
            }
            TypeDescriptor::Record(record) => {
                if let Value::Record(map) = value {
                    for field in &record.fields {
                        let field_value =
                            map.get(&field.name)
                                .ok_or_else(|| EncodeError::MissingField {
                                    path: String::new(),
                                    field: field.name.clone(),
                                })?;
                        self.encode_value(field_value, &field.type_desc)
                            .map_err(|e| e.within(&format!(".{}", field.name)))?;
                    }
                    Ok(())
                } else {
                    Err(Self::mismatch(desc, value))
                }
            }
        }
    }

    fn encode_primitive(
        &mut self,
        value: &Value,
        kind: PrimitiveKind,
        desc: &TypeDescriptor,
    ) -> Result<(), EncodeError> {
        match (value, kind) {
            (Value::Bool(v), PrimitiveKind::Bool) => self.buffer.push(u8::from(*v)),
            (Value::I8(v), PrimitiveKind::I8) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::I16(v), PrimitiveKind::I16) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::I32(v), PrimitiveKind::I32) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::I64(v), PrimitiveKind::I64) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::U8(v), PrimitiveKind::U8) => self.buffer.push(*v),
            (Value::U16(v), PrimitiveKind::U16) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::U32(v), PrimitiveKind::U32) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::U64(v), PrimitiveKind::U64) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::F32(v), PrimitiveKind::F32) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::F64(v), PrimitiveKind::F64) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (Value::String(s), PrimitiveKind::String) => {
                self.write_len(s.len())?;
                self.buffer.extend_from_slice(s.as_bytes());
            }
            _ => return Err(Self::mismatch(desc, value)),
        }
        Ok(())
    }
}

/// Bounds-checked cursor over an encoded buffer.
pub(crate) struct ByteReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if count > self.remaining() {
            return Err(DecodeError::Truncated {
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_len(&mut self) -> Result<usize, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?) as usize)
    }

    /// Reject an element count that cannot possibly fit in what is left.
    pub(crate) fn check_count(&self, count: usize, min_size: usize) -> Result<(), DecodeError> {
        if min_size == 0 && count > MAX_ZERO_WIDTH_ELEMENTS {
            return Err(DecodeError::TooManyElements {
                count,
                limit: MAX_ZERO_WIDTH_ELEMENTS,
            });
        }
        let need = count.saturating_mul(min_size);
        if need > self.remaining() {
            return Err(DecodeError::Truncated {
                need,
                have: self.remaining(),
            });
        }
        Ok(())
    }

    pub(crate) fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_len()?;
        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    /// Read a presence byte: `Ok(true)` if the optional value follows.
    pub(crate) fn read_presence(&mut self) -> Result<bool, DecodeError> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidPresence { byte, offset }),
        }
    }

    pub(crate) fn read_primitive(&mut self, kind: PrimitiveKind) -> Result<Value, DecodeError> {
        Ok(match kind {
            PrimitiveKind::Bool => Value::Bool(self.read_u8()? != 0),
            PrimitiveKind::I8 => Value::I8(i8::from_le_bytes(self.read_array()?)),
            PrimitiveKind::I16 => Value::I16(i16::from_le_bytes(self.read_array()?)),
            PrimitiveKind::I32 => Value::I32(i32::from_le_bytes(self.read_array()?)),
            PrimitiveKind::I64 => Value::I64(i64::from_le_bytes(self.read_array()?)),
            PrimitiveKind::U8 => Value::U8(self.read_u8()?),
            PrimitiveKind::U16 => Value::U16(u16::from_le_bytes(self.read_array()?)),
            PrimitiveKind::U32 => Value::U32(u32::from_le_bytes(self.read_array()?)),
            PrimitiveKind::U64 => Value::U64(u64::from_le_bytes(self.read_array()?)),
            PrimitiveKind::F32 => Value::F32(f32::from_le_bytes(self.read_array()?)),
            PrimitiveKind::F64 => Value::F64(f64::from_le_bytes(self.read_array()?)),
            PrimitiveKind::String => Value::String(self.read_string()?),
        })
    }

    /// Consume one encoded value of type `desc` without materialising it.
    pub(crate) fn skip(&mut self, desc: &TypeDescriptor) -> Result<(), DecodeError> {
        match desc {
            TypeDescriptor::Primitive(p) => {
                let len = match p.size() {
                    Some(size) => size,
                    None => self.read_len()?,
                };
                self.read_bytes(len)?;
            }
            TypeDescriptor::Optional(inner) => {
                if self.read_presence()? {
                    self.skip(inner)?;
                }
            }
            TypeDescriptor::Sequence(element) => {
                let count = self.read_len()?;
                self.check_count(count, element.min_size())?;
                match element.as_ref() {
                    TypeDescriptor::Primitive(p) if p.size().is_some() => {
                        self.read_bytes(count * p.size().unwrap_or(0))?;
                    }
                    _ => {
                        for _ in 0..count {
                            self.skip(element)?;
                        }
                    }
                }
            }
            TypeDescriptor::Record(record) => {
                for field in &record.fields {
                    self.skip(&field.type_desc)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordBuilder;
    use crate::descriptor::FieldDescriptor;

    fn sensor_schema() -> TypeDescriptor {
        RecordBuilder::new("Sensor")
            .field("id", PrimitiveKind::U32)
            .field("ok", PrimitiveKind::Bool)
            .string_field("label")
            .sequence_field("samples", PrimitiveKind::F32)
            .optional_field("offset", PrimitiveKind::I16)
            .build()
            .expect("schema")
    }

    #[test]
    fn test_encode_layout() {
        let value = Value::record([
            ("id", Value::U32(0x0102_0304)),
            ("ok", Value::Bool(true)),
            ("label", Value::from("ab")),
            ("samples", Value::from(vec![1.0f32])),
            ("offset", Value::Null),
        ]);
        let bytes = encode(&sensor_schema(), &value).expect("encode");
        let mut expected = vec![0x04, 0x03, 0x02, 0x01, 0x01];
        expected.extend_from_slice(&[2, 0, 0, 0, b'a', b'b']);
        expected.extend_from_slice(&[1, 0, 0, 0]);
        expected.extend_from_slice(&1.0f32.to_le_bytes());
        expected.push(0);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_field_order_independent_of_value_map() {
        let schema = RecordBuilder::new("P")
            .field("b", PrimitiveKind::U8)
            .field("a", PrimitiveKind::U8)
            .build()
            .expect("schema");
        let value = Value::record([("a", Value::U8(1)), ("b", Value::U8(2))]);
        assert_eq!(encode(&schema, &value).expect("encode"), vec![2, 1]);
    }

    #[test]
    fn test_empty_record_encodes_to_nothing() {
        let schema = TypeDescriptor::record("Empty", Vec::new());
        let bytes = encode(&schema, &Value::record(Vec::<(String, Value)>::new())).expect("encode");
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_empty_sequence_differs_from_absent() {
        let schema = TypeDescriptor::optional(TypeDescriptor::sequence(
            TypeDescriptor::primitive(PrimitiveKind::U8),
        ));
        let absent = encode(&schema, &Value::Null).expect("encode");
        let empty = encode(&schema, &Value::Sequence(Vec::new())).expect("encode");
        assert_eq!(absent, vec![0]);
        assert_eq!(empty, vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_missing_field_error() {
        let value = Value::record([("id", Value::U32(1))]);
        let err = encode(&sensor_schema(), &value).unwrap_err();
        assert_eq!(
            err,
            EncodeError::MissingField {
                path: "$".into(),
                field: "ok".into()
            }
        );
    }

    #[test]
    fn test_type_mismatch_reports_path() {
        let schema = TypeDescriptor::record(
            "Outer",
            vec![FieldDescriptor::new(
                "items",
                TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::F64)),
            )],
        );
        let value = Value::record([(
            "items",
            Value::Sequence(vec![Value::F64(1.0), Value::F32(2.0)]),
        )]);
        match encode(&schema, &value).unwrap_err() {
            EncodeError::TypeMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, "$.items[1]");
                assert_eq!(expected, "f64");
                assert_eq!(found, "f32");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_record_expected_but_primitive_given() {
        let err = encode(&sensor_schema(), &Value::U8(1)).unwrap_err();
        assert!(matches!(err, EncodeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_reader_truncated() {
        let mut reader = ByteReader::new(&[1, 2]);
        assert_eq!(
            reader.read_primitive(PrimitiveKind::U32).unwrap_err(),
            DecodeError::Truncated { need: 4, have: 2 }
        );
    }

    #[test]
    fn test_reader_invalid_presence() {
        let mut reader = ByteReader::new(&[7]);
        assert_eq!(
            reader.read_presence().unwrap_err(),
            DecodeError::InvalidPresence { byte: 7, offset: 0 }
        );
    }

    #[test]
    fn test_skip_consumes_exactly_one_value() {
        let schema = sensor_schema();
        let value = Value::record([
            ("id", Value::U32(9)),
            ("ok", Value::Bool(false)),
            ("label", Value::from("hello")),
            ("samples", Value::from(vec![1.0f32, 2.0, 3.0])),
            ("offset", Value::I16(-4)),
        ]);
        let mut bytes = encode(&schema, &value).expect("encode");
        bytes.push(0xAA);
        let mut reader = ByteReader::new(&bytes);
        reader.skip(&schema).expect("skip");
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_huge_sequence_count_rejected_before_allocation() {
        let schema = TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::F64));
        let bytes = u32::MAX.to_le_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.skip(&schema),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_skip_caps_zero_width_sequence() {
        let schema = TypeDescriptor::sequence(TypeDescriptor::record("Unit", Vec::new()));
        let bytes = u32::MAX.to_le_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            reader.skip(&schema).unwrap_err(),
            DecodeError::TooManyElements {
                count: u32::MAX as usize,
                limit: MAX_ZERO_WIDTH_ELEMENTS,
            }
        );

        let at_limit = (MAX_ZERO_WIDTH_ELEMENTS as u32).to_le_bytes();
        let mut reader = ByteReader::new(&at_limit);
        reader.skip(&schema).expect("skip at limit");
        assert_eq!(reader.remaining(), 0);
    }
}
