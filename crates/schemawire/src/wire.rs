// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema transport.
//!
//! A descriptor travels alongside the payloads it describes, either as a
//! compact tagged byte string ([`marshal`] / [`unmarshal`]) or as JSON
//! ([`to_json`] / [`from_json`]).
//!
//! # Binary layout
//!
//! Every node starts with one tag byte. Strings and counts use the same
//! u32 little-endian prefix as the payload codec.
//!
//! ```text
//! 0x01..0x0C  primitive (bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, string)
//! 0x10        optional  <inner>
//! 0x11        sequence  <element>
//! 0x12        record    <name> <u32 field count> { <name> <u32 alias count> <alias>* <type> }*
//! ```

use crate::codec::ByteReader;
use crate::descriptor::{FieldDescriptor, PrimitiveKind, RecordDescriptor, TypeDescriptor};
use crate::error::{DecodeError, WireError};

/// Deepest descriptor nesting accepted by [`unmarshal`].
pub const MAX_DEPTH: usize = 64;

const TAG_OPTIONAL: u8 = 0x10;
const TAG_SEQUENCE: u8 = 0x11;
const TAG_RECORD: u8 = 0x12;

// Smallest possible marshaled field: empty name, zero aliases, primitive tag.
const MIN_FIELD_SIZE: usize = 4 + 4 + 1;

fn primitive_tag(kind: PrimitiveKind) -> u8 {
    match kind {
        PrimitiveKind::Bool => 0x01,
        PrimitiveKind::I8 => 0x02,
        PrimitiveKind::I16 => 0x03,
        PrimitiveKind::I32 => 0x04,
        PrimitiveKind::I64 => 0x05,
        PrimitiveKind::U8 => 0x06,
        PrimitiveKind::U16 => 0x07,
        PrimitiveKind::U32 => 0x08,
        PrimitiveKind::U64 => 0x09,
        PrimitiveKind::F32 => 0x0A,
        PrimitiveKind::F64 => 0x0B,
        PrimitiveKind::String => 0x0C,
    }
}

fn primitive_from_tag(tag: u8) -> Option<PrimitiveKind> {
    Some(match tag {
        0x01 => PrimitiveKind::Bool,
        0x02 => PrimitiveKind::I8,
        0x03 => PrimitiveKind::I16,
        0x04 => PrimitiveKind::I32,
        0x05 => PrimitiveKind::I64,
        0x06 => PrimitiveKind::U8,
        0x07 => PrimitiveKind::U16,
        0x08 => PrimitiveKind::U32,
        0x09 => PrimitiveKind::U64,
        0x0A => PrimitiveKind::F32,
        0x0B => PrimitiveKind::F64,
        0x0C => PrimitiveKind::String,
        _ => return None,
    })
}

/// Serialize a descriptor to its binary form.
///
/// Deterministic: equal descriptors always marshal to equal bytes.
pub fn marshal(desc: &TypeDescriptor) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::with_capacity(64);
    write_node(desc, &mut out)?;
    Ok(out)
}

fn write_str(value: &str, out: &mut Vec<u8>) -> Result<(), WireError> {
    write_count(value.len(), out)?;
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

fn write_count(count: usize, out: &mut Vec<u8>) -> Result<(), WireError> {
    let count = u32::try_from(count)
        .map_err(|_| WireError::TooLarge(format!("count {} exceeds u32", count)))?;
    out.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

fn write_node(desc: &TypeDescriptor, out: &mut Vec<u8>) -> Result<(), WireError> {
    match desc {
        TypeDescriptor::Primitive(kind) => out.push(primitive_tag(*kind)),
        TypeDescriptor::Optional(inner) => {
            out.push(TAG_OPTIONAL);
            write_node(inner, out)?;
        }
        TypeDescriptor::Sequence(element) => {
            out.push(TAG_SEQUENCE);
            write_node(element, out)?;
        }
        TypeDescriptor::Record(record) => {
            out.push(TAG_RECORD);
            write_str(&record.name, out)?;
            write_count(record.fields.len(), out)?;
            for field in &record.fields {
                write_str(&field.name, out)?;
                write_count(field.aliases.len(), out)?;
                for alias in &field.aliases {
                    write_str(alias, out)?;
                }
                write_node(&field.type_desc, out)?;
            }
        }
    }
    Ok(())
}

/// Parse and validate a descriptor from its binary form.
///
/// The whole buffer must be consumed.
pub fn unmarshal(bytes: &[u8]) -> Result<TypeDescriptor, WireError> {
    let mut reader = ByteReader::new(bytes);
    let desc = read_node(&mut reader, 0)?;
    if reader.remaining() > 0 {
        return Err(WireError::TrailingBytes(reader.remaining()));
    }
    desc.validate()?;
    Ok(desc)
}

fn wire_error(err: DecodeError) -> WireError {
    match err {
        DecodeError::Truncated { need, have } => WireError::Truncated { need, have },
        DecodeError::InvalidUtf8 { offset } => WireError::InvalidUtf8 { offset },
        DecodeError::TrailingBytes(n) => WireError::TrailingBytes(n),
        other => WireError::Malformed(other.to_string()),
    }
}

fn read_node(reader: &mut ByteReader<'_>, depth: usize) -> Result<TypeDescriptor, WireError> {
    if depth >= MAX_DEPTH {
        return Err(WireError::TooDeep(MAX_DEPTH));
    }
    let offset = reader.offset();
    let tag = reader.read_u8().map_err(wire_error)?;
    if let Some(kind) = primitive_from_tag(tag) {
        return Ok(TypeDescriptor::primitive(kind));
    }
    match tag {
        TAG_OPTIONAL => Ok(TypeDescriptor::optional(read_node(reader, depth + 1)?)),
        TAG_SEQUENCE => Ok(TypeDescriptor::sequence(read_node(reader, depth + 1)?)),
        TAG_RECORD => {
            let name = reader.read_string().map_err(wire_error)?;
            let count = reader.read_len().map_err(wire_error)?;
            reader
                .check_count(count, MIN_FIELD_SIZE)
                .map_err(wire_error)?;
            let mut fields = Vec::with_capacity(count);
            for _ in 0..count {
                let field_name = reader.read_string().map_err(wire_error)?;
                let alias_count = reader.read_len().map_err(wire_error)?;
                reader.check_count(alias_count, 4).map_err(wire_error)?;
                let mut aliases = Vec::with_capacity(alias_count);
                for _ in 0..alias_count {
                    aliases.push(reader.read_string().map_err(wire_error)?);
                }
                let type_desc = read_node(reader, depth + 1)?;
                let mut field = FieldDescriptor::new(field_name, type_desc);
                // Kept verbatim so that validation sees duplicates.
                field.aliases = aliases;
                fields.push(field);
            }
            Ok(TypeDescriptor::Record(RecordDescriptor::new(name, fields)))
        }
        _ => Err(WireError::UnknownTag { tag, offset }),
    }
}

/// Serialize a descriptor to JSON.
pub fn to_json(desc: &TypeDescriptor) -> Result<String, WireError> {
    Ok(serde_json::to_string(desc)?)
}

/// Parse and validate a descriptor from JSON.
pub fn from_json(json: &str) -> Result<TypeDescriptor, WireError> {
    let desc: TypeDescriptor = serde_json::from_str(json)?;
    desc.validate()?;
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordBuilder;

    fn readings_v2() -> TypeDescriptor {
        RecordBuilder::new("V2")
            .string_field("Header")
            .sequence_field("RawReadings", PrimitiveKind::F64)
            .sequence_field("FilteredReadings", PrimitiveKind::F64)
            .alias("readings")
            .optional_field("Unit", PrimitiveKind::String)
            .build()
            .expect("schema")
    }

    #[test]
    fn test_primitive_tags() {
        assert_eq!(
            marshal(&TypeDescriptor::primitive(PrimitiveKind::F64)).expect("marshal"),
            vec![0x0B]
        );
        let nested = TypeDescriptor::sequence(TypeDescriptor::optional(
            TypeDescriptor::primitive(PrimitiveKind::Bool),
        ));
        assert_eq!(marshal(&nested).expect("marshal"), vec![0x11, 0x10, 0x01]);
    }

    #[test]
    fn test_record_layout() {
        let desc = RecordBuilder::new("R")
            .field("a", PrimitiveKind::U8)
            .alias("b")
            .build()
            .expect("schema");
        let bytes = marshal(&desc).expect("marshal");
        let expected = vec![
            0x12, 1, 0, 0, 0, b'R', // name
            1, 0, 0, 0, // field count
            1, 0, 0, 0, b'a', // field name
            1, 0, 0, 0, 1, 0, 0, 0, b'b', // aliases
            0x06, // u8
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_unmarshal_preserves_aliases_and_order() {
        let desc = readings_v2();
        let back = unmarshal(&marshal(&desc).expect("marshal")).expect("unmarshal");
        assert_eq!(back, desc);
        assert_eq!(back.field("readings").expect("alias").name, "FilteredReadings");
    }

    #[test]
    fn test_marshal_is_deterministic() {
        assert_eq!(
            marshal(&readings_v2()).expect("a"),
            marshal(&readings_v2()).expect("b")
        );
    }

    #[test]
    fn test_unknown_tag() {
        match unmarshal(&[0x11, 0x7F]) {
            Err(WireError::UnknownTag { tag, offset }) => {
                assert_eq!(tag, 0x7F);
                assert_eq!(offset, 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_and_trailing() {
        let bytes = marshal(&readings_v2()).expect("marshal");
        assert!(matches!(
            unmarshal(&bytes[..bytes.len() - 3]),
            Err(WireError::Truncated { .. })
        ));
        let mut extra = bytes.clone();
        extra.push(0);
        assert!(matches!(unmarshal(&extra), Err(WireError::TrailingBytes(1))));
        assert!(matches!(unmarshal(&[]), Err(WireError::Truncated { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let mut bytes = vec![TAG_SEQUENCE; MAX_DEPTH + 1];
        bytes.push(0x01);
        assert!(matches!(unmarshal(&bytes), Err(WireError::TooDeep(_))));

        let mut ok = vec![TAG_SEQUENCE; MAX_DEPTH - 1];
        ok.push(0x01);
        assert!(unmarshal(&ok).is_ok());
    }

    #[test]
    fn test_invalid_names_rejected() {
        // Record with two fields both named "x".
        let bytes = vec![
            0x12, 0, 0, 0, 0, 2, 0, 0, 0, //
            1, 0, 0, 0, b'x', 0, 0, 0, 0, 0x06, //
            1, 0, 0, 0, b'x', 0, 0, 0, 0, 0x06,
        ];
        assert!(matches!(unmarshal(&bytes), Err(WireError::Invalid(_))));
    }

    #[test]
    fn test_nested_optional_rejected() {
        assert!(matches!(
            unmarshal(&[0x10, 0x10, 0x01]),
            Err(WireError::Invalid(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_name() {
        let bytes = vec![0x12, 1, 0, 0, 0, 0xFF, 0, 0, 0, 0];
        assert!(matches!(
            unmarshal(&bytes),
            Err(WireError::InvalidUtf8 { offset: 5 })
        ));
    }

    #[test]
    fn test_huge_field_count_rejected() {
        let mut bytes = vec![0x12, 0, 0, 0, 0];
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(unmarshal(&bytes), Err(WireError::Truncated { .. })));
    }

    #[test]
    fn test_json_form() {
        let desc = readings_v2();
        let json = to_json(&desc).expect("json");
        assert!(json.contains("\"readings\""));
        assert_eq!(from_json(&json).expect("parse"), desc);
        assert!(from_json("{\"primitive\":\"u128\"}").is_err());
    }

    #[test]
    fn test_reader_errors_keep_their_meaning() {
        assert!(matches!(
            wire_error(DecodeError::InvalidPresence { byte: 7, offset: 0 }),
            WireError::Malformed(msg) if msg.contains("presence")
        ));
        assert!(matches!(
            wire_error(DecodeError::Truncated { need: 4, have: 1 }),
            WireError::Truncated { need: 4, have: 1 }
        ));
        assert!(!matches!(
            wire_error(DecodeError::TooManyElements { count: 9, limit: 1 }),
            WireError::TooLarge(_)
        ));
    }
}
