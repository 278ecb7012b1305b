// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for schema construction, encoding, decoding and schema transport.

use thiserror::Error;

/// A value or declared type cannot be represented by the descriptor model.
///
/// Raised while building a schema (cyclic record types, duplicate field
/// names or aliases, values whose type cannot be inferred) and while
/// validating a schema received from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported shape at `{path}`: {reason}")]
pub struct UnsupportedShapeError {
    /// Location in the descriptor tree (`$` is the root).
    pub path: String,
    /// What was wrong.
    pub reason: String,
}

impl UnsupportedShapeError {
    pub(crate) fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A value does not match the schema it is being encoded with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("missing field `{field}` at `{path}`")]
    MissingField { path: String, field: String },

    #[error("length {length} at `{path}` does not fit in a 32-bit prefix")]
    LengthOverflow { path: String, length: usize },
}

/// Writer and reader schemas disagree in a way no coercion rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incompatible schemas at `{path}`: writer has {writer}, reader expects {reader}")]
pub struct IncompatibleSchemaError {
    pub path: String,
    pub writer: String,
    pub reader: String,
}

/// Errors raised while decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Incompatible(#[from] IncompatibleSchemaError),

    #[error("payload truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("invalid presence byte {byte:#04x} at offset {offset}")]
    InvalidPresence { byte: u8, offset: usize },

    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    #[error("sequence of zero-width elements claims {count} elements, limit is {limit}")]
    TooManyElements { count: usize, limit: usize },

    #[error("decoded value does not fit the target type: {0}")]
    Value(#[from] ValueError),
}

/// Errors raised while (un)marshaling a schema.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("unknown type tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("schema truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("invalid UTF-8 in schema name at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{0} trailing bytes after schema")]
    TrailingBytes(usize),

    #[error("schema nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("schema too large to marshal: {0}")]
    TooLarge(String),

    #[error("malformed schema: {0}")]
    Malformed(String),

    #[error(transparent)]
    Invalid(#[from] UnsupportedShapeError),

    #[error("JSON schema error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A dynamic value cannot be converted into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing field `{0}`")]
    MissingField(String),
}

impl EncodeError {
    /// Prepend a path segment (`.field`, `[3]`, `$`) while unwinding.
    pub(crate) fn within(self, segment: &str) -> Self {
        match self {
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => Self::TypeMismatch {
                path: format!("{}{}", segment, path),
                expected,
                found,
            },
            Self::MissingField { path, field } => Self::MissingField {
                path: format!("{}{}", segment, path),
                field,
            },
            Self::LengthOverflow { path, length } => Self::LengthOverflow {
                path: format!("{}{}", segment, path),
                length,
            },
        }
    }
}
