// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Immutable writer schemas.
//!
//! A [`SchemaVersion`] binds a descriptor to its marshaled forms and a
//! fingerprint. A publisher commits to one for its whole lifetime, so the
//! marshaled bytes are computed once and served verbatim.

use crate::builder::{schema_of, Schematic};
use crate::codec::encode;
use crate::descriptor::TypeDescriptor;
use crate::error::{EncodeError, WireError};
use crate::value::Value;
use crate::wire;
use std::fmt;

/// 14-byte schema fingerprint: MD5 of the marshaled descriptor, truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 14]);

impl Fingerprint {
    /// Fingerprint of a marshaled descriptor.
    pub fn compute(marshaled: &[u8]) -> Self {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(marshaled);
        let digest = hasher.finalize();

        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(&digest[..14]);
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 14] {
        &self.0
    }

    /// Lowercase hex, 28 characters.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A writer schema with its transport forms precomputed.
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    label: String,
    descriptor: TypeDescriptor,
    binary: Vec<u8>,
    json: String,
    fingerprint: Fingerprint,
}

impl SchemaVersion {
    /// Build the version for a [`Schematic`] type.
    pub fn of<T: Schematic>(label: impl Into<String>) -> Result<Self, WireError> {
        Self::from_descriptor(label, schema_of::<T>()?)
    }

    /// Wrap an already-built descriptor.
    pub fn from_descriptor(
        label: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Result<Self, WireError> {
        descriptor.validate()?;
        let binary = wire::marshal(&descriptor)?;
        let json = wire::to_json(&descriptor)?;
        let fingerprint = Fingerprint::compute(&binary);
        let label = label.into();
        log::info!(
            "[SCHEMA] {} ready: {} bytes binary, {} bytes json, fingerprint {}",
            label,
            binary.len(),
            json.len(),
            fingerprint
        );
        Ok(Self {
            label,
            descriptor,
            binary,
            json,
            fingerprint,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Marshaled binary form.
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// JSON form.
    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Encode a value against this writer schema.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        encode(&self.descriptor, value)
    }
}
