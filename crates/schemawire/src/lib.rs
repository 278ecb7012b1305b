// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # schemawire
//!
//! Self-describing binary encoding with writer/reader schema evolution.
//!
//! A producer describes its record with a [`TypeDescriptor`], ships that
//! descriptor once (binary via [`marshal`] or JSON via [`to_json`]), then
//! ships payloads encoded against it. A consumer holding an older or newer
//! descriptor decodes those payloads into its own shape: fields match by
//! name or alias, numeric kinds convert, unknown fields are skipped and
//! missing ones defaulted.
//!
//! ## Example
//!
//! ```rust
//! use schemawire::{decode, encode, marshal, unmarshal, PrimitiveKind, RecordBuilder, Value};
//!
//! // Writer: renamed `readings` and widened it to f64.
//! let writer = RecordBuilder::new("V2")
//!     .string_field("Header")
//!     .sequence_field("FilteredReadings", PrimitiveKind::F64)
//!     .alias("readings")
//!     .build()
//!     .unwrap();
//!
//! // Reader: still on the first version.
//! let reader = RecordBuilder::new("V1")
//!     .sequence_field("readings", PrimitiveKind::F32)
//!     .build()
//!     .unwrap();
//!
//! let payload = encode(
//!     &writer,
//!     &Value::record([
//!         ("Header", Value::from("hello")),
//!         ("FilteredReadings", Value::from(vec![1.5f64, 2.5])),
//!     ]),
//! )
//! .unwrap();
//!
//! // The writer schema travels over the wire before the payload.
//! let writer = unmarshal(&marshal(&writer).unwrap()).unwrap();
//! let old = decode(&writer, &reader, &payload).unwrap();
//! assert_eq!(old.get_field("readings"), Some(&Value::from(vec![1.5f32, 2.5])));
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | descriptor | [`TypeDescriptor`], [`FieldDescriptor`], [`PrimitiveKind`] |
//! | builder | [`Schematic`], [`SchemaBuilder`], [`RecordBuilder`], [`infer`] |
//! | codec | [`encode`], [`decode`] |
//! | resolve | [`Resolution`] (precomputed writer/reader plan) |
//! | wire | [`marshal`], [`unmarshal`], [`to_json`], [`from_json`] |
//! | compatibility | [`check_compatibility`] |
//! | version | [`SchemaVersion`], [`Fingerprint`] |
//! | publisher | [`SnapshotPublisher`], [`Publish`] |

mod builder;
mod codec;
mod compatibility;
mod descriptor;
mod error;
mod publisher;
mod resolve;
mod value;
mod version;
mod wire;

pub use builder::{infer, schema_of, take_field, RecordBuilder, RecordScope, SchemaBuilder, Schematic};
pub use codec::{decode, encode, encode_into, MAX_ZERO_WIDTH_ELEMENTS};
pub use compatibility::{check_compatibility, Compatibility, CompatibilityResult};
pub use descriptor::{FieldDescriptor, PrimitiveKind, RecordDescriptor, TypeDescriptor};
pub use error::{
    DecodeError, EncodeError, IncompatibleSchemaError, UnsupportedShapeError, ValueError,
    WireError,
};
pub use publisher::{Publish, SnapshotPublisher};
pub use resolve::Resolution;
pub use value::Value;
pub use version::{Fingerprint, SchemaVersion};
pub use wire::{from_json, marshal, to_json, unmarshal, MAX_DEPTH};
