// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot publisher: owns the live record and hands out coherent copies.
//!
//! The record sits behind a single mutex. [`SnapshotPublisher::publish`]
//! swaps in a complete new record while holding it; readers clone the
//! record under the lock and release it before encoding, so encoding and
//! network writes never run inside the critical section.

use crate::builder::Schematic;
use crate::error::EncodeError;
use crate::version::SchemaVersion;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Publisher of one record type under one immutable writer schema.
pub struct SnapshotPublisher<T> {
    schema: Arc<SchemaVersion>,
    current: Mutex<T>,
    generation: AtomicU64,
}

impl<T: Schematic + Clone> SnapshotPublisher<T> {
    pub fn new(schema: Arc<SchemaVersion>, initial: T) -> Self {
        Self {
            schema,
            current: Mutex::new(initial),
            generation: AtomicU64::new(0),
        }
    }

    /// Install a complete new record.
    pub fn publish(&self, next: T) {
        {
            let mut current = self.current.lock();
            *current = next;
        }
        let generation = self.generation.fetch_add(1, Ordering::Release) + 1;
        log::trace!("[PUBLISH] {} generation {}", self.schema.label(), generation);
    }

    /// A deep copy of the current record.
    pub fn current(&self) -> T {
        self.current.lock().clone()
    }

    /// Number of records published since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn schema(&self) -> &Arc<SchemaVersion> {
        &self.schema
    }

    /// Snapshot the record and encode it against the writer schema.
    pub fn encode_current(&self) -> Result<Vec<u8>, EncodeError> {
        let snapshot = self.current();
        self.schema.encode(&snapshot.to_value())
    }
}

/// Type-erased view of a publisher, for request handlers that serve
/// whichever record type the process was started with.
pub trait Publish: Send + Sync {
    fn schema(&self) -> &Arc<SchemaVersion>;

    fn encode_current(&self) -> Result<Vec<u8>, EncodeError>;

    fn generation(&self) -> u64;
}

impl<T> Publish for SnapshotPublisher<T>
where
    T: Schematic + Clone + Send,
{
    fn schema(&self) -> &Arc<SchemaVersion> {
        SnapshotPublisher::schema(self)
    }

    fn encode_current(&self) -> Result<Vec<u8>, EncodeError> {
        SnapshotPublisher::encode_current(self)
    }

    fn generation(&self) -> u64 {
        SnapshotPublisher::generation(self)
    }
}
