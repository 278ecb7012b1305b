// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Demo sensor records.
//!
//! Version 1 publishes raw readings as `f32`. Version 2 adds a text header,
//! widens to `f64`, and publishes both raw and smoothed readings. The
//! smoothed series keeps answering to `readings`, so a version 1 client
//! reads it without knowing anything changed.

use schemawire::{
    take_field, SchemaBuilder, Schematic, TypeDescriptor, UnsupportedShapeError, Value, ValueError,
};

/// Upper bound (exclusive) on a raw reading.
pub const MAX_READING: u32 = 10_000_000;

/// Upper bound (exclusive) on readings per refresh.
pub const MAX_READINGS: usize = 10;

/// Exponential moving average weight of the newest reading.
pub const SMOOTHING_FACTOR: f64 = 0.5;

/// Header lines cycled through by version 2.
pub const HEADER_LINES: [&str; 17] = [
    "Four score and seven years ago",
    "our fathers brought forth on this continent,",
    "a new nation,",
    "conceived in Liberty,",
    "and dedicated to the proposition that all men",
    "are created equal.",
    "Now we are engaged in a great civil war,",
    "testing whether that nation,",
    "or any nation so conceived and so dedicated,",
    "can long endure.",
    "We are met on a great battle-field of that war.",
    "We have come to dedicate a portion of that field,",
    "as a final resting place",
    "for those who here gave their lives that",
    "that nation might live.",
    "It is altogether fitting and",
    "proper that we should do this.",
];

/// A record the server can publish and refresh.
pub trait Sample: Schematic + Clone + Send + 'static {
    /// Version label served in `/health` and logs.
    const LABEL: &'static str;

    /// Produce the next complete record.
    fn refresh(rng: &mut fastrand::Rng) -> Self;
}

/// Version 1: raw readings only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingsV1 {
    pub readings: Vec<f32>,
}

impl Schematic for ReadingsV1 {
    fn describe(b: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError> {
        b.record("ReadingsV1")?.field::<Vec<f32>>("readings")?.finish()
    }

    fn to_value(&self) -> Value {
        Value::record([("readings", self.readings.to_value())])
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut fields = value.into_record()?;
        Ok(Self {
            readings: take_field(&mut fields, "readings")?,
        })
    }
}

impl Sample for ReadingsV1 {
    const LABEL: &'static str = "v1";

    fn refresh(rng: &mut fastrand::Rng) -> Self {
        let n = rng.usize(0..MAX_READINGS);
        Self {
            readings: (0..n).map(|_| rng.u32(0..MAX_READING) as f32).collect(),
        }
    }
}

/// Version 2: header, raw and smoothed readings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingsV2 {
    pub header: String,
    pub raw_readings: Vec<f64>,
    pub filtered_readings: Vec<f64>,
}

impl Schematic for ReadingsV2 {
    fn describe(b: &mut SchemaBuilder) -> Result<TypeDescriptor, UnsupportedShapeError> {
        b.record("ReadingsV2")?
            .field::<String>("Header")?
            .field::<Vec<f64>>("RawReadings")?
            .field::<Vec<f64>>("FilteredReadings")?
            .alias("readings")
            .finish()
    }

    fn to_value(&self) -> Value {
        Value::record([
            ("Header", self.header.to_value()),
            ("RawReadings", self.raw_readings.to_value()),
            ("FilteredReadings", self.filtered_readings.to_value()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut fields = value.into_record()?;
        Ok(Self {
            header: take_field(&mut fields, "Header")?,
            raw_readings: take_field(&mut fields, "RawReadings")?,
            filtered_readings: take_field(&mut fields, "FilteredReadings")?,
        })
    }
}

impl Sample for ReadingsV2 {
    const LABEL: &'static str = "v2";

    fn refresh(rng: &mut fastrand::Rng) -> Self {
        let header = HEADER_LINES[rng.usize(0..HEADER_LINES.len())].to_string();
        let n = rng.usize(0..MAX_READINGS);
        let raw_readings: Vec<f64> = (0..n).map(|_| f64::from(rng.u32(0..MAX_READING))).collect();
        Self {
            filtered_readings: smooth(&raw_readings),
            raw_readings,
            header,
        }
    }
}

/// Exponential moving average starting from zero.
pub fn smooth(raw: &[f64]) -> Vec<f64> {
    let mut average = 0.0;
    raw.iter()
        .map(|v| {
            average = v * SMOOTHING_FACTOR + average * (1.0 - SMOOTHING_FACTOR);
            average
        })
        .collect()
}
