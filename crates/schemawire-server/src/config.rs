// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Server configuration.

use clap::{Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;

/// Default HTTP port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which demo record the server publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordVersion {
    V1,
    V2,
}

impl RecordVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

/// Which form `/get-schema/` serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SchemaFormat {
    #[default]
    Binary,
    Json,
}

impl SchemaFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Binary => "application/octet-stream",
            Self::Json => "application/json",
        }
    }
}

/// schemawire publisher
#[derive(Parser, Debug, Clone)]
#[command(name = "schemawire-server")]
#[command(about = "Publishes an evolving sensor record and its schema over HTTP")]
#[command(version)]
pub struct Args {
    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Record version to publish
    #[arg(long, value_enum, default_value_t = RecordVersion::V2)]
    pub schema_version: RecordVersion,

    /// Schema form served by /get-schema/
    #[arg(long, value_enum, default_value_t = SchemaFormat::Binary)]
    pub schema_format: SchemaFormat,

    /// Milliseconds between record refreshes
    #[arg(long, default_value_t = 1000)]
    pub refresh_interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validated refresh cadence.
    pub fn refresh_interval(&self) -> Result<Duration, ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "--refresh-interval-ms must be at least 1".into(),
            ));
        }
        Ok(Duration::from_millis(self.refresh_interval_ms))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["schemawire-server", "--port", "9000"]).expect("parse");
        assert_eq!(args.port, 9000);
        assert_eq!(args.schema_version, RecordVersion::V2);
        assert_eq!(args.schema_format, SchemaFormat::Binary);
        assert_eq!(args.refresh_interval().expect("interval"), Duration::from_secs(1));
        assert_eq!(args.addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_version_and_format() {
        let args = Args::try_parse_from([
            "schemawire-server",
            "--schema-version",
            "v1",
            "--schema-format",
            "json",
        ])
        .expect("parse");
        assert_eq!(args.schema_version, RecordVersion::V1);
        assert_eq!(args.schema_format.content_type(), "application/json");
        assert!(Args::try_parse_from(["schemawire-server", "--schema-version", "v3"]).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let args = Args::try_parse_from(["schemawire-server", "--refresh-interval-ms", "0"])
            .expect("parse");
        assert!(matches!(
            args.refresh_interval(),
            Err(ConfigError::Invalid(_))
        ));
    }
}
