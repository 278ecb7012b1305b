// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! schemawire-client - fetch a schema and payloads, decode them in a chosen shape
//!
//! # Usage
//!
//! ```bash
//! # Read a v2 server as a v1 client would
//! schemawire-client --url http://127.0.0.1:8080 --as v1
//!
//! # Generic decode with the writer schema only
//! schemawire-client --as dynamic --count 5 --interval-ms 500
//! ```

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use schemawire::{from_json, schema_of, unmarshal, Fingerprint, Resolution, TypeDescriptor};
use schemawire_server::demo::{ReadingsV1, ReadingsV2};
use schemawire_server::handlers::FINGERPRINT_HEADER;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReaderShape {
    V1,
    V2,
    Dynamic,
}

/// schemawire decoding client
#[derive(Parser, Debug)]
#[command(name = "schemawire-client")]
#[command(about = "Decode schemawire payloads with an old, new or generic reader schema")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Reader shape to decode into
    #[arg(long = "as", value_enum, default_value_t = ReaderShape::V1)]
    shape: ReaderShape,

    /// Number of payloads to fetch
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Milliseconds between fetches
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn fingerprint_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(&FINGERPRINT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn fetch_schema(
    client: &reqwest::Client,
    base: &str,
) -> anyhow::Result<(TypeDescriptor, Option<String>)> {
    let response = client
        .get(format!("{}/get-schema/", base))
        .send()
        .await
        .context("schema request failed")?
        .error_for_status()?;
    let fingerprint = fingerprint_of(&response);
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    let body = response.bytes().await?;

    let schema = if is_json {
        from_json(std::str::from_utf8(&body).context("schema is not UTF-8")?)?
    } else {
        unmarshal(&body)?
    };

    if let Some(expected) = &fingerprint {
        let actual = Fingerprint::compute(&schemawire::marshal(&schema)?).to_hex();
        if &actual != expected {
            bail!("schema fingerprint mismatch: header {}, computed {}", expected, actual);
        }
    }
    Ok((schema, fingerprint))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let base = args.url.trim_end_matches('/').to_string();
    let client = reqwest::Client::new();
    let (writer, fingerprint) = fetch_schema(&client, &base).await?;
    println!("writer schema: {}", writer);

    let reader = match args.shape {
        ReaderShape::V1 => schema_of::<ReadingsV1>()?,
        ReaderShape::V2 => schema_of::<ReadingsV2>()?,
        ReaderShape::Dynamic => writer.clone(),
    };
    let resolution = Resolution::new(&writer, &reader)?;

    for i in 0..args.count {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
        let response = client
            .get(format!("{}/get-data/", base))
            .send()
            .await
            .context("data request failed")?
            .error_for_status()?;
        if fingerprint.is_some() && fingerprint_of(&response) != fingerprint {
            tracing::warn!("payload was written with a different schema; refetch needed");
        }
        let body = response.bytes().await?;

        match args.shape {
            ReaderShape::V1 => println!("{:?}", resolution.decode_as::<ReadingsV1>(&body)?),
            ReaderShape::V2 => println!("{:?}", resolution.decode_as::<ReadingsV2>(&body)?),
            ReaderShape::Dynamic => println!("{:?}", resolution.decode(&body)?),
        }
    }
    Ok(())
}
