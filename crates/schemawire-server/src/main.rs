// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! schemawire-server - evolving record publisher
//!
//! # Usage
//!
//! ```bash
//! # Version 2 record on port 8080 (or $PORT)
//! schemawire-server
//!
//! # Version 1 record, JSON schema, faster refresh
//! schemawire-server --schema-version v1 --schema-format json --refresh-interval-ms 100
//! ```

use anyhow::Context;
use clap::Parser;
use schemawire::{check_compatibility, schema_of, Publish, TypeDescriptor};
use schemawire_server::config::{Args, RecordVersion};
use schemawire_server::demo::{ReadingsV1, ReadingsV2};
use schemawire_server::{build_router, refresher, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let interval = args.refresh_interval()?;

    let (publisher, refresh) = match args.schema_version {
        RecordVersion::V1 => refresher::start_dyn::<ReadingsV1>(interval),
        RecordVersion::V2 => refresher::start_dyn::<ReadingsV2>(interval),
    }
    .context("failed to build the writer schema")?;

    log_schema(publisher.as_ref(), args.schema_version)?;

    let state = Arc::new(AppState::new(publisher, args.schema_format));
    let app = build_router(state);

    let addr = args.addr();
    info!("schemawire-server v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP server: http://{}", addr);
    info!("endpoint 1: /get-schema/ ({:?})", args.schema_format);
    info!("endpoint 2: /get-data/ (refresh every {:?})", interval);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutting down...");
        })
        .await
        .context("server error")?;

    refresh.stop().await;
    Ok(())
}

/// Log the published schema and how it relates to the other built-in version.
fn log_schema(publisher: &dyn Publish, version: RecordVersion) -> anyhow::Result<()> {
    let schema = publisher.schema();
    info!(
        "publishing {} schema {} (fingerprint {})",
        schema.label(),
        schema.descriptor(),
        schema.fingerprint()
    );

    let (old, new): (TypeDescriptor, TypeDescriptor) = match version {
        RecordVersion::V1 => (schema.descriptor().clone(), schema_of::<ReadingsV2>()?),
        RecordVersion::V2 => (schema_of::<ReadingsV1>()?, schema.descriptor().clone()),
    };
    let report = check_compatibility(&old, &new);
    info!("v1 -> v2 compatibility: {}", report.compatibility);
    for detail in &report.details {
        info!("  {}", detail);
    }
    Ok(())
}
