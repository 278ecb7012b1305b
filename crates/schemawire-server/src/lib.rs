// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! schemawire HTTP publisher
//!
//! Serves one evolving record and the schema it is encoded with.
//!
//! # Endpoints
//!
//! - `GET /get-schema/` - Writer schema (binary, or JSON with `--schema-format json`)
//! - `GET /get-data/` - Current record encoded against the writer schema
//! - `GET /health` - Schema version, fingerprint and refresh count
//!
//! Any other method on the publishing endpoints, `OPTIONS` included, answers
//! 404 `Invalid Invocation`. Both publishing endpoints send
//! `Access-Control-Allow-Origin: *`, which is all a simple cross-origin GET
//! needs.

pub mod config;
pub mod demo;
pub mod handlers;
pub mod refresher;
pub mod routes;

use axum::Router;
use config::SchemaFormat;
use schemawire::Publish;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
pub struct AppState {
    pub publisher: Arc<dyn Publish>,
    pub format: SchemaFormat,
}

impl AppState {
    pub fn new(publisher: Arc<dyn Publish>, format: SchemaFormat) -> Self {
        Self { publisher, format }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::publish_routes())
        .merge(routes::ops_routes())
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
