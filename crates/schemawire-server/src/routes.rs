// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route definitions.

use crate::handlers;
use crate::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;

fn get_only<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: axum::handler::Handler<T, Arc<AppState>>,
    T: 'static,
{
    get(handler).fallback(handlers::invalid_invocation)
}

/// Publishing endpoints, with and without the trailing slash.
pub fn publish_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get-schema/", get_only(handlers::get_schema))
        .route("/get-schema", get_only(handlers::get_schema))
        .route("/get-data/", get_only(handlers::get_data))
        .route("/get-data", get_only(handlers::get_data))
}

/// Operational endpoints.
pub fn ops_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health))
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}
