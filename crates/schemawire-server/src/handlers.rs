// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP request handlers.

use crate::config::SchemaFormat;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use schemawire::EncodeError;
use serde::Serialize;
use std::sync::Arc;

/// Response header carrying the writer schema fingerprint.
pub const FINGERPRINT_HEADER: HeaderName = HeaderName::from_static("x-schema-fingerprint");

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: u16,
}

impl ApiError {
    pub fn invalid_invocation() -> Self {
        Self {
            error: "Invalid Invocation".into(),
            code: 404,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        tracing::error!("encode failed: {}", err);
        Self {
            error: format!("internal error: {}", err),
            code: 500,
        }
    }
}

/// GET /get-schema/
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Response {
    let schema = state.publisher.schema();
    let body = match state.format {
        SchemaFormat::Binary => schema.binary().to_vec(),
        SchemaFormat::Json => schema.json().as_bytes().to_vec(),
    };
    tracing::debug!("returned {} schema ({} bytes)", schema.label(), body.len());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, state.format.content_type().to_string()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (FINGERPRINT_HEADER, schema.fingerprint().to_hex()),
        ],
        body,
    )
        .into_response()
}

/// GET /get-data/
pub async fn get_data(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = state.publisher.encode_current()?;
    tracing::debug!("{} bytes written", body.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (FINGERPRINT_HEADER, state.publisher.schema().fingerprint().to_hex()),
        ],
        body,
    )
        .into_response())
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let schema = state.publisher.schema();
    let body = serde_json::json!({
        "status": "ok",
        "schema_version": schema.label(),
        "fingerprint": schema.fingerprint().to_hex(),
        "generation": state.publisher.generation(),
    });

    (StatusCode::OK, Json(body)).into_response()
}

/// Any method other than GET on a publishing endpoint.
pub async fn invalid_invocation() -> ApiError {
    ApiError::invalid_invocation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::ReadingsV1;
    use schemawire::{Publish, SchemaVersion};

    /// Publisher whose record never matches its schema.
    struct BrokenPublisher {
        schema: Arc<SchemaVersion>,
    }

    impl Publish for BrokenPublisher {
        fn schema(&self) -> &Arc<SchemaVersion> {
            &self.schema
        }

        fn encode_current(&self) -> Result<Vec<u8>, EncodeError> {
            Err(EncodeError::MissingField {
                path: "$".into(),
                field: "readings".into(),
            })
        }

        fn generation(&self) -> u64 {
            0
        }
    }

    fn broken_state() -> Arc<AppState> {
        let schema = SchemaVersion::of::<ReadingsV1>("v1").expect("schema");
        let publisher = Arc::new(BrokenPublisher {
            schema: Arc::new(schema),
        });
        Arc::new(AppState::new(publisher, SchemaFormat::Binary))
    }

    #[tokio::test]
    async fn test_encode_failure_is_internal_error() {
        let response = match get_data(State(broken_state())).await {
            Ok(_) => panic!("encode failure must not answer 200"),
            Err(err) => err.into_response(),
        };
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["code"], 500);
        let message = json["error"].as_str().expect("error");
        assert!(message.starts_with("internal error"), "{}", message);
        assert!(message.contains("missing field `readings`"), "{}", message);
    }

    #[tokio::test]
    async fn test_invalid_invocation_body() {
        let response = invalid_invocation().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "Invalid Invocation");
        assert_eq!(json["code"], 404);
    }
}
