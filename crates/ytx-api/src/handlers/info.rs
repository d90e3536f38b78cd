//! Service information handlers.

use axum::Json;
use schemars::schema_for;
use serde::Serialize;
use serde_json::{json, Value};
use ytx_models::{TranscriptRequest, VideoDataResponse};

/// Human readable service name.
pub const SERVICE_NAME: &str = "YouTube Transcript Service";

/// Number of data fields the service reports per video.
pub const FIELD_COUNT: u32 = 17;

/// Root response.
#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub fields: u32,
    pub endpoints: Value,
}

/// Root endpoint - API information.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        fields: FIELD_COUNT,
        endpoints: json!({
            "/": "GET - API information",
            "/health": "GET - Health check",
            "/ready": "GET - Readiness check",
            "/transcript": "POST/GET - Get full video data (17 fields)",
            "/schema": "GET - Request/response JSON schemas",
        }),
    })
}

/// JSON schemas of the transcript request and response.
pub async fn schema() -> Json<Value> {
    Json(json!({
        "TranscriptRequest": schema_for!(TranscriptRequest),
        "VideoDataResponse": schema_for!(VideoDataResponse),
    }))
}
