//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_SLUG: &str = "youtube-transcript-service";

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(rename = "yt-dlp")]
    pub ytdlp: String,
    pub version: String,
}

/// Health check endpoint (liveness probe).
///
/// Static: does not look for the extraction tool.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_SLUG.to_string(),
        ytdlp: "installed".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ytdlp: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness check endpoint (readiness probe).
/// Resolves the configured extraction tool on PATH.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let program = state.transcripts.extractor().program();

    let ytdlp = match ytx_media::check_ytdlp(program) {
        Ok(path) => CheckStatus {
            status: "ok".to_string(),
            path: Some(path.display().to_string()),
            error: None,
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            path: None,
            error: Some(format!("{} ({})", e, program)),
        },
    };

    let all_ok = ytdlp.status == "ok";
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks { ytdlp },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
