//! Transcript handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use ytx_models::{TranscriptRequest, VideoDataResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Get complete video data from a JSON body.
///
/// Invalid IDs fail with 400. Extraction failures are reported as
/// `success: false` with status 200.
pub async fn post_transcript(
    State(state): State<AppState>,
    request: Result<Json<TranscriptRequest>, JsonRejection>,
) -> ApiResult<Json<VideoDataResponse>> {
    let Json(request) = request.map_err(|e| ApiError::bad_request(e.body_text()))?;
    get_video_data(&state, request).await
}

/// Same as [`post_transcript`], reading `video_id` from the query string.
pub async fn get_transcript(
    State(state): State<AppState>,
    query: Result<Query<TranscriptRequest>, QueryRejection>,
) -> ApiResult<Json<VideoDataResponse>> {
    let Query(request) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    get_video_data(&state, request).await
}

async fn get_video_data(
    state: &AppState,
    request: TranscriptRequest,
) -> ApiResult<Json<VideoDataResponse>> {
    let response = state.transcripts.fetch_video_data(&request.video_id).await?;
    Ok(Json(response))
}
