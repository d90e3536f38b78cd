//! Request and response models for the transcript endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::extraction::ExtractionRecord;

/// Request body for `POST /transcript` (and query string for `GET /transcript`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptRequest {
    /// YouTube video ID (11 characters) or a watch / short-link URL
    pub video_id: String,
}

/// Flattened video data returned to clients.
///
/// On success every metadata field is populated (with defaults when yt-dlp
/// did not report it). On failure only `success`, `video_id` and `error`
/// carry meaning; all other fields serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoDataResponse {
    pub success: bool,
    pub video_id: String,
    pub video_title: Option<String>,
    pub channel_name: Option<String>,
    pub channel_url: Option<String>,
    pub description: Option<String>,
    /// Duration in seconds
    pub duration: Option<i64>,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    /// Upload date as YYYYMMDD
    pub upload_date: Option<String>,
    /// Comma separated tags
    pub tags: Option<String>,
    /// Comma separated categories
    pub categories: Option<String>,
    pub thumbnail_url: Option<String>,
    pub transcript: Option<String>,
    /// Transcript length in characters
    pub length: Option<i64>,
    pub error: Option<String>,
}

impl VideoDataResponse {
    /// Assemble a successful response from a yt-dlp record and transcript.
    ///
    /// Absent text fields become `""`, absent counters become `0`, and list
    /// fields are joined with `", "`.
    pub fn from_extraction(
        video_id: impl Into<String>,
        record: &ExtractionRecord,
        transcript: impl Into<String>,
    ) -> Self {
        let transcript = transcript.into();
        let length = transcript.chars().count() as i64;

        Self {
            success: true,
            video_id: video_id.into(),
            video_title: Some(text_or_empty(&record.title)),
            channel_name: Some(text_or_empty(&record.channel)),
            channel_url: Some(text_or_empty(&record.channel_url)),
            description: Some(text_or_empty(&record.description)),
            duration: Some(record.duration.unwrap_or(0)),
            view_count: Some(record.view_count.unwrap_or(0)),
            like_count: Some(record.like_count.unwrap_or(0)),
            upload_date: Some(text_or_empty(&record.upload_date)),
            tags: Some(join_list(&record.tags)),
            categories: Some(join_list(&record.categories)),
            thumbnail_url: Some(text_or_empty(&record.thumbnail)),
            transcript: Some(transcript),
            length: Some(length),
            error: None,
        }
    }

    /// Build a failure response carrying only the ID and error message.
    pub fn failure(video_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            video_id: video_id.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

fn text_or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn join_list(values: &Option<Vec<String>>) -> String {
    values.as_deref().unwrap_or_default().join(", ")
}
