//! Raw yt-dlp `--dump-json` record.
//!
//! Only the fields the service reads are modelled; everything else in the
//! document is ignored. Every field is optional and `null` counts as absent.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A single caption/subtitle resource offered by yt-dlp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionResource {
    /// Resource URL
    pub url: String,
    /// Format extension (srv1, vtt, json3, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    /// Human readable track name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Caption tracks keyed by language code.
pub type CaptionTracks = HashMap<String, Vec<CaptionResource>>;

/// Metadata document produced by yt-dlp for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub channel_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    /// Duration in seconds
    #[serde(default, deserialize_with = "lenient_int")]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub view_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub like_count: Option<i64>,

    /// Upload date as YYYYMMDD
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail: Option<String>,

    /// Manually authored subtitles
    #[serde(default)]
    pub subtitles: Option<CaptionTracks>,
    /// Automatically generated captions
    #[serde(default)]
    pub automatic_captions: Option<CaptionTracks>,
}

impl ExtractionRecord {
    /// Parse the stdout of `yt-dlp --dump-json`.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw.trim())
    }
}

/// Accept integers or floats (yt-dlp reports some durations as floats).
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Number> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))))
}
