//! Shared data models for the YouTube transcript service.
//!
//! This crate provides Serde-serializable types for:
//! - The transcript request body / query string
//! - The raw yt-dlp extraction record
//! - The flattened response returned to clients
//!
//! It also hosts the pure pieces of the pipeline: video ID normalization
//! and response assembly.

pub mod extraction;
pub mod utils;
pub mod video;

// Re-export common types
pub use extraction::{CaptionResource, ExtractionRecord};
pub use utils::{extract_video_id, is_valid_video_id_length, watch_url, VIDEO_ID_LEN};
pub use video::{TranscriptRequest, VideoDataResponse};
