//! Transcript pipeline: normalize → extract → fetch captions → assemble.

use std::time::Instant;

use tracing::{info, warn};
use ytx_media::{CaptionFetcher, MediaResult, MetadataExtractor};
use ytx_models::{extract_video_id, is_valid_video_id_length, VideoDataResponse};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Runs the extraction pipeline for one request at a time. Holds no
/// per-request state, so a single instance is shared by all handlers.
#[derive(Debug, Clone)]
pub struct TranscriptService {
    extractor: MetadataExtractor,
    captions: CaptionFetcher,
}

impl TranscriptService {
    /// Build the service from configuration. Fails only at startup, when the
    /// caption HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> MediaResult<Self> {
        let extractor = MetadataExtractor::new(config.extraction_timeout.as_secs())
            .with_program(config.ytdlp_path.clone())
            .with_extra_args(config.ytdlp_extra_args.clone())
            .with_sub_lang(config.subtitle_lang.clone());

        let captions = CaptionFetcher::new(config.caption_timeout.as_secs())?
            .with_lang(config.subtitle_lang.clone());

        Ok(Self { extractor, captions })
    }

    /// The configured extractor.
    pub fn extractor(&self) -> &MetadataExtractor {
        &self.extractor
    }

    /// Normalize user input into an 11-character video ID.
    pub fn normalize(raw: &str) -> ApiResult<String> {
        let video_id = extract_video_id(raw);
        if !is_valid_video_id_length(&video_id) {
            return Err(ApiError::validation(format!(
                "Invalid video_id: {}. Must be 11 characters.",
                video_id
            )));
        }
        Ok(video_id)
    }

    /// Fetch video data for a raw ID or URL.
    ///
    /// Only input validation fails the call. Pipeline errors are folded into
    /// a `success: false` response that echoes the raw input.
    pub async fn fetch_video_data(&self, raw: &str) -> ApiResult<VideoDataResponse> {
        let video_id = Self::normalize(raw)?;
        let start = Instant::now();

        match self.run_pipeline(&video_id).await {
            Ok(response) => {
                info!(
                    video_id = %video_id,
                    transcript_length = response.length.unwrap_or_default(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Video data extracted"
                );
                metrics::record_extraction("success");
                Ok(response)
            }
            Err(e) => {
                let kind = e.kind();
                warn!(
                    video_id = %video_id,
                    kind = kind.as_str(),
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Video data extraction failed"
                );
                metrics::record_extraction(kind.as_str());
                Ok(VideoDataResponse::failure(raw, e.failure_message()))
            }
        }
    }

    async fn run_pipeline(&self, video_id: &str) -> MediaResult<VideoDataResponse> {
        let record = self.extractor.extract(video_id).await?;
        let transcript = self.captions.fetch_transcript(&record).await?;
        Ok(VideoDataResponse::from_extraction(video_id, &record, transcript))
    }
}
