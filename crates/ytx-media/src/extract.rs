//! Video metadata extraction via `yt-dlp --dump-json`.

use std::time::Instant;

use metrics::histogram;
use tracing::{debug, info};
use ytx_models::{watch_url, ExtractionRecord};

use crate::command::{YtDlpCommand, YtDlpRunner, DEFAULT_YTDLP_PROGRAM};
use crate::error::{MediaError, MediaResult};

/// Histogram of yt-dlp wall time.
pub const EXTRACTION_DURATION_SECONDS: &str = "ytx_extraction_duration_seconds";

/// Runs yt-dlp for a single video and parses its JSON document.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    program: String,
    extra_args: Vec<String>,
    sub_lang: String,
    runner: YtDlpRunner,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(60)
    }
}

impl MetadataExtractor {
    /// Create an extractor with the given timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            program: DEFAULT_YTDLP_PROGRAM.to_string(),
            extra_args: Vec::new(),
            sub_lang: "en".to_string(),
            runner: YtDlpRunner::new().with_timeout(timeout_secs),
        }
    }

    /// Override the executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments inserted before the fixed flags.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Subtitle language to request.
    pub fn with_sub_lang(mut self, lang: impl Into<String>) -> Self {
        self.sub_lang = lang.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn sub_lang(&self) -> &str {
        &self.sub_lang
    }

    /// Build the command for a normalized video ID.
    pub fn command(&self, video_id: &str) -> YtDlpCommand {
        YtDlpCommand::metadata(watch_url(video_id), self.sub_lang.clone())
            .program(self.program.clone())
            .extra_args(self.extra_args.iter().cloned())
    }

    /// Extract metadata for a normalized video ID. Single attempt, no retry.
    pub async fn extract(&self, video_id: &str) -> MediaResult<ExtractionRecord> {
        info!(video_id = %video_id, "Extracting video metadata with yt-dlp");
        let start = Instant::now();

        let result = self.runner.run(&self.command(video_id)).await;
        histogram!(EXTRACTION_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        let output = result?;
        let record = ExtractionRecord::from_json(&output.stdout).map_err(MediaError::MalformedOutput)?;

        debug!(
            video_id = %video_id,
            has_subtitles = record.subtitles.as_ref().is_some_and(|s| !s.is_empty()),
            has_automatic_captions = record.automatic_captions.as_ref().is_some_and(|s| !s.is_empty()),
            "yt-dlp metadata parsed"
        );

        Ok(record)
    }
}
