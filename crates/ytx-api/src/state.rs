//! Application state.

use std::sync::Arc;

use ytx_media::MediaResult;

use crate::config::ApiConfig;
use crate::services::TranscriptService;

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub transcripts: Arc<TranscriptService>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> MediaResult<Self> {
        let transcripts = TranscriptService::new(&config)?;

        Ok(Self {
            config,
            transcripts: Arc::new(transcripts),
        })
    }
}
