//! Error types for extraction and caption operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while extracting metadata or captions.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yt-dlp exited with status {exit_code:?}: {stderr}")]
    ExtractionFailed {
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("{operation} timed out after {secs} seconds")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("invalid JSON from yt-dlp: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    #[error("caption fetch failed: {0}")]
    CaptionFetch(#[from] reqwest::Error),

    #[error("malformed caption document: {0}")]
    CaptionParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure classes reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tool exited with a non-zero status
    Extraction,
    /// Subprocess or caption fetch exceeded its bound
    Timeout,
    /// Tool output was not a JSON document
    MalformedOutput,
    /// Everything else, including caption fetch/parse failures
    Unclassified,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Extraction => "extraction",
            ErrorKind::Timeout => "timeout",
            ErrorKind::MalformedOutput => "malformed_output",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

impl MediaError {
    /// Create an extraction failure error.
    pub fn extraction_failed(stderr: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::ExtractionFailed {
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: &'static str, secs: u64) -> Self {
        Self::Timeout { operation, secs }
    }

    /// Create a caption parse error.
    pub fn caption_parse(message: impl Into<String>) -> Self {
        Self::CaptionParse(message.into())
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::ExtractionFailed { .. } => ErrorKind::Extraction,
            MediaError::Timeout { .. } => ErrorKind::Timeout,
            MediaError::MalformedOutput(_) => ErrorKind::MalformedOutput,
            MediaError::CaptionFetch(e) if e.is_timeout() => ErrorKind::Timeout,
            MediaError::YtDlpNotFound
            | MediaError::Spawn { .. }
            | MediaError::CaptionFetch(_)
            | MediaError::CaptionParse(_)
            | MediaError::Io(_) => ErrorKind::Unclassified,
        }
    }

    /// Message placed in the `error` field of a failed response.
    ///
    /// Everything except timeouts and malformed output is reported through
    /// the generic `Error: ...` form, tool failures included.
    pub fn failure_message(&self) -> String {
        match self {
            MediaError::ExtractionFailed { stderr, .. } => {
                format!("Error: yt-dlp error: {}", stderr.trim())
            }
            _ => match self.kind() {
                ErrorKind::Timeout => "Request timeout".to_string(),
                ErrorKind::MalformedOutput => "Invalid JSON response".to_string(),
                _ => format!("Error: {}", self),
            },
        }
    }
}
