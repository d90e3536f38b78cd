//! yt-dlp CLI wrapper and caption fetching.
//!
//! This crate provides:
//! - Type-safe yt-dlp command building
//! - A runner with timeout and guaranteed process cleanup
//! - Metadata extraction into [`ytx_models::ExtractionRecord`]
//! - Caption track selection, fetching and timed-text parsing

pub mod captions;
pub mod command;
pub mod error;
pub mod extract;

pub use captions::{
    parse_timed_text, select_caption, CaptionFetcher, CaptionSource, CAPTION_PRIORITY,
};
pub use command::{check_ytdlp, YtDlpCommand, YtDlpOutput, YtDlpRunner};
pub use error::{ErrorKind, MediaError, MediaResult};
pub use extract::MetadataExtractor;
