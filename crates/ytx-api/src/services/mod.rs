//! Business logic services.

pub mod transcript;

pub use transcript::TranscriptService;
