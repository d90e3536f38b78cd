//! Utility functions for video ID parsing and validation.
//!
//! Input is treated as untrusted: either a full watch URL, a `youtu.be`
//! short link, or a bare 11-character video ID.

use std::sync::OnceLock;

use regex::Regex;

/// YouTube video IDs are exactly 11 characters.
pub const VIDEO_ID_LEN: usize = 11;

/// Base URL for canonical watch pages.
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Recognition patterns, tried in order. Each captures the ID in group 1.
fn id_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // watch?v=ID or ...&v=ID
            Regex::new(r"[?&]v=([a-zA-Z0-9_-]{11})").expect("valid watch pattern"),
            // youtu.be/ID
            Regex::new(r"youtu\.be/([a-zA-Z0-9_-]{11})").expect("valid short link pattern"),
            // bare ID
            Regex::new(r"^([a-zA-Z0-9_-]{11})$").expect("valid bare id pattern"),
        ]
    })
}

/// Extract a YouTube video ID from a URL or bare ID.
///
/// Supported formats:
/// - https://www.youtube.com/watch?v=VIDEO_ID (also `&v=` in any position)
/// - https://youtu.be/VIDEO_ID
/// - VIDEO_ID
///
/// Returns the first match. When nothing matches the input is returned
/// unchanged, so callers must still check the length with
/// [`is_valid_video_id_length`].
pub fn extract_video_id(input: &str) -> String {
    id_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

/// Check the 11-character rule applied after normalization.
pub fn is_valid_video_id_length(video_id: &str) -> bool {
    video_id.chars().count() == VIDEO_ID_LEN
}

/// Build the canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_BASE, video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_watch_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=42"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?v=a-b_c1D2e3F"),
            "a-b_c1D2e3F"
        );
    }

    #[test]
    fn test_extract_from_short_links() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=30"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_video_id("youtu.be/_-_-_-_-_-_"), "_-_-_-_-_-_");
    }

    #[test]
    fn test_bare_id_is_returned_unchanged() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_pattern_wins_over_short_link() {
        // Both patterns match; the query parameter is checked first.
        assert_eq!(
            extract_video_id("https://youtu.be/AAAAAAAAAAA?v=BBBBBBBBBBB"),
            "BBBBBBBBBBB"
        );
    }

    #[test]
    fn test_unrecognized_input_is_passed_through() {
        assert_eq!(extract_video_id("short"), "short");
        assert_eq!(
            extract_video_id("https://vimeo.com/123456"),
            "https://vimeo.com/123456"
        );
        // Too short after v=
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc"),
            "https://www.youtube.com/watch?v=abc"
        );
        assert_eq!(extract_video_id(""), "");
    }

    #[test]
    fn test_bare_pattern_is_anchored() {
        // 12 id characters: no pattern matches, input comes back as-is.
        assert_eq!(extract_video_id("dQw4w9WgXcQX"), "dQw4w9WgXcQX");
        // Invalid character in an 11-char string.
        assert_eq!(extract_video_id("dQw4w9WgXc!"), "dQw4w9WgXc!");
    }

    #[test]
    fn test_length_validation() {
        assert!(is_valid_video_id_length("dQw4w9WgXcQ"));
        assert!(!is_valid_video_id_length("dQw4w9WgXc"));
        assert!(!is_valid_video_id_length("dQw4w9WgXcQX"));
        assert!(!is_valid_video_id_length(""));
        // Counted in characters, not bytes.
        assert!(is_valid_video_id_length("ééééééééééé"));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
