//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// yt-dlp executable
    pub ytdlp_path: String,
    /// Arguments inserted before the fixed yt-dlp flags
    pub ytdlp_extra_args: Vec<String>,
    /// Caption language
    pub subtitle_lang: String,
    /// Bound on the yt-dlp subprocess
    pub extraction_timeout: Duration,
    /// Bound on the caption fetch
    pub caption_timeout: Duration,
    /// Serve Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 64 * 1024, // 64KB
            ytdlp_path: "yt-dlp".to_string(),
            ytdlp_extra_args: Vec::new(),
            subtitle_lang: "en".to_string(),
            extraction_timeout: Duration::from_secs(60),
            caption_timeout: Duration::from_secs(30),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: parsed("API_PORT")
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(defaults.port),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: parsed("MAX_BODY_SIZE")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.max_body_size),
            ytdlp_path: lookup("YTDLP_PATH")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.ytdlp_path),
            ytdlp_extra_args: lookup("YTDLP_EXTRA_ARGS")
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.ytdlp_extra_args),
            subtitle_lang: lookup("SUBTITLE_LANG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.subtitle_lang),
            extraction_timeout: parsed("EXTRACTION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.extraction_timeout),
            caption_timeout: parsed("CAPTION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.caption_timeout),
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }
}
