//! Caption track selection, fetching and timed-text parsing.
//!
//! Track selection is an ordered lookup over [`CAPTION_PRIORITY`]: manual
//! subtitles first, then automatic captions. The first listed resource of the
//! winning track is fetched with a plain GET and its `<text>` cues are joined
//! with single spaces.

use std::time::{Duration, Instant};

use metrics::histogram;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};
use ytx_models::{CaptionResource, ExtractionRecord};

use crate::error::{MediaError, MediaResult};

/// Histogram of caption fetch wall time.
pub const CAPTION_FETCH_DURATION_SECONDS: &str = "ytx_caption_fetch_duration_seconds";

/// Where a caption track comes from in the yt-dlp record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    /// `subtitles`: uploaded by the channel
    Manual,
    /// `automatic_captions`: generated by YouTube
    Automatic,
}

/// Sources in the order they are tried.
pub const CAPTION_PRIORITY: [CaptionSource; 2] = [CaptionSource::Manual, CaptionSource::Automatic];

impl CaptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionSource::Manual => "manual",
            CaptionSource::Automatic => "automatic",
        }
    }

    /// Resources of this source for `lang`, if any.
    fn resources<'a>(&self, record: &'a ExtractionRecord, lang: &str) -> Option<&'a [CaptionResource]> {
        let tracks = match self {
            CaptionSource::Manual => record.subtitles.as_ref(),
            CaptionSource::Automatic => record.automatic_captions.as_ref(),
        }?;
        tracks.get(lang).map(Vec::as_slice)
    }
}

/// Pick the caption resource to fetch for `lang`.
///
/// Returns the first resource of the highest-priority source that has a
/// non-empty track for the language.
pub fn select_caption<'a>(
    record: &'a ExtractionRecord,
    lang: &str,
) -> Option<(CaptionSource, &'a CaptionResource)> {
    CAPTION_PRIORITY.iter().find_map(|source| {
        source
            .resources(record, lang)
            .and_then(|resources| resources.first())
            .map(|resource| (*source, resource))
    })
}

/// Extract the plain transcript from a timed-text XML document.
///
/// Text of every `<text>` element is collected in document order and joined
/// with a single space. Elements with no text are skipped.
pub fn parse_timed_text(xml: &str) -> MediaResult<String> {
    let mut reader = Reader::from_str(xml);

    let mut cues: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    // Nesting inside the current <text> element
    let mut text_depth = 0usize;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            MediaError::caption_parse(format!("{} at position {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                if current.is_some() {
                    text_depth += 1;
                } else if e.name().as_ref() == b"text" {
                    current = Some(String::new());
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if current.is_some() {
                    if text_depth == 0 {
                        if let Some(cue) = current.take().filter(|c| !c.is_empty()) {
                            cues.push(cue);
                        }
                    } else {
                        text_depth -= 1;
                    }
                }
            }
            Event::Empty(_) => saw_root = true,
            Event::Text(t) => {
                if let Some(buf) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| MediaError::caption_parse(e.to_string()))?;
                    buf.push_str(&text);
                } else if depth == 0 && !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(MediaError::caption_parse("text outside of root element"));
                }
            }
            Event::CData(c) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(MediaError::caption_parse("document has no root element"));
    }
    if depth != 0 {
        return Err(MediaError::caption_parse("unexpected end of document"));
    }

    Ok(cues.join(" "))
}

/// Fetches and parses caption tracks over HTTP.
#[derive(Debug, Clone)]
pub struct CaptionFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    lang: String,
}

impl CaptionFetcher {
    /// Create a fetcher with a per-request timeout.
    ///
    /// Idle connections are not kept, so every fetch owns its connection.
    pub fn new(timeout_secs: u64) -> MediaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
            lang: "en".to_string(),
        })
    }

    /// Caption language to look up.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Fetch the transcript for a record.
    ///
    /// Returns an empty string without touching the network when the record
    /// has no track for the configured language.
    pub async fn fetch_transcript(&self, record: &ExtractionRecord) -> MediaResult<String> {
        let Some((source, resource)) = select_caption(record, &self.lang) else {
            debug!(lang = %self.lang, "No caption track available");
            return Ok(String::new());
        };

        info!(source = source.as_str(), lang = %self.lang, "Fetching caption track");
        let start = Instant::now();
        let result = self.fetch(&resource.url).await;
        histogram!(CAPTION_FETCH_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        parse_timed_text(&result?)
    }

    async fn fetch(&self, url: &str) -> MediaResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?
            .error_for_status()?;

        response.text().await.map_err(|e| self.map_reqwest(e))
    }

    fn map_reqwest(&self, e: reqwest::Error) -> MediaError {
        if e.is_timeout() {
            MediaError::timeout("caption fetch", self.timeout_secs)
        } else {
            MediaError::CaptionFetch(e)
        }
    }
}
