use std::sync::LazyLock;

use quick_xml::events::Event;
use regex::Regex;
use reqwest_middleware::ClientWithMiddleware;

use crate::{
    http,
    types::CaptionTrack,
    yt::{TranscriptError, TranscriptFetcher},
};

static CAPTION_TRACKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""captionTracks"\s*:\s*"#).unwrap());

/// Fetches transcripts straight from YouTube's timedtext endpoint: load the
/// watch page, pull the `captionTracks` player data out of the HTML, then
/// download and flatten the chosen track's XML.
pub struct TimedTextClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl TimedTextClient {
    pub const WATCH_URL: &str = "https://www.youtube.com/watch";

    pub fn new() -> Self {
        Self {
            client: http::retrying_client(http::REQUEST_TIMEOUT),
            base_url: Self::WATCH_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, TranscriptError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| TranscriptError::Unknown(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(TranscriptError::RateLimited);
        }
        if !status.is_success() {
            return Err(TranscriptError::Unknown(format!(
                "unexpected status {status}"
            )));
        }

        resp.text()
            .await
            .map_err(|e| TranscriptError::Unknown(e.to_string()))
    }
}

impl Default for TimedTextClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptFetcher for TimedTextClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        let html = self.get_text(&self.base_url, &[("v", video_id)]).await?;

        let tracks = parse_caption_tracks(&html)?;
        let track = select_track(&tracks).ok_or(TranscriptError::NotAvailable)?;

        let xml = self.get_text(&track.base_url, &[]).await?;
        let text = flatten_timedtext(&xml)?;
        if text.is_empty() {
            return Err(TranscriptError::NotAvailable);
        }

        Ok(text)
    }
}

/// Extracts the `captionTracks` array embedded in the watch page player
/// config. An absent block means the video simply has no captions.
fn parse_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let Some(m) = CAPTION_TRACKS_RE.find(html) else {
        return Ok(Vec::new());
    };

    let json = extract_json_array(&html[m.end()..]).ok_or_else(|| {
        TranscriptError::Unknown("unterminated captionTracks array in watch page".into())
    })?;

    serde_json::from_str::<Vec<CaptionTrack>>(json)
        .map_err(|e| TranscriptError::Unknown(format!("captionTracks decode failed: {e}")))
}

/// Returns the prefix of `input` forming one balanced JSON array, tracking
/// string and escape state so brackets inside values don't end the scan.
fn extract_json_array(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Prefers a manually authored English track, then any English track, then
/// whatever comes first.
fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let is_english = |t: &&CaptionTrack| {
        t.language_code
            .as_deref()
            .is_some_and(|code| code.starts_with("en"))
    };

    tracks
        .iter()
        .filter(|t| t.kind.as_deref() != Some("asr"))
        .find(is_english)
        .or_else(|| tracks.iter().find(is_english))
        .or_else(|| tracks.first())
}

/// Flattens timedtext XML into one whitespace-joined string, decoding the
/// doubly escaped entities the endpoint emits.
fn flatten_timedtext(xml: &str) -> Result<String, TranscriptError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| TranscriptError::Unknown(format!("timedtext decode failed: {err}")))?;
                let text = html_escape::decode_html_entities(text.as_ref());
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(trimmed);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(TranscriptError::Unknown(format!(
                    "timedtext parse failed: {e}"
                )))
            }
        }
    }

    Ok(out)
}
