use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Matches ISO-8601 durations as YouTube reports them, e.g. `PT1H2M3S`,
/// `PT4M13S`, `P1DT2H`.
pub static ISO8601_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap()
});

/// One video row. `video_id` is the idempotency key: the same video listed
/// again on a later run maps onto the same row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Video {
    pub video_id: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub duration_seconds: Option<i64>,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub is_processed: bool,
    pub token_count: i64,
    pub api_call_count: i64,
    pub last_api_call_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Marks the video fully processed. This is the only place
    /// `is_processed` flips to true, and it requires an owned summary, so a
    /// processed row can never carry a NULL summary.
    pub fn mark_processed(&mut self, summary: String, token_count: i64, at: DateTime<Utc>) {
        self.summary = Some(summary);
        self.is_processed = true;
        self.token_count += token_count.max(0);
        self.api_call_count += 1;
        self.last_api_call_at = Some(at);
    }

    /// Carries the API accounting of a previously persisted, unprocessed
    /// row into a freshly listed one so token/call counters survive
    /// re-listing.
    pub fn carry_accounting_from(&mut self, prior: &Video) {
        self.token_count = prior.token_count;
        self.api_call_count = prior.api_call_count;
        self.last_api_call_at = prior.last_api_call_at;
    }
}

/// Parses an ISO-8601 duration into whole seconds. Returns `None` for
/// malformed input rather than failing the row.
pub fn parse_iso8601_duration(duration: &str) -> Option<i64> {
    let caps = ISO8601_DURATION_RE.captures(duration)?;

    let part = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };

    let days = part(1);
    let hours = part(2);
    let minutes = part(3);
    let seconds = part(4);

    let total = days * 86_400 + hours * 3_600 + minutes * 60 + seconds;
    // "P" alone (or "PT") carries no duration information
    if caps.get(1).is_none() && caps.get(2).is_none() && caps.get(3).is_none() && caps.get(4).is_none()
    {
        return None;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> Video {
        Video {
            video_id: "abc123".into(),
            channel_id: "UC0001".into(),
            published_at: Utc::now(),
            title: "A title".into(),
            description: String::new(),
            tags: vec![],
            duration_seconds: Some(253),
            view_count: Some(10),
            like_count: None,
            comment_count: None,
            transcript: None,
            summary: None,
            is_processed: false,
            token_count: 0,
            api_call_count: 0,
            last_api_call_at: None,
        }
    }

    #[test]
    fn parses_hms_duration() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT4M13S"), Some(253));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("P1DT2H"), Some(93600));
    }

    #[test]
    fn rejects_malformed_duration() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("4:13"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("P"), None);
    }

    #[test]
    fn mark_processed_sets_summary_and_accounting() {
        let mut video = sample_video();
        let at = Utc::now();
        video.mark_processed("a summary".into(), 1200, at);

        assert!(video.is_processed);
        assert_eq!(video.summary.as_deref(), Some("a summary"));
        assert_eq!(video.token_count, 1200);
        assert_eq!(video.api_call_count, 1);
        assert_eq!(video.last_api_call_at, Some(at));
    }

    #[test]
    fn token_count_only_grows() {
        let mut video = sample_video();
        video.mark_processed("first".into(), 100, Utc::now());
        let after_first = video.token_count;
        video.mark_processed("second".into(), 50, Utc::now());
        assert!(video.token_count > after_first);

        // a negative usage figure from upstream must not shrink the counter
        let before = video.token_count;
        video.mark_processed("third".into(), -10, Utc::now());
        assert_eq!(video.token_count, before);
    }

    #[test]
    fn carry_accounting_preserves_counters() {
        let mut prior = sample_video();
        prior.mark_processed("s".into(), 300, Utc::now());
        prior.is_processed = false;

        let mut fresh = sample_video();
        fresh.carry_accounting_from(&prior);
        assert_eq!(fresh.token_count, 300);
        assert_eq!(fresh.api_call_count, 1);
        assert_eq!(fresh.last_api_call_at, prior.last_api_call_at);
    }
}
