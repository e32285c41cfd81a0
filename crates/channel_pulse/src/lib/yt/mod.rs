pub mod data_api;
pub mod transcript;

use std::future::Future;

use channel_datastore::Video;

/// Lists candidate videos for a channel, newest first, bounded by
/// `max_results`.
pub trait VideoLister {
    fn list_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> impl Future<Output = Result<Vec<Video>, ListError>> + Send;
}

/// Retrieves the long-form transcript text for a video. Failure is expected
/// and non-fatal; the kind is preserved for the run report.
pub trait TranscriptFetcher {
    fn fetch_transcript(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<String, TranscriptError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),
    #[error("decode error: {0}")]
    Decode(#[from] reqwest::Error),
    #[error("content listing API error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TranscriptError {
    #[error("no transcript available")]
    NotAvailable,
    #[error("transcript endpoint rate limited")]
    RateLimited,
    #[error("transcript fetch failed: {0}")]
    Unknown(String),
}
