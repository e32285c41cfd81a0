pub mod datastore;
pub mod summarizer;
pub mod transcript_fetcher;
pub mod video_lister;

use channel_datastore::Video;
use chrono::{TimeZone, Utc};

/// A freshly listed, unenriched video.
pub fn listed_video(video_id: &str, channel_id: &str) -> Video {
    Video {
        video_id: video_id.to_string(),
        channel_id: channel_id.to_string(),
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        title: format!("Video {video_id}"),
        description: String::new(),
        tags: Vec::new(),
        duration_seconds: Some(600),
        view_count: Some(100),
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
