//! Wire types for the YouTube Data API v3 and the timedtext caption
//! payloads, plus the conversion into the stored [`Video`] row.

use channel_datastore::{parse_iso8601_duration, Video};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    /// Absent for playlist/channel results mixed into a search page.
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    pub snippet: VideoSnippet,
    pub content_details: Option<ContentDetails>,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    /// ISO-8601, e.g. `PT4M13S`.
    pub duration: String,
}

// engagement counters arrive as decimal strings, any of them may be absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

/// One entry of the `captionTracks` array embedded in a watch page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: Option<String>,
    /// `"asr"` marks an auto-generated track.
    #[serde(default)]
    pub kind: Option<String>,
}

impl From<VideoResource> for Video {
    fn from(resource: VideoResource) -> Self {
        let VideoResource {
            id,
            snippet,
            content_details,
            statistics,
        } = resource;

        let statistics = statistics.unwrap_or_default();
        let count = |s: &Option<String>| s.as_deref().and_then(|v| v.parse::<i64>().ok());

        Video {
            video_id: id,
            channel_id: snippet.channel_id,
            published_at: snippet.published_at,
            title: snippet.title,
            description: snippet.description,
            tags: snippet.tags.unwrap_or_default(),
            duration_seconds: content_details
                .as_ref()
                .and_then(|d| parse_iso8601_duration(&d.duration)),
            view_count: count(&statistics.view_count),
            like_count: count(&statistics.like_count),
            comment_count: count(&statistics.comment_count),
            transcript: None,
            summary: None,
            is_processed: false,
            token_count: 0,
            api_call_count: 0,
            last_api_call_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_video_resource_to_video() {
        let json = serde_json::json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "publishedAt": "2024-05-01T12:00:00Z",
                "channelId": "UC123",
                "title": "A video",
                "description": "About things",
                "tags": ["one", "two"]
            },
            "contentDetails": { "duration": "PT4M13S" },
            "statistics": { "viewCount": "1000", "likeCount": "10" }
        });

        let resource: VideoResource = serde_json::from_value(json).unwrap();
        let video = Video::from(resource);

        assert_eq!(video.video_id, "dQw4w9WgXcQ");
        assert_eq!(video.channel_id, "UC123");
        assert_eq!(video.tags, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(video.duration_seconds, Some(253));
        assert_eq!(video.view_count, Some(1000));
        assert_eq!(video.like_count, Some(10));
        assert_eq!(video.comment_count, None);
        assert!(!video.is_processed);
        assert_eq!(video.token_count, 0);
    }

    #[test]
    fn tolerates_missing_statistics_and_details() {
        let json = serde_json::json!({
            "id": "xyz",
            "snippet": {
                "publishedAt": "2024-05-01T12:00:00Z",
                "channelId": "UC123",
                "title": "Bare"
            }
        });

        let resource: VideoResource = serde_json::from_value(json).unwrap();
        let video = Video::from(resource);

        assert_eq!(video.duration_seconds, None);
        assert_eq!(video.view_count, None);
        assert!(video.tags.is_empty());
        assert_eq!(video.description, "");
    }
}
