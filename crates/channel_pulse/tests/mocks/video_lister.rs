use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use channel_datastore::Video;
use channel_pulse::{ListError, VideoLister};

#[derive(Clone, Default)]
pub struct MockVideoLister {
    pub videos_by_channel: HashMap<String, Vec<Video>>,
    pub failing_channels: HashSet<String>,
    pub calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl MockVideoLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel_id: &str, videos: Vec<Video>) -> Self {
        self.videos_by_channel
            .insert(channel_id.to_string(), videos);
        self
    }

    pub fn failing_channel(mut self, channel_id: &str) -> Self {
        self.failing_channels.insert(channel_id.to_string());
        self
    }
}

impl VideoLister for MockVideoLister {
    async fn list_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, ListError> {
        self.calls
            .lock()
            .unwrap()
            .push((channel_id.to_string(), max_results));

        if self.failing_channels.contains(channel_id) {
            return Err(ListError::Api {
                status: 403,
                message: "quotaExceeded".into(),
            });
        }

        Ok(self
            .videos_by_channel
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(max_results as usize)
            .collect())
    }
}
