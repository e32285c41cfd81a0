use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use channel_pulse::{TranscriptError, TranscriptFetcher};

#[derive(Clone, Default)]
pub struct MockTranscriptFetcher {
    pub transcripts: HashMap<String, String>,
    pub errors: HashMap<String, TranscriptError>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranscriptFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(mut self, video_id: &str, text: &str) -> Self {
        self.transcripts
            .insert(video_id.to_string(), text.to_string());
        self
    }

    pub fn with_error(mut self, video_id: &str, error: TranscriptError) -> Self {
        self.errors.insert(video_id.to_string(), error);
        self
    }
}

impl TranscriptFetcher for MockTranscriptFetcher {
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        self.calls.lock().unwrap().push(video_id.to_string());

        if let Some(error) = self.errors.get(video_id) {
            return Err(error.clone());
        }

        self.transcripts
            .get(video_id)
            .cloned()
            .ok_or(TranscriptError::NotAvailable)
    }
}
