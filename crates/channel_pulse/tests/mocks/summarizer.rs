use std::sync::{Arc, Mutex};

use channel_pulse::{PromptConfig, SummarizationError, Summarizer, SummaryResponse};

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    pub token_count: i64,
    pub fail_with: Option<SummarizationError>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockSummarizer {
    pub fn new(summary: &str, token_count: i64) -> Self {
        Self {
            summary: summary.to_string(),
            token_count,
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: SummarizationError) -> Self {
        Self {
            summary: String::new(),
            token_count: 0,
            fail_with: Some(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        _prompt: &PromptConfig,
    ) -> Result<SummaryResponse, SummarizationError> {
        self.calls.lock().unwrap().push(transcript.to_string());

        if let Some(ref error) = self.fail_with {
            return Err(error.clone());
        }

        Ok(SummaryResponse {
            summary: self.summary.clone(),
            token_count: self.token_count,
        })
    }
}
