use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Substitution marker the user prompt template must carry.
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

const DEFAULT_SYSTEM_PROMPT: &str = include_str!("./prompts/system_0.txt");
const DEFAULT_USER_PROMPT_TEMPLATE: &str = include_str!("./prompts/user_0.txt");

pub trait Summarizer {
    /// Transcript budget in tokens, leaving headroom for the prompt
    /// scaffolding and the completion itself.
    const CONTEXT_WINDOW_LIMIT: usize = 128_000 - 18_000;

    fn summarize(
        &self,
        transcript: &str,
        prompt: &PromptConfig,
    ) -> impl Future<Output = Result<SummaryResponse, SummarizationError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SummaryResponse {
    pub summary: String,
    /// Total tokens billed for the call, as reported by the provider.
    pub token_count: i64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SummarizationError {
    #[error("text generation quota exceeded")]
    QuotaExceeded,
    #[error("text generation request timed out")]
    Timeout,
    #[error("malformed text generation response: {0}")]
    MalformedResponse(String),
    #[error("text generation API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// The `openai` section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
    pub user_prompt_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo-16k".into(),
            temperature: 0.0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.trim().to_string(),
            user_prompt_template: DEFAULT_USER_PROMPT_TEMPLATE.trim().to_string(),
        }
    }
}

impl PromptConfig {
    /// A template without the placeholder would silently drop the
    /// transcript from every request, so this fails the run at startup
    /// instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.user_prompt_template.contains(TRANSCRIPT_PLACEHOLDER) {
            return Err(ConfigError::MissingTranscriptPlaceholder);
        }
        Ok(())
    }

    pub fn render_user_prompt(&self, transcript: &str) -> String {
        self.user_prompt_template
            .replace(TRANSCRIPT_PLACEHOLDER, transcript)
    }
}
