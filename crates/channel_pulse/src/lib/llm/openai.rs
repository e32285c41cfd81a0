use std::{borrow::Cow, sync::LazyLock};

use another_tiktoken_rs::{cl100k_base, CoreBPE};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    http,
    llm::summarizer::{PromptConfig, SummarizationError, Summarizer, SummaryResponse},
};

static BPE: LazyLock<Option<CoreBPE>> = LazyLock::new(|| cl100k_base().ok());

pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http::plain_client(http::REQUEST_TIMEOUT),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_completion_request(
        &self,
        prompt: &PromptConfig,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, SummarizationError> {
        let body = serde_json::json!({
            "model": prompt.model,
            "temperature": prompt.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": prompt.system_prompt
                },
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to make http request");
                if e.is_timeout() {
                    SummarizationError::Timeout
                } else {
                    SummarizationError::Api {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(SummarizationError::QuotaExceeded);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SummarizationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<CompletionResponse>()
            .await
            .map_err(|e| SummarizationError::MalformedResponse(e.to_string()))
    }

    /// Clamps the transcript to the context window so an oversized video
    /// degrades to a truncated summary instead of a hard 400.
    fn clamp_to_context_window(transcript: &str) -> Cow<'_, str> {
        let Some(bpe) = BPE.as_ref() else {
            return Cow::Borrowed(transcript);
        };

        let tokens = bpe.encode_with_special_tokens(transcript);
        if tokens.len() <= Self::CONTEXT_WINDOW_LIMIT {
            return Cow::Borrowed(transcript);
        }

        tracing::warn!(
            token_count = tokens.len(),
            limit = Self::CONTEXT_WINDOW_LIMIT,
            "Transcript exceeds context window, truncating"
        );

        match bpe.decode(tokens[..Self::CONTEXT_WINDOW_LIMIT].to_vec()) {
            Ok(truncated) => Cow::Owned(truncated),
            Err(_) => Cow::Borrowed(transcript),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

impl Summarizer for OpenAIClient {
    async fn summarize(
        &self,
        transcript: &str,
        prompt: &PromptConfig,
    ) -> Result<SummaryResponse, SummarizationError> {
        let transcript = Self::clamp_to_context_window(transcript);
        let user_content = prompt.render_user_prompt(&transcript);

        let response = self
            .send_completion_request(prompt, user_content)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                SummarizationError::MalformedResponse("no content in response".into())
            })?;

        let token_count = response.usage.map(|u| u.total_tokens).unwrap_or(0);

        Ok(SummaryResponse {
            summary,
            token_count,
        })
    }
}
