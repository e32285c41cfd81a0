mod config;
mod http;
mod llm;
mod processor;
mod report;
pub mod tracing;
pub mod types;
pub mod yt;

pub use config::{AppConfig, ChannelRecord, ConfigError, DatabaseConfig, YoutubeConfig};
pub use llm::openai;
pub use llm::summarizer::{PromptConfig, SummarizationError, Summarizer, SummaryResponse};
pub use processor::{builder::ChannelProcessorBuilder, ChannelProcessor};
pub use report::{FailureKind, FailureLog, FailureRecord, RunReport};
pub use yt::{ListError, TranscriptError, TranscriptFetcher, VideoLister};
