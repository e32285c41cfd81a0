use std::{
    fs::OpenOptions,
    io::Write as _,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SummarizationError, TranscriptError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ChannelList,
    TranscriptNotAvailable,
    TranscriptRateLimited,
    TranscriptUnknown,
    SummarizationQuotaExceeded,
    SummarizationTimeout,
    SummarizationMalformedResponse,
    SummarizationApi,
    Storage,
}

impl From<&TranscriptError> for FailureKind {
    fn from(err: &TranscriptError) -> Self {
        match err {
            TranscriptError::NotAvailable => FailureKind::TranscriptNotAvailable,
            TranscriptError::RateLimited => FailureKind::TranscriptRateLimited,
            TranscriptError::Unknown(_) => FailureKind::TranscriptUnknown,
        }
    }
}

impl From<&SummarizationError> for FailureKind {
    fn from(err: &SummarizationError) -> Self {
        match err {
            SummarizationError::QuotaExceeded => FailureKind::SummarizationQuotaExceeded,
            SummarizationError::Timeout => FailureKind::SummarizationTimeout,
            SummarizationError::MalformedResponse(_) => {
                FailureKind::SummarizationMalformedResponse
            }
            SummarizationError::Api { .. } => FailureKind::SummarizationApi,
        }
    }
}

/// One recorded failure. `id` is a video id, except for
/// [`FailureKind::ChannelList`] where it is the channel id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub id: String,
    pub kind: FailureKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    pub fn new(id: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate outcome of one pipeline run. Counters partition items by
/// terminal state; `failures` keeps the per-item detail for operators.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    pub items_seen: usize,
    pub processed: usize,
    pub skipped: usize,
    pub transcript_failed: usize,
    pub summarization_failed: usize,
    pub channel_failed: usize,
    pub storage_failed: usize,
    pub cancelled: usize,
    pub failures: Vec<FailureRecord>,
}

/// Append-only JSONL side-channel for rows the store could not accept, so
/// operators can reconcile lost writes after the run.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &FailureRecord) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")
    }
}
