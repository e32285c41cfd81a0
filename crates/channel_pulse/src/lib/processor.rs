pub mod builder;

use std::{collections::HashSet, sync::Mutex};

use channel_datastore::{DataStore, Video};
use chrono::Utc;
use futures::{stream, StreamExt};
use itertools::Itertools;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ChannelRecord,
    llm::summarizer::{PromptConfig, SummarizationError, Summarizer},
    report::{FailureKind, FailureLog, FailureRecord, RunReport},
    yt::{TranscriptError, TranscriptFetcher, VideoLister},
};

// The core channel ingestion-and-enrichment pipeline
pub struct ChannelProcessor<D, L, T, S>
where
    D: DataStore + Send + Sync + 'static,
    L: VideoLister + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    store: D,
    lister: L,
    transcripts: T,
    summarizer: S,
    prompt: PromptConfig,
    max_results: u32,
    concurrency: usize,
    cancel: CancellationToken,
    failure_log: Option<FailureLog>,
    // ids taken by a worker this run, so one video never bills twice even
    // when listed by several channels
    claimed: Mutex<HashSet<String>>,
}

/// Terminal state of one item. Every variant except `Cancelled` has
/// triggered exactly one upsert attempt (or deliberately none for
/// `Skipped`).
enum ItemOutcome {
    Skipped,
    Cancelled,
    Processed,
    TranscriptFailed {
        video_id: String,
        error: TranscriptError,
        storage_error: Option<String>,
    },
    SummarizationFailed {
        video_id: String,
        error: SummarizationError,
        storage_error: Option<String>,
    },
    StorageFailed {
        video_id: String,
        message: String,
    },
}

impl<D, L, T, S> ChannelProcessor<D, L, T, S>
where
    D: DataStore + Send + Sync + 'static,
    L: VideoLister + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    /// Runs the pipeline over the given channel snapshot. Item- and
    /// channel-level failures are recorded in the returned report and never
    /// abort the batch; the only error returned here is an invalid prompt
    /// configuration, checked before anything else starts.
    #[tracing::instrument(skip_all, fields(channels = channels.len()))]
    pub async fn run(self, channels: &[ChannelRecord]) -> anyhow::Result<RunReport> {
        self.prompt.validate()?;

        let mut report = RunReport::default();

        for channel in channels.iter().filter(|c| c.enabled) {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, not starting further channels");
                break;
            }
            self.process_channel(channel, &mut report).await;
        }

        tracing::info!(
            items_seen = report.items_seen,
            processed = report.processed,
            skipped = report.skipped,
            transcript_failed = report.transcript_failed,
            summarization_failed = report.summarization_failed,
            channel_failed = report.channel_failed,
            storage_failed = report.storage_failed,
            cancelled = report.cancelled,
            "Run complete"
        );

        Ok(report)
    }

    #[tracing::instrument(skip(self, report), fields(channel_id = %channel.id))]
    async fn process_channel(&self, channel: &ChannelRecord, report: &mut RunReport) {
        let videos = match self.lister.list_videos(&channel.id, self.max_results).await {
            Ok(videos) => videos,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list channel videos");
                report.channel_failed += 1;
                report.failures.push(FailureRecord::new(
                    &channel.id,
                    FailureKind::ChannelList,
                    e.to_string(),
                ));
                return;
            }
        };

        let videos: Vec<Video> = videos
            .into_iter()
            .unique_by(|v| v.video_id.clone())
            .collect();
        report.items_seen += videos.len();

        if videos.is_empty() {
            tracing::info!("No videos listed for channel");
            return;
        }

        // one store round-trip spares a per-item read for finished rows
        let ids = videos.iter().map(|v| v.video_id.as_str()).collect::<Vec<_>>();
        let processed_ids = match self.store.get_processed_video_ids(&ids).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    "Failed to pre-filter processed videos, falling back to per-item checks"
                );
                HashSet::new()
            }
        };

        let (done, pending): (Vec<_>, Vec<_>) = videos
            .into_iter()
            .partition(|v| processed_ids.contains(&v.video_id));
        report.skipped += done.len();

        let outcomes = stream::iter(pending.into_iter().map(|video| self.process_video(video)))
            .buffer_unordered(self.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            self.fold_outcome(report, outcome);
        }
    }

    /// The per-item state machine: skip check, transcript fetch, summarize,
    /// upsert. Each terminal state persists what it has; errors are carried
    /// out as data, never thrown past this function.
    #[tracing::instrument(skip(self, video), fields(video_id = %video.video_id))]
    async fn process_video(&self, mut video: Video) -> ItemOutcome {
        if self.cancel.is_cancelled() {
            return ItemOutcome::Cancelled;
        }

        let video_id = video.video_id.clone();

        {
            let mut claimed = self.claimed.lock().unwrap();
            if !claimed.insert(video_id.clone()) {
                tracing::debug!("Video already claimed in this run");
                return ItemOutcome::Skipped;
            }
        }

        match self.store.get_video(&video_id).await {
            Ok(Some(existing)) if existing.is_processed => {
                tracing::debug!("Video already processed, skipping");
                return ItemOutcome::Skipped;
            }
            Ok(Some(existing)) => video.carry_accounting_from(&existing),
            Ok(None) => {}
            Err(e) => {
                // prior state unknown, so no API call may be spent on this item
                return ItemOutcome::StorageFailed {
                    video_id,
                    message: format!("{e:#}"),
                };
            }
        }

        let transcript = match self.transcripts.fetch_transcript(&video_id).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(error = %error, "Transcript unavailable");
                video.transcript = None;
                video.is_processed = false;
                let storage_error = self.persist(&video).await;
                return ItemOutcome::TranscriptFailed {
                    video_id,
                    error,
                    storage_error,
                };
            }
        };

        match self.summarizer.summarize(&transcript, &self.prompt).await {
            Ok(response) => {
                video.transcript = Some(transcript);
                video.mark_processed(response.summary, response.token_count, Utc::now());
                match self.persist(&video).await {
                    None => ItemOutcome::Processed,
                    Some(message) => ItemOutcome::StorageFailed { video_id, message },
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Summarization failed");
                video.transcript = Some(transcript);
                video.is_processed = false;
                let storage_error = self.persist(&video).await;
                ItemOutcome::SummarizationFailed {
                    video_id,
                    error,
                    storage_error,
                }
            }
        }
    }

    async fn persist(&self, video: &Video) -> Option<String> {
        self.store
            .upsert_video(video)
            .await
            .err()
            .map(|e| format!("{e:#}"))
    }

    fn fold_outcome(&self, report: &mut RunReport, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped => report.skipped += 1,
            ItemOutcome::Cancelled => report.cancelled += 1,
            ItemOutcome::Processed => report.processed += 1,
            ItemOutcome::TranscriptFailed {
                video_id,
                error,
                storage_error,
            } => {
                report.transcript_failed += 1;
                report.failures.push(FailureRecord::new(
                    &video_id,
                    FailureKind::from(&error),
                    error.to_string(),
                ));
                if let Some(message) = storage_error {
                    self.record_storage_failure(report, &video_id, message);
                }
            }
            ItemOutcome::SummarizationFailed {
                video_id,
                error,
                storage_error,
            } => {
                report.summarization_failed += 1;
                report.failures.push(FailureRecord::new(
                    &video_id,
                    FailureKind::from(&error),
                    error.to_string(),
                ));
                if let Some(message) = storage_error {
                    self.record_storage_failure(report, &video_id, message);
                }
            }
            ItemOutcome::StorageFailed { video_id, message } => {
                self.record_storage_failure(report, &video_id, message);
            }
        }
    }

    fn record_storage_failure(&self, report: &mut RunReport, video_id: &str, message: String) {
        report.storage_failed += 1;
        let record = FailureRecord::new(video_id, FailureKind::Storage, message);
        if let Some(log) = &self.failure_log {
            if let Err(e) = log.append(&record) {
                tracing::warn!(error = ?e, path = ?log.path(), "Failed to append to failure log");
            }
        }
        report.failures.push(record);
    }
}
