use std::{collections::HashSet, sync::Mutex};

use channel_datastore::DataStore;
use tokio_util::sync::CancellationToken;

use crate::{
    llm::summarizer::{PromptConfig, Summarizer},
    report::FailureLog,
    yt::{TranscriptFetcher, VideoLister},
    ChannelProcessor,
};

pub struct ChannelProcessorBuilder<D = (), L = (), T = (), S = ()> {
    store: D,
    lister: L,
    transcripts: T,
    summarizer: S,
    prompt: PromptConfig,
    max_results: u32,
    concurrency: usize,
    cancel: CancellationToken,
    failure_log: Option<FailureLog>,
}

impl ChannelProcessorBuilder {
    pub fn new() -> Self {
        Self {
            store: (),
            lister: (),
            transcripts: (),
            summarizer: (),
            prompt: PromptConfig::default(),
            max_results: 20,
            concurrency: 1,
            cancel: CancellationToken::new(),
            failure_log: None,
        }
    }
}

impl Default for ChannelProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, L, T, S> ChannelProcessorBuilder<D, L, T, S> {
    pub fn store<D2: DataStore + Send + Sync + 'static>(
        self,
        store: D2,
    ) -> ChannelProcessorBuilder<D2, L, T, S> {
        ChannelProcessorBuilder {
            store,
            lister: self.lister,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            prompt: self.prompt,
            max_results: self.max_results,
            concurrency: self.concurrency,
            cancel: self.cancel,
            failure_log: self.failure_log,
        }
    }

    pub fn lister<L2: VideoLister + Send + Sync + 'static>(
        self,
        lister: L2,
    ) -> ChannelProcessorBuilder<D, L2, T, S> {
        ChannelProcessorBuilder {
            store: self.store,
            lister,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            prompt: self.prompt,
            max_results: self.max_results,
            concurrency: self.concurrency,
            cancel: self.cancel,
            failure_log: self.failure_log,
        }
    }

    pub fn transcript_fetcher<T2: TranscriptFetcher + Send + Sync + 'static>(
        self,
        transcripts: T2,
    ) -> ChannelProcessorBuilder<D, L, T2, S> {
        ChannelProcessorBuilder {
            store: self.store,
            lister: self.lister,
            transcripts,
            summarizer: self.summarizer,
            prompt: self.prompt,
            max_results: self.max_results,
            concurrency: self.concurrency,
            cancel: self.cancel,
            failure_log: self.failure_log,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> ChannelProcessorBuilder<D, L, T, S2> {
        ChannelProcessorBuilder {
            store: self.store,
            lister: self.lister,
            transcripts: self.transcripts,
            summarizer,
            prompt: self.prompt,
            max_results: self.max_results,
            concurrency: self.concurrency,
            cancel: self.cancel,
            failure_log: self.failure_log,
        }
    }

    pub fn prompt(mut self, prompt: PromptConfig) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Upper bound on items enriched at once within a channel. 1 keeps the
    /// run fully sequential and the report ordering reproducible.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn failure_log(mut self, failure_log: FailureLog) -> Self {
        self.failure_log = Some(failure_log);
        self
    }
}

impl<D, L, T, S> ChannelProcessorBuilder<D, L, T, S>
where
    D: DataStore + Send + Sync + 'static,
    L: VideoLister + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    pub fn build(self) -> ChannelProcessor<D, L, T, S> {
        ChannelProcessor {
            store: self.store,
            lister: self.lister,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            prompt: self.prompt,
            max_results: self.max_results,
            concurrency: self.concurrency,
            cancel: self.cancel,
            failure_log: self.failure_log,
            claimed: Mutex::new(HashSet::new()),
        }
    }
}
