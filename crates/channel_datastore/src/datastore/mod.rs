use std::{collections::HashSet, future::Future};

pub mod postgres;

use crate::Video;

pub trait DataStore {
    /// Fetches a single row by id, or `None` when the video has never been
    /// persisted.
    fn get_video(
        &self,
        video_id: &str,
    ) -> impl Future<Output = anyhow::Result<Option<Video>>> + Send;

    /// Returns the subset of `video_ids` that already have a fully
    /// processed row. Used to pre-filter a listing before any API call is
    /// made on its behalf.
    fn get_processed_video_ids(
        &self,
        video_ids: &[&str],
    ) -> impl Future<Output = anyhow::Result<HashSet<String>>> + Send;

    /// Insert-or-replace by `video_id`. Must be atomic per id: concurrent
    /// upserts of the same id may race on ordering but never interleave
    /// into a corrupt row.
    fn upsert_video(&self, video: &Video) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<T: DataStore + Send + Sync> DataStore for &T {
    async fn get_video(&self, video_id: &str) -> anyhow::Result<Option<Video>> {
        (**self).get_video(video_id).await
    }

    async fn get_processed_video_ids(
        &self,
        video_ids: &[&str],
    ) -> anyhow::Result<HashSet<String>> {
        (**self).get_processed_video_ids(video_ids).await
    }

    async fn upsert_video(&self, video: &Video) -> anyhow::Result<()> {
        (**self).upsert_video(video).await
    }
}
