use channel_datastore::Video;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;

use crate::{
    http,
    types::{SearchResponse, VideoListResponse},
    yt::{ListError, VideoLister},
};

/// YouTube Data API v3 client. Listing a channel is a `search` call for the
/// newest video ids followed by one batched `videos` call for
/// snippet/contentDetails/statistics.
pub struct DataApiClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl DataApiClient {
    pub const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http::retrying_client(http::REQUEST_TIMEOUT),
            api_key: api_key.into(),
            base_url: Self::BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ListError> {
        let resp = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, %path, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ListError::Api { status, message });
        }

        Ok(resp.json::<T>().await?)
    }
}

impl VideoLister for DataApiClient {
    #[tracing::instrument(skip(self))]
    async fn list_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, ListError> {
        let max_results = max_results.to_string();
        let search: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("channelId", channel_id),
                    ("part", "snippet,id"),
                    ("order", "date"),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        let ids = search
            .items
            .iter()
            .filter_map(|item| item.id.video_id.as_deref())
            .collect::<Vec<_>>();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let details: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("id", joined.as_str()),
                    ("part", "snippet,contentDetails,statistics"),
                ],
            )
            .await?;

        Ok(details.items.into_iter().map(Video::from).collect())
    }
}
