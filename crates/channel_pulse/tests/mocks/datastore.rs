use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use channel_datastore::{DataStore, Video};

#[derive(Clone, Default)]
pub struct MockDataStore {
    pub rows: Arc<Mutex<HashMap<String, Video>>>,
    pub fail_upserts_with: Option<String>,
    pub fail_reads_with: Option<String>,
    pub get_calls: Arc<Mutex<Vec<String>>>,
    pub upsert_calls: Arc<Mutex<Vec<Video>>>,
}

impl MockDataStore {
    pub fn with_rows(rows: impl IntoIterator<Item = Video>) -> Self {
        let store = Self::default();
        {
            let mut map = store.rows.lock().unwrap();
            for row in rows {
                map.insert(row.video_id.clone(), row);
            }
        }
        store
    }

    pub fn failing_upserts(msg: &str) -> Self {
        Self {
            fail_upserts_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_reads(msg: &str) -> Self {
        Self {
            fail_reads_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn row(&self, video_id: &str) -> Option<Video> {
        self.rows.lock().unwrap().get(video_id).cloned()
    }
}

impl DataStore for MockDataStore {
    async fn get_video(&self, video_id: &str) -> anyhow::Result<Option<Video>> {
        self.get_calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_reads_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.row(video_id))
    }

    async fn get_processed_video_ids(
        &self,
        video_ids: &[&str],
    ) -> anyhow::Result<HashSet<String>> {
        if let Some(ref msg) = self.fail_reads_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        let rows = self.rows.lock().unwrap();
        Ok(video_ids
            .iter()
            .filter(|id| rows.get(**id).map(|v| v.is_processed).unwrap_or(false))
            .map(|id| id.to_string())
            .collect())
    }

    async fn upsert_video(&self, video: &Video) -> anyhow::Result<()> {
        self.upsert_calls.lock().unwrap().push(video.clone());
        if let Some(ref msg) = self.fail_upserts_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(video.video_id.clone(), video.clone());
        Ok(())
    }
}
