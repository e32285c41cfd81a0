use anyhow::Context;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};

use crate::{datastore::DataStore, Video};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgDataStore {
    pub pool: PgPool,
}

impl PgDataStore {
    /// Establish connection to database and bring the videos table up to
    /// date. Failing here is fatal for a run.
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgDataStore { pool })
    }
}

impl DataStore for PgDataStore {
    async fn get_video(&self, video_id: &str) -> anyhow::Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE video_id = $1")
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| {
                tracing::error!(error = ?e, %video_id, "Failed to fetch video row");
            })
            .context("Failed to fetch video row")?;

        Ok(video)
    }

    async fn get_processed_video_ids(
        &self,
        video_ids: &[&str],
    ) -> anyhow::Result<std::collections::HashSet<String>> {
        #[derive(sqlx::FromRow)]
        struct VideoId {
            video_id: String,
        }

        let rows = sqlx::query_as::<_, VideoId>(
            "SELECT video_id FROM videos WHERE video_id = ANY($1) AND is_processed",
        )
        .bind(video_ids)
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| {
            tracing::error!(error = ?e, "Failed to fetch processed video ids");
        })
        .context("Failed to fetch processed video ids")?;

        Ok(rows.into_iter().map(|r| r.video_id).collect())
    }

    async fn upsert_video(&self, video: &Video) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                video_id, channel_id, published_at, title, description, tags,
                duration_seconds, view_count, like_count, comment_count,
                transcript, summary, is_processed, token_count,
                api_call_count, last_api_call_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (video_id) DO UPDATE SET
                channel_id = EXCLUDED.channel_id,
                published_at = EXCLUDED.published_at,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                tags = EXCLUDED.tags,
                duration_seconds = EXCLUDED.duration_seconds,
                view_count = EXCLUDED.view_count,
                like_count = EXCLUDED.like_count,
                comment_count = EXCLUDED.comment_count,
                transcript = EXCLUDED.transcript,
                summary = EXCLUDED.summary,
                is_processed = EXCLUDED.is_processed,
                token_count = EXCLUDED.token_count,
                api_call_count = EXCLUDED.api_call_count,
                last_api_call_at = EXCLUDED.last_api_call_at
            "#,
        )
        .bind(&video.video_id)
        .bind(&video.channel_id)
        .bind(video.published_at)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.tags)
        .bind(video.duration_seconds)
        .bind(video.view_count)
        .bind(video.like_count)
        .bind(video.comment_count)
        .bind(&video.transcript)
        .bind(&video.summary)
        .bind(video.is_processed)
        .bind(video.token_count)
        .bind(video.api_call_count)
        .bind(video.last_api_call_at)
        .execute(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(
                error = ?err,
                video_id = %video.video_id,
                "Failed to upsert video"
            )
        })
        .context("Failed to upsert video")?;

        Ok(())
    }
}
