//! Repository pattern for database operations
//!
//! Postgres implementation of [`ContentStore`]. Each write is a single-row
//! insert; `id` and timestamps come back from the database via `RETURNING`.

use crate::db::models::*;
use crate::db::{ContentStore, DbPool};
use crate::errors::Result;
use crate::metrics;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }
}

/// Count the write and pass the result through
fn recorded<T>(collection: &str, result: std::result::Result<T, sea_orm::DbErr>) -> Result<T> {
    metrics::record_store_write(collection, result.is_ok());
    result.map_err(Into::into)
}

#[async_trait]
impl ContentStore for Repository {
    // ========================================================================
    // Content Ideas
    // ========================================================================

    async fn save_content_idea(&self, idea: NewContentIdea) -> Result<ContentIdea> {
        idea.validate()?;

        let model = ContentIdeaActiveModel {
            headline: Set(idea.headline),
            content: Set(idea.content),
            talking_points: Set(idea.talking_points),
            hashtags: Set(idea.hashtags),
            ..Default::default()
        };

        let saved = recorded("content_ideas", model.insert(self.conn()).await)?;
        tracing::info!(idea_id = saved.id, "Content idea saved");
        Ok(saved)
    }

    async fn list_content_ideas(&self) -> Result<Vec<ContentIdea>> {
        ContentIdeaEntity::find()
            .order_by_desc(ContentIdeaColumn::CreatedAt)
            .order_by_desc(ContentIdeaColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Posts
    // ========================================================================

    async fn save_post(&self, post: NewPost) -> Result<Post> {
        post.validate()?;

        let model = PostActiveModel {
            platform_media_id: Set(post.platform_media_id),
            caption: Set(post.caption),
            media_url: Set(post.media_url),
            permalink: Set(post.permalink),
            status: Set(post.status.as_str().to_string()),
            scheduled_at: Set(post.scheduled_at),
            posted_at: Set(post.posted_at),
            ..Default::default()
        };

        let saved = recorded("posts", model.insert(self.conn()).await)?;
        tracing::info!(post_id = saved.id, status = %saved.status, "Post saved");
        Ok(saved)
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>> {
        PostEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        PostEntity::find()
            .order_by_desc(PostColumn::CreatedAt)
            .order_by_desc(PostColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    async fn save_analytics(&self, snapshot: NewAnalytics) -> Result<Analytics> {
        snapshot.validate()?;

        let model = AnalyticsActiveModel {
            post_id: Set(snapshot.post_id),
            engagement: Set(snapshot.engagement),
            impressions: Set(snapshot.impressions),
            reach: Set(snapshot.reach),
            saved: Set(snapshot.saved),
            ..Default::default()
        };

        // A missing post surfaces as a foreign-key violation -> Constraint
        let saved = recorded("analytics", model.insert(self.conn()).await)?;
        tracing::info!(post_id = saved.post_id, analytics_id = saved.id, "Analytics snapshot saved");
        Ok(saved)
    }

    async fn list_analytics(&self) -> Result<Vec<Analytics>> {
        AnalyticsEntity::find()
            .order_by_desc(AnalyticsColumn::RecordedAt)
            .order_by_desc(AnalyticsColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    async fn list_analytics_for_post(&self, post_id: i32) -> Result<Vec<Analytics>> {
        AnalyticsEntity::find()
            .filter(AnalyticsColumn::PostId.eq(post_id))
            .order_by_desc(AnalyticsColumn::RecordedAt)
            .order_by_desc(AnalyticsColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Speculations
    // ========================================================================

    async fn save_speculation(&self, speculation: NewSpeculation) -> Result<Speculation> {
        let model = SpeculationActiveModel {
            company: Set(speculation.company),
            topic: Set(speculation.topic),
            headline: Set(speculation.headline),
            content: Set(speculation.content),
            ..Default::default()
        };

        let saved = recorded("speculations", model.insert(self.conn()).await)?;
        tracing::info!(speculation_id = saved.id, company = %saved.company, "Speculation saved");
        Ok(saved)
    }

    async fn list_speculations(&self, limit: u64) -> Result<Vec<Speculation>> {
        SpeculationEntity::find()
            .order_by_desc(SpeculationColumn::CreatedAt)
            .order_by_desc(SpeculationColumn::Id)
            .limit(limit)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::errors::AppError;

    async fn repository() -> Repository {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let config = DatabaseConfig {
            url: Some(url),
            max_connections: 2,
            min_connections: 1,
            ..DatabaseConfig::default()
        };
        let pool = DbPool::new(&config).await.unwrap();
        pool.provision_schema().await.unwrap();
        // Second run must be a no-op
        pool.provision_schema().await.unwrap();
        Repository::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn test_content_idea_round_trip() {
        let repo = repository().await;
        let idea = NewContentIdea {
            headline: "Apple Announces New AR Glasses".into(),
            content: "Glasses, again.".into(),
            talking_points: vec!["one".into(), "two".into()],
            hashtags: vec!["#tech".into()],
        };

        let saved = repo.save_content_idea(idea.clone()).await.unwrap();
        assert!(saved.id > 0);
        assert_eq!(saved.talking_points, idea.talking_points);

        let listed = repo.list_content_ideas().await.unwrap();
        assert_eq!(listed[0].id, saved.id);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn test_analytics_foreign_key() {
        let repo = repository().await;

        let orphan = NewAnalytics {
            post_id: i32::MAX,
            engagement: 1,
            impressions: 1,
            reach: 1,
            saved: 0,
        };
        let err = repo.save_analytics(orphan).await.unwrap_err();
        assert!(matches!(err, AppError::Constraint { .. }), "got {err:?}");

        let post = repo.save_post(NewPost::draft("hello")).await.unwrap();
        let snapshot = repo
            .save_analytics(NewAnalytics {
                post_id: post.id,
                engagement: 10,
                impressions: 100,
                reach: 80,
                saved: 2,
            })
            .await
            .unwrap();

        let history = repo.list_analytics_for_post(post.id).await.unwrap();
        assert_eq!(history[0].id, snapshot.id);
    }
}
