//! Analytics snapshot service
//!
//! Pulls platform insights for a stored post and appends one snapshot.
//! Nothing is written unless the insights call succeeds. Also imports
//! already-published platform media as posted posts.

use crate::db::models::{Analytics, NewAnalytics, NewPost, Post};
use crate::db::ContentStore;
use crate::errors::{AppError, Result};
use crate::sources::{collect_media, SocialPlatform};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Outcome of a media import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportOutcome {
    pub imported: Vec<Post>,
    /// Media already stored as a post
    pub already_present: usize,
    /// Media whose timestamp could not be read
    pub rejected: usize,
    /// The page limit stopped the walk early
    pub truncated: bool,
}

#[derive(Clone)]
pub struct AnalyticsRecorder {
    store: Arc<dyn ContentStore>,
    platform: Arc<dyn SocialPlatform>,
}

impl AnalyticsRecorder {
    pub fn new(store: Arc<dyn ContentStore>, platform: Arc<dyn SocialPlatform>) -> Self {
        Self { store, platform }
    }

    #[tracing::instrument(skip(self), fields(platform = self.platform.platform_name()))]
    pub async fn record_snapshot(&self, post_id: i32) -> Result<Analytics> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("post", post_id))?;

        let media_id = post.platform_media_id.as_deref().ok_or_else(|| {
            AppError::invalid_parameter(
                "post_id",
                format!("post {} has no platform media id", post_id),
            )
        })?;

        let insights = self.platform.get_media_insights(media_id).await?;
        let snapshot = self
            .store
            .save_analytics(NewAnalytics::from_insights(post.id, &insights))
            .await?;

        tracing::info!(
            media_id,
            engagement = snapshot.engagement,
            reach = snapshot.reach,
            "Analytics snapshot recorded"
        );
        Ok(snapshot)
    }

    /// Store recent platform media that has no post yet
    pub async fn import_published_media(&self, max_pages: usize) -> Result<ImportOutcome> {
        let collection = collect_media(self.platform.as_ref(), max_pages).await?;
        let known: HashSet<String> = self
            .store
            .list_posts()
            .await?
            .into_iter()
            .filter_map(|p| p.platform_media_id)
            .collect();

        let mut outcome = ImportOutcome {
            truncated: collection.truncated,
            ..ImportOutcome::default()
        };

        for media in &collection.items {
            if known.contains(&media.id) {
                outcome.already_present += 1;
                continue;
            }
            let post = match NewPost::from_published_media(media) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!(media_id = %media.id, error = %e, "Skipping media");
                    outcome.rejected += 1;
                    continue;
                }
            };
            outcome.imported.push(self.store.save_post(post).await?);
        }

        tracing::info!(
            imported = outcome.imported.len(),
            already_present = outcome.already_present,
            rejected = outcome.rejected,
            truncated = outcome.truncated,
            "Media import complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::sources::{Media, MediaInsights, MediaPage};
    use async_trait::async_trait;
    use chrono::Utc;

    fn media(id: &str, timestamp: &str) -> Media {
        Media {
            id: id.to_string(),
            caption: Some(format!("caption {id}")),
            media_type: "IMAGE".to_string(),
            media_url: None,
            permalink: Some(format!("https://instagram.com/p/{id}")),
            timestamp: timestamp.to_string(),
            username: "trendcaster".to_string(),
        }
    }

    /// Knows a single media id for insights, lists three media
    struct OneMediaPlatform;

    #[async_trait]
    impl SocialPlatform for OneMediaPlatform {
        async fn list_media_page(&self, _after: Option<&str>) -> Result<MediaPage> {
            Ok(MediaPage {
                items: vec![
                    media("m-1", "2024-03-01T12:00:00+0000"),
                    media("m-2", "2024-03-02T12:00:00+0000"),
                    media("m-3", "yesterday"),
                ],
                next_cursor: None,
            })
        }

        async fn get_media_insights(&self, media_id: &str) -> Result<MediaInsights> {
            if media_id != "m-1" {
                return Err(AppError::not_found("media", media_id));
            }
            Ok(MediaInsights {
                media_id: media_id.to_string(),
                engagement: 12,
                impressions: 340,
                reach: 300,
                saved: 4,
                timestamp: Utc::now(),
            })
        }

        fn platform_name(&self) -> &str {
            "fake"
        }
    }

    fn published(media_id: &str) -> NewPost {
        NewPost {
            platform_media_id: Some(media_id.to_string()),
            status: crate::db::models::PostStatus::Posted,
            posted_at: Some(Utc::now()),
            ..NewPost::draft("live")
        }
    }

    fn recorder(store: Arc<MemoryStore>) -> AnalyticsRecorder {
        AnalyticsRecorder::new(store, Arc::new(OneMediaPlatform))
    }

    #[tokio::test]
    async fn test_records_snapshot_for_published_post() {
        let store = Arc::new(MemoryStore::new());
        let post = store.save_post(published("m-1")).await.unwrap();

        let snapshot = recorder(store.clone()).record_snapshot(post.id).await.unwrap();
        assert_eq!(snapshot.post_id, post.id);
        assert_eq!(snapshot.impressions, 340);
        assert_eq!(store.list_analytics_for_post(post.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_post_and_draft_post() {
        let store = Arc::new(MemoryStore::new());
        let recorder = recorder(store.clone());

        assert!(matches!(
            recorder.record_snapshot(99).await,
            Err(AppError::NotFound { .. })
        ));

        let draft = store.save_post(NewPost::draft("not live")).await.unwrap();
        assert!(matches!(
            recorder.record_snapshot(draft.id).await,
            Err(AppError::InvalidParameter { .. })
        ));
    }

    #[tokio::test]
    async fn test_platform_failure_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let post = store.save_post(published("gone")).await.unwrap();

        let err = recorder(store.clone()).record_snapshot(post.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(store.list_analytics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_skips_known_and_unreadable_media() {
        let store = Arc::new(MemoryStore::new());
        store.save_post(published("m-1")).await.unwrap();

        let outcome = recorder(store.clone()).import_published_media(2).await.unwrap();
        assert_eq!(outcome.imported.len(), 1);
        assert_eq!(outcome.imported[0].platform_media_id.as_deref(), Some("m-2"));
        assert_eq!(outcome.imported[0].status, "posted");
        assert_eq!(outcome.already_present, 1);
        assert_eq!(outcome.rejected, 1);
        assert!(!outcome.truncated);

        let again = recorder(store.clone()).import_published_media(2).await.unwrap();
        assert!(again.imported.is_empty());
        assert_eq!(store.list_posts().await.unwrap().len(), 2);
    }
}
