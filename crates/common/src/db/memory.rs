//! In-process store
//!
//! Same contract as the Postgres repository: sequential ids, UTC stamps at
//! insert, newest-first lists and the analytics -> posts foreign key.
//! Used for offline runs and tests.

use crate::db::models::*;
use crate::db::ContentStore;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    content_ideas: Vec<ContentIdea>,
    posts: Vec<Post>,
    analytics: Vec<Analytics>,
    speculations: Vec<Speculation>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> i32 {
    len as i32 + 1
}

/// Newest first, ties broken by id
fn newest_first<T: Clone>(rows: &[T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i32)) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn save_content_idea(&self, idea: NewContentIdea) -> Result<ContentIdea> {
        idea.validate()?;

        let mut tables = self.tables.write().await;
        let saved = ContentIdea {
            id: next_id(tables.content_ideas.len()),
            headline: idea.headline,
            content: idea.content,
            talking_points: idea.talking_points,
            hashtags: idea.hashtags,
            created_at: Utc::now(),
        };
        tables.content_ideas.push(saved.clone());
        metrics::record_store_write("content_ideas", true);
        Ok(saved)
    }

    async fn list_content_ideas(&self) -> Result<Vec<ContentIdea>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.content_ideas, |i| (i.created_at, i.id)))
    }

    async fn save_post(&self, post: NewPost) -> Result<Post> {
        post.validate()?;

        let mut tables = self.tables.write().await;
        let saved = Post {
            id: next_id(tables.posts.len()),
            platform_media_id: post.platform_media_id,
            caption: post.caption,
            media_url: post.media_url,
            permalink: post.permalink,
            status: post.status.as_str().to_string(),
            scheduled_at: post.scheduled_at,
            posted_at: post.posted_at,
            created_at: Utc::now(),
        };
        tables.posts.push(saved.clone());
        metrics::record_store_write("posts", true);
        Ok(saved)
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.posts, |p| (p.created_at, p.id)))
    }

    async fn save_analytics(&self, snapshot: NewAnalytics) -> Result<Analytics> {
        snapshot.validate()?;

        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == snapshot.post_id) {
            metrics::record_store_write("analytics", false);
            return Err(AppError::Constraint {
                message: format!("analytics.post_id {} references no post", snapshot.post_id),
            });
        }

        let saved = Analytics {
            id: next_id(tables.analytics.len()),
            post_id: snapshot.post_id,
            engagement: snapshot.engagement,
            impressions: snapshot.impressions,
            reach: snapshot.reach,
            saved: snapshot.saved,
            recorded_at: Utc::now(),
        };
        tables.analytics.push(saved.clone());
        metrics::record_store_write("analytics", true);
        Ok(saved)
    }

    async fn list_analytics(&self) -> Result<Vec<Analytics>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.analytics, |a| (a.recorded_at, a.id)))
    }

    async fn list_analytics_for_post(&self, post_id: i32) -> Result<Vec<Analytics>> {
        let tables = self.tables.read().await;
        let rows: Vec<Analytics> = tables
            .analytics
            .iter()
            .filter(|a| a.post_id == post_id)
            .cloned()
            .collect();
        Ok(newest_first(&rows, |a| (a.recorded_at, a.id)))
    }

    async fn save_speculation(&self, speculation: NewSpeculation) -> Result<Speculation> {
        let mut tables = self.tables.write().await;
        let saved = Speculation {
            id: next_id(tables.speculations.len()),
            company: speculation.company,
            topic: speculation.topic,
            headline: speculation.headline,
            content: speculation.content,
            created_at: Utc::now(),
        };
        tables.speculations.push(saved.clone());
        metrics::record_store_write("speculations", true);
        Ok(saved)
    }

    async fn list_speculations(&self, limit: u64) -> Result<Vec<Speculation>> {
        let tables = self.tables.read().await;
        let mut rows = newest_first(&tables.speculations, |s| (s.created_at, s.id));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
