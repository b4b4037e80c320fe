//! Result assembler
//!
//! Maps pipeline output and stored records into the shapes the boundary
//! layer serialises. Every success body is wrapped in [`ApiResponse`];
//! failures use [`crate::errors::ErrorResponse`].

use crate::db::models::{Analytics, ContentIdea, NewContentIdea, Post, PostStatus, Speculation};
use crate::pipeline::SpeculationResult;
use crate::sources::{Media, MediaCollection, MediaInsights, NewsItem};
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform success envelope: `{"status":"success","data":..}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendView {
    pub title: String,
    pub source: String,
    pub url: String,
    pub description: String,
}

impl From<NewsItem> for TrendView {
    fn from(item: NewsItem) -> Self {
        Self {
            title: item.title,
            source: item.source,
            url: item.url,
            description: item.content,
        }
    }
}

/// A content idea, stored or freshly generated (no identity yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentIdeaView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub headline: String,
    pub content: String,
    pub talking_points: Vec<String>,
    pub hashtags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ContentIdea> for ContentIdeaView {
    fn from(idea: ContentIdea) -> Self {
        Self {
            id: Some(idea.id),
            headline: idea.headline,
            content: idea.content,
            talking_points: idea.talking_points,
            hashtags: idea.hashtags,
            created_at: Some(idea.created_at),
        }
    }
}

impl From<NewContentIdea> for ContentIdeaView {
    fn from(idea: NewContentIdea) -> Self {
        Self {
            id: None,
            headline: idea.headline,
            content: idea.content,
            talking_points: idea.talking_points,
            hashtags: idea.hashtags,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i32,
    pub platform_media_id: Option<String>,
    pub caption: String,
    pub media_url: Option<String>,
    pub permalink: Option<String>,
    pub status: PostStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Post> for PostView {
    type Error = crate::errors::AppError;

    fn try_from(post: Post) -> Result<Self, Self::Error> {
        Ok(Self {
            status: post.post_status()?,
            id: post.id,
            platform_media_id: post.platform_media_id,
            caption: post.caption,
            media_url: post.media_url,
            permalink: post.permalink,
            scheduled_at: post.scheduled_at,
            posted_at: post.posted_at,
            created_at: post.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsView {
    pub id: i32,
    pub post_id: i32,
    pub engagement: i64,
    pub impressions: i64,
    pub reach: i64,
    pub saved: i64,
    pub recorded_at: DateTime<Utc>,
}

impl From<Analytics> for AnalyticsView {
    fn from(row: Analytics) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            engagement: row.engagement,
            impressions: row.impressions,
            reach: row.reach,
            saved: row.saved,
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedContentView {
    pub tone_level: u8,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsView {
    pub company: String,
    pub topics: Vec<String>,
}

/// Speculation with the structural disclaimer and sources.
/// `id`/`created_at` are present once it has been saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeculationView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub company: String,
    pub topic: String,
    pub headline: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SpeculationView {
    pub fn generated(result: SpeculationResult, saved: Option<Speculation>) -> Self {
        Self {
            id: saved.as_ref().map(|s| s.id),
            created_at: saved.as_ref().map(|s| s.created_at),
            company: result.company,
            topic: result.topic,
            headline: result.headline,
            content: result.content,
            disclaimer: Some(result.disclaimer),
            sources: result.sources,
        }
    }
}

impl From<Speculation> for SpeculationView {
    fn from(row: Speculation) -> Self {
        Self {
            id: Some(row.id),
            company: row.company,
            topic: row.topic,
            headline: row.headline,
            content: row.content,
            disclaimer: None,
            sources: Vec::new(),
            created_at: Some(row.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaListView {
    pub items: Vec<Media>,
    /// True when more pages exist than were fetched
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl From<MediaCollection> for MediaListView {
    fn from(collection: MediaCollection) -> Self {
        Self {
            items: collection.items,
            truncated: collection.truncated,
            next_cursor: collection.next_cursor,
        }
    }
}

pub type InsightsView = MediaInsights;

/// Map every element; for collections of stored rows
pub fn views<T, V: From<T>>(rows: Vec<T>) -> Vec<V> {
    rows.into_iter().map(V::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewPost;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(vec!["Apple"])).unwrap();
        assert_eq!(body, json!({"status": "success", "data": ["Apple"]}));
    }

    #[test]
    fn test_generated_idea_has_no_identity() {
        let view = ContentIdeaView::from(NewContentIdea {
            headline: "h".into(),
            content: "c".into(),
            talking_points: vec!["p".into()],
            hashtags: vec!["#tech".into()],
        });
        let body = serde_json::to_value(view).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("created_at").is_none());
        assert_eq!(body["hashtags"], json!(["#tech"]));
    }

    #[test]
    fn test_post_view_rejects_corrupt_status() {
        let draft = NewPost::draft("x");
        let mut post = Post {
            id: 1,
            platform_media_id: draft.platform_media_id,
            caption: draft.caption,
            media_url: None,
            permalink: None,
            status: "draft".into(),
            scheduled_at: None,
            posted_at: None,
            created_at: Utc::now(),
        };
        let view = PostView::try_from(post.clone()).unwrap();
        assert_eq!(serde_json::to_value(&view).unwrap()["status"], "draft");

        post.status = "archived".into();
        assert!(PostView::try_from(post).is_err());
    }

    #[test]
    fn test_generated_speculation_keeps_disclaimer() {
        let result = SpeculationResult {
            company: "Apple".into(),
            topic: "AI Strategy".into(),
            headline: "h".into(),
            content: "c".into(),
            disclaimer: "d".into(),
            sources: vec!["s".into()],
        };
        let view = SpeculationView::generated(result, None);
        let body = serde_json::to_value(view).unwrap();
        assert_eq!(body["disclaimer"], "d");
        assert_eq!(body["sources"], json!(["s"]));
        assert!(body.get("id").is_none());
    }
}
