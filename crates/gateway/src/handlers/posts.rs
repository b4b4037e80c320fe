//! Post and analytics handlers

use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate, ApiJson, ApiPath};
use crate::AppState;
use trendcaster_common::{
    assembler::{views, AnalyticsView, ApiResponse, PostView},
    db::models::{NewPost, Post},
    errors::{AppError, Result},
    MEDIA_PAGE_LIMIT,
};

/// Request to create a draft, or a scheduled post when `scheduled_at` is set
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 2200))]
    pub caption: String,

    #[serde(default)]
    #[validate(url)]
    pub media_url: Option<String>,

    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: Vec<PostView>,
    pub already_present: usize,
    pub rejected: usize,
    pub truncated: bool,
}

fn post_views(posts: Vec<Post>) -> Result<Vec<PostView>> {
    posts.into_iter().map(PostView::try_from).collect()
}

pub async fn list_posts(State(state): State<AppState>) -> Result<ApiResponse<Vec<PostView>>> {
    let posts = state.store.list_posts().await?;
    Ok(ApiResponse::success(post_views(posts)?))
}

pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, ApiResponse<PostView>)> {
    validate(&request)?;

    let mut post = match request.scheduled_at {
        Some(at) => NewPost::scheduled(request.caption, at),
        None => NewPost::draft(request.caption),
    };
    post.media_url = request.media_url;

    let saved = state.store.save_post(post).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(saved.try_into()?)))
}

/// Store recent platform media as posted posts
pub async fn import_posts(State(state): State<AppState>) -> Result<ApiResponse<ImportResponse>> {
    let outcome = state.recorder.import_published_media(MEDIA_PAGE_LIMIT).await?;

    Ok(ApiResponse::success(ImportResponse {
        imported: post_views(outcome.imported)?,
        already_present: outcome.already_present,
        rejected: outcome.rejected,
        truncated: outcome.truncated,
    }))
}

/// Snapshot history for one post, newest first
pub async fn post_analytics(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<ApiResponse<Vec<AnalyticsView>>> {
    if state.store.find_post(post_id).await?.is_none() {
        return Err(AppError::not_found("post", post_id));
    }
    let history = state.store.list_analytics_for_post(post_id).await?;
    Ok(ApiResponse::success(views(history)))
}

pub async fn record_snapshot(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<(StatusCode, ApiResponse<AnalyticsView>)> {
    let snapshot = state.recorder.record_snapshot(post_id).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(snapshot.into())))
}
