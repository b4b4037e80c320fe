//! Trend and content idea handlers

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use super::{validate, ApiJson};
use crate::AppState;
use trendcaster_common::{
    assembler::{views, ApiResponse, ContentIdeaView, TrendView},
    db::models::NewContentIdea,
    errors::Result,
};

/// Request to store a content idea
#[derive(Debug, Deserialize, Validate)]
pub struct SaveIdeaRequest {
    #[validate(length(min = 1, max = 500))]
    pub headline: String,

    #[validate(length(min = 1, max = 20000))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub talking_points: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 30))]
    pub hashtags: Vec<String>,
}

/// Current headlines, capped
pub async fn tech_trends(State(state): State<AppState>) -> Result<ApiResponse<Vec<TrendView>>> {
    let trends = state.pipeline.trends().await?;
    Ok(ApiResponse::success(views(trends)))
}

/// Generate (but do not store) a content idea from the current headlines
pub async fn generate_ideas(State(state): State<AppState>) -> Result<ApiResponse<ContentIdeaView>> {
    let idea = state.pipeline.generate_ideas().await?;
    Ok(ApiResponse::success(idea.into()))
}

pub async fn list_ideas(State(state): State<AppState>) -> Result<ApiResponse<Vec<ContentIdeaView>>> {
    let ideas = state.store.list_content_ideas().await?;
    Ok(ApiResponse::success(views(ideas)))
}

pub async fn save_idea(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SaveIdeaRequest>,
) -> Result<(StatusCode, ApiResponse<ContentIdeaView>)> {
    validate(&request)?;

    let saved = state
        .store
        .save_content_idea(NewContentIdea {
            headline: request.headline,
            content: request.content,
            talking_points: request.talking_points,
            hashtags: request.hashtags,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::success(saved.into())))
}
