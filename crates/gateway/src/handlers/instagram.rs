//! Social platform passthrough handlers

use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use super::{validate, ApiPath, ApiQuery};
use crate::AppState;
use trendcaster_common::{
    assembler::{ApiResponse, InsightsView, MediaListView},
    errors::Result,
    sources::collect_media,
    MEDIA_PAGE_LIMIT,
};

#[derive(Debug, Deserialize, Validate)]
pub struct MediaQuery {
    /// Pages to follow; the default walks up to the configured limit
    #[validate(range(min = 1, max = 20))]
    pub pages: Option<usize>,
}

pub async fn list_media(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MediaQuery>,
) -> Result<ApiResponse<MediaListView>> {
    validate(&query)?;

    let pages = query.pages.unwrap_or(MEDIA_PAGE_LIMIT);
    let collection = collect_media(state.social.as_ref(), pages).await?;
    Ok(ApiResponse::success(collection.into()))
}

pub async fn media_insights(
    State(state): State<AppState>,
    ApiPath(media_id): ApiPath<String>,
) -> Result<ApiResponse<InsightsView>> {
    let insights = state.social.get_media_insights(&media_id).await?;
    Ok(ApiResponse::success(insights))
}
