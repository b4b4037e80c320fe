//! Speculation handlers

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use super::{validate, ApiJson, ApiPath, ApiQuery};
use crate::AppState;
use trendcaster_common::{
    assembler::{views, ApiResponse, SpeculationView, TopicsView},
    db::models::Speculation,
    errors::Result,
    pipeline::speculation::resolve_company,
    RECENT_SPECULATIONS,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SpeculateRequest {
    #[validate(length(min = 1, max = 255))]
    pub company: String,

    #[validate(length(min = 1, max = 255))]
    pub topic: String,

    /// Persist the result as well
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecentQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

pub async fn list_companies(State(state): State<AppState>) -> ApiResponse<Vec<&'static str>> {
    ApiResponse::success(state.pipeline.list_companies())
}

pub async fn list_topics(
    State(state): State<AppState>,
    ApiPath(company): ApiPath<String>,
) -> Result<ApiResponse<TopicsView>> {
    let topics = state.pipeline.list_topics(&company)?;
    Ok(ApiResponse::success(TopicsView {
        company: resolve_company(&company)?.to_string(),
        topics: topics.into_iter().map(str::to_string).collect(),
    }))
}

pub async fn speculate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SpeculateRequest>,
) -> Result<(StatusCode, ApiResponse<SpeculationView>)> {
    validate(&request)?;

    let result = state.pipeline.speculate(&request.company, &request.topic).await?;

    if !request.save {
        return Ok((StatusCode::OK, ApiResponse::success(SpeculationView::generated(result, None))));
    }

    let saved = state.store.save_speculation(result.to_new_speculation()).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(SpeculationView::generated(result, Some(saved))),
    ))
}

/// Most recent speculations
pub async fn list_speculations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> Result<ApiResponse<Vec<SpeculationView>>> {
    validate(&query)?;

    let rows: Vec<Speculation> = state
        .store
        .list_speculations(query.limit.unwrap_or(RECENT_SPECULATIONS))
        .await?;
    Ok(ApiResponse::success(views(rows)))
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::harness;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_companies_and_topics() {
        let app = harness();

        let (_, body) = app.get("/api/companies").await;
        assert_eq!(body["data"][0], "Apple");

        let (status, body) = app.get("/api/topics/apple").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["company"], "Apple");
        assert_eq!(body["data"]["topics"][2], "AI Strategy");

        let (status, body) = app.get("/api/topics/Initech").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_COMPANY");
    }

    #[tokio::test]
    async fn test_speculate_and_save() {
        let app = harness();

        let (status, body) = app
            .post("/api/speculate", json!({"company": "APPLE", "topic": "AI Strategy"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let headline = body["data"]["headline"].as_str().unwrap();
        assert!(headline.contains("Apple") && headline.contains("AI Strategy"));
        assert!(!body["data"]["disclaimer"].as_str().unwrap().is_empty());
        assert!(body["data"].get("id").is_none());

        let (status, body) = app
            .post(
                "/api/speculate",
                json!({"company": "tesla", "topic": "Battery Technology", "save": true}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 1);

        let (_, recent) = app.get("/api/speculations?limit=3").await;
        assert_eq!(recent["data"].as_array().unwrap().len(), 1);
        assert_eq!(recent["data"][0]["company"], "Tesla");
    }

    #[tokio::test]
    async fn test_speculations_limit_bounds() {
        let app = harness();
        let (status, _) = app.get("/api/speculations?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
