//! Tone enhancement handler

use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use super::{validate, ApiJson};
use crate::AppState;
use trendcaster_common::{
    assembler::{ApiResponse, EnhancedContentView},
    errors::Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct EnhanceRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    /// Range is checked by the pipeline
    #[serde(alias = "sarcasm_level")]
    pub tone_level: i64,
}

pub async fn enhance_content(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EnhanceRequest>,
) -> Result<ApiResponse<EnhancedContentView>> {
    validate(&request)?;

    let content = state
        .pipeline
        .enhance_tone(&request.content, request.tone_level)
        .await?;

    tracing::info!(tone_level = request.tone_level, chars = content.len(), "Content enhanced");
    Ok(ApiResponse::success(EnhancedContentView {
        tone_level: request.tone_level as u8,
        content,
    }))
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{harness, harness_with_config};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use trendcaster_common::{
        config::AppConfig,
        errors::Result,
        sources::{ContentGenerator, DisabledSocialPlatform, ToneLevel},
    };

    /// Outlives a one second request budget
    struct SlowGenerator;

    #[async_trait]
    impl ContentGenerator for SlowGenerator {
        async fn generate(&self, _prompt: &str, _tone: ToneLevel) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok("too late".to_string())
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_enhance_marks_tone() {
        let app = harness();
        let (status, body) = app
            .post(
                "/api/enhance-content",
                json!({"content": "New phone has a slightly bigger camera bump", "sarcasm_level": 9}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tone_level"], 9);
        assert!(body["data"]["content"]
            .as_str()
            .unwrap()
            .starts_with("[Tone Level 9]"));
    }

    #[tokio::test]
    async fn test_out_of_range_tone() {
        let app = harness();
        let (status, body) = app
            .post("/api/enhance-content", json!({"content": "x", "tone_level": 11}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "tone_level");
    }

    #[tokio::test]
    async fn test_slow_generation_times_out_with_envelope() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = 1;
        let app = harness_with_config(config, Arc::new(SlowGenerator), Arc::new(DisabledSocialPlatform));

        let (status, body) = app
            .post("/api/enhance-content", json!({"content": "Chips are fast", "tone_level": 5}))
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["code"], "SOURCE_UNAVAILABLE");
    }
}
