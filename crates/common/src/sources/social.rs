//! Social platform adapter (Graph API)
//!
//! Lists recently published media with cursor pagination and fetches
//! per-media engagement insights. The access token travels as the
//! `access_token` query parameter.

use crate::config::SocialConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Fields requested for every media object
pub const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,permalink,timestamp,username";

/// Metrics requested for insights
pub const INSIGHT_METRICS: &str = "engagement,impressions,reach,saved";

/// A published media object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    /// Platform timestamp as delivered, e.g. `2024-03-01T12:00:00+0000`
    pub timestamp: String,
    pub username: String,
}

impl Media {
    /// Parse the platform timestamp
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .or_else(|_| DateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%z"))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One page of media; `next_cursor` is set when more pages exist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPage {
    pub items: Vec<Media>,
    pub next_cursor: Option<String>,
}

impl MediaPage {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Engagement snapshot for one media object, fetched live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInsights {
    pub media_id: String,
    pub engagement: i64,
    pub impressions: i64,
    pub reach: i64,
    pub saved: i64,
    pub timestamp: DateTime<Utc>,
}

/// Capability: read published media and their insights
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Fetch one page of recent media, starting after `after` when given
    async fn list_media_page(&self, after: Option<&str>) -> Result<MediaPage>;

    /// Fetch insights; an unknown media id is `NotFound`
    async fn get_media_insights(&self, media_id: &str) -> Result<MediaInsights>;

    fn platform_name(&self) -> &str;

    /// First page of recent media; truncation shows up as `next_cursor`
    async fn list_recent_media(&self) -> Result<MediaPage> {
        self.list_media_page(None).await
    }
}

/// Media gathered across pages
#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaCollection {
    pub items: Vec<Media>,
    /// The page limit stopped the walk before the last page
    pub truncated: bool,
    pub next_cursor: Option<String>,
}

/// Follow pagination cursors up to `max_pages` pages
pub async fn collect_media(
    platform: &dyn SocialPlatform,
    max_pages: usize,
) -> Result<MediaCollection> {
    let mut collection = MediaCollection::default();
    let mut cursor: Option<String> = None;

    for page_number in 0..max_pages.max(1) {
        let page = platform.list_media_page(cursor.as_deref()).await?;
        tracing::debug!(page = page_number, count = page.items.len(), "Fetched media page");
        collection.items.extend(page.items);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                cursor = None;
                break;
            }
        }
    }

    collection.truncated = cursor.is_some();
    collection.next_cursor = cursor;
    Ok(collection)
}

/// Graph API client
pub struct GraphApiClient {
    client: reqwest::Client,
    access_token: String,
    user_id: String,
    base_url: String,
    page_size: u32,
}

#[derive(Deserialize)]
struct MediaListResponse {
    data: Vec<Media>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Deserialize)]
struct Paging {
    #[serde(default)]
    cursors: Option<Cursors>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct Cursors {
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct InsightsResponse {
    data: Vec<InsightMetric>,
}

#[derive(Deserialize)]
struct InsightMetric {
    name: String,
    values: Vec<InsightValue>,
}

#[derive(Deserialize)]
struct InsightValue {
    value: i64,
}

#[derive(Deserialize)]
struct GraphErrorEnvelope {
    error: GraphError,
}

#[derive(Deserialize)]
struct GraphError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error_subcode: Option<i64>,
}

const SOURCE_NAME: &str = "graph";

// Graph reports a missing object as code 100 with subcode 33
const GRAPH_INVALID_PARAMETER: i64 = 100;
const GRAPH_OBJECT_MISSING: i64 = 33;

impl GraphApiClient {
    /// Create a new client; token and account id are mandatory
    pub fn new(config: &SocialConfig) -> Result<Self> {
        let access_token =
            super::required(&config.access_token, "social.access_token (INSTAGRAM_ACCESS_TOKEN)")?;
        let user_id = super::required(&config.user_id, "social.user_id (INSTAGRAM_USER_ID)")?;

        Ok(Self {
            client: super::http_client(config.timeout())?,
            access_token,
            user_id,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String)> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| super::transport_error(SOURCE_NAME, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| super::transport_error(SOURCE_NAME, e))?;
        Ok((status, body))
    }

    fn is_missing_object(status: StatusCode, body: &str) -> bool {
        if status == StatusCode::NOT_FOUND {
            return true;
        }
        serde_json::from_str::<GraphErrorEnvelope>(body)
            .map(|env| {
                env.error.code == Some(GRAPH_INVALID_PARAMETER)
                    && env.error.error_subcode == Some(GRAPH_OBJECT_MISSING)
            })
            .unwrap_or(false)
    }

    fn parse_media_page(body: &str) -> Result<MediaPage> {
        let parsed: MediaListResponse = serde_json::from_str(body)
            .map_err(|e| AppError::format(SOURCE_NAME, format!("unexpected media listing: {}", e)))?;

        let next_cursor = parsed.paging.and_then(|paging| {
            // A cursor without a `next` link marks the last page
            paging.next.as_ref()?;
            paging.cursors.and_then(|c| c.after)
        });

        Ok(MediaPage {
            items: parsed.data,
            next_cursor,
        })
    }

    fn parse_insights(media_id: &str, body: &str) -> Result<MediaInsights> {
        let parsed: InsightsResponse = serde_json::from_str(body)
            .map_err(|e| AppError::format(SOURCE_NAME, format!("unexpected insights payload: {}", e)))?;

        let metric = |name: &str| -> Result<i64> {
            parsed
                .data
                .iter()
                .find(|m| m.name == name)
                .and_then(|m| m.values.first())
                .map(|v| v.value)
                .ok_or_else(|| {
                    AppError::format(SOURCE_NAME, format!("insights missing metric '{}'", name))
                })
        };

        Ok(MediaInsights {
            media_id: media_id.to_string(),
            engagement: metric("engagement")?,
            impressions: metric("impressions")?,
            reach: metric("reach")?,
            saved: metric("saved")?,
            timestamp: Utc::now(),
        })
    }

    async fn request_media_page(&self, after: Option<&str>) -> Result<MediaPage> {
        let url = format!("{}/{}/media", self.base_url, self.user_id);
        let limit = self.page_size.to_string();

        let mut query = vec![("fields", MEDIA_FIELDS), ("limit", limit.as_str())];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        let (status, body) = self.get(&url, &query).await?;
        if !status.is_success() {
            return Err(super::status_error(SOURCE_NAME, status, &body));
        }
        Self::parse_media_page(&body)
    }

    async fn request_insights(&self, media_id: &str) -> Result<MediaInsights> {
        validate_media_id(media_id)?;
        let url = format!("{}/{}/insights", self.base_url, media_id);

        let (status, body) = self.get(&url, &[("metric", INSIGHT_METRICS)]).await?;
        if !status.is_success() {
            if Self::is_missing_object(status, &body) {
                return Err(AppError::not_found("media", media_id));
            }
            return Err(super::status_error(SOURCE_NAME, status, &body));
        }
        Self::parse_insights(media_id, &body)
    }
}

#[async_trait]
impl SocialPlatform for GraphApiClient {
    #[tracing::instrument(skip(self), fields(source = SOURCE_NAME))]
    async fn list_media_page(&self, after: Option<&str>) -> Result<MediaPage> {
        let start = Instant::now();
        let result = self.request_media_page(after).await;
        metrics::record_source_call(
            SOURCE_NAME,
            "list_media",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match &result {
            Ok(page) => tracing::info!(
                count = page.items.len(),
                has_more = page.has_more(),
                "Fetched recent media"
            ),
            Err(e) => tracing::warn!(error = %e, "Media listing failed"),
        }
        result
    }

    #[tracing::instrument(skip(self), fields(source = SOURCE_NAME))]
    async fn get_media_insights(&self, media_id: &str) -> Result<MediaInsights> {
        let start = Instant::now();
        let result = self.request_insights(media_id).await;
        metrics::record_source_call(
            SOURCE_NAME,
            "media_insights",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Insights request failed");
        }
        result
    }

    fn platform_name(&self) -> &str {
        SOURCE_NAME
    }
}

/// Placeholder used when no social credentials are configured
pub struct DisabledSocialPlatform;

impl DisabledSocialPlatform {
    fn error() -> AppError {
        AppError::Configuration {
            message: "social platform is disabled; set social.access_token and social.user_id"
                .to_string(),
        }
    }
}

#[async_trait]
impl SocialPlatform for DisabledSocialPlatform {
    async fn list_media_page(&self, _after: Option<&str>) -> Result<MediaPage> {
        Err(Self::error())
    }

    async fn get_media_insights(&self, _media_id: &str) -> Result<MediaInsights> {
        Err(Self::error())
    }

    fn platform_name(&self) -> &str {
        "disabled"
    }
}

/// Ids are interpolated into the request path
fn validate_media_id(media_id: &str) -> Result<()> {
    let well_formed = !media_id.is_empty()
        && media_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed {
        return Err(AppError::invalid_parameter(
            "media_id",
            "media id must be non-empty and contain only letters, digits or underscores",
        ));
    }
    Ok(())
}

/// Create a social platform adapter based on configuration
pub fn create_social_platform(config: &SocialConfig) -> Result<Arc<dyn SocialPlatform>> {
    match config.provider.as_str() {
        "graph" => Ok(Arc::new(GraphApiClient::new(config)?)),
        "disabled" => Ok(Arc::new(DisabledSocialPlatform)),
        other => Err(AppError::Configuration {
            message: format!("unknown social provider: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SocialConfig {
        SocialConfig {
            access_token: Some("tok".into()),
            user_id: Some("1784".into()),
            base_url: server.uri(),
            page_size: 2,
            ..SocialConfig::default()
        }
    }

    fn media_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "caption": format!("caption {id}"),
            "media_type": "IMAGE",
            "media_url": format!("https://cdn.example.com/{id}.jpg"),
            "permalink": format!("https://instagram.com/p/{id}"),
            "timestamp": "2024-03-01T12:00:00+0000",
            "username": "trendcaster"
        })
    }

    #[test]
    fn test_missing_credentials() {
        let config = SocialConfig {
            access_token: Some("tok".into()),
            ..SocialConfig::default()
        };
        assert!(matches!(
            GraphApiClient::new(&config),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_parses_graph_timestamp() {
        let media: Media = serde_json::from_value(media_json("1")).unwrap();
        let at = media.published_at().unwrap();
        assert_eq!(at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_malformed_media_id_never_reaches_graph() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .expect(0)
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();
        for media_id in ["", "1784/media", "../me", "17?fields=x", "1 2"] {
            let err = client.get_media_insights(media_id).await.unwrap_err();
            assert!(
                matches!(err, AppError::InvalidParameter { ref field, .. } if field.as_deref() == Some("media_id")),
                "{media_id:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_first_page_exposes_next_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1784/media"))
            .and(query_param("fields", MEDIA_FIELDS))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [media_json("1"), media_json("2")],
                "paging": {
                    "cursors": {"before": "b0", "after": "c1"},
                    "next": "https://graph.instagram.com/next-page"
                }
            })))
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();
        let page = client.list_recent_media().await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("c1"));
        assert!(page.has_more());
    }

    #[tokio::test]
    async fn test_collect_follows_cursors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1784/media"))
            .and(query_param("after", "c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [media_json("3")],
                "paging": {"cursors": {"before": "c1", "after": "c2"}}
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1784/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [media_json("1"), media_json("2")],
                "paging": {"cursors": {"after": "c1"}, "next": "https://graph/next"}
            })))
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();

        let all = collect_media(&client, 5).await.unwrap();
        let ids: Vec<&str> = all.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(!all.truncated);

        let first_only = collect_media(&client, 1).await.unwrap();
        assert_eq!(first_only.items.len(), 2);
        assert!(first_only.truncated);
        assert_eq!(first_only.next_cursor.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_insights_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/999/insights"))
            .and(query_param("metric", INSIGHT_METRICS))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"name": "engagement", "period": "lifetime", "values": [{"value": 120}]},
                    {"name": "impressions", "period": "lifetime", "values": [{"value": 1500}]},
                    {"name": "reach", "period": "lifetime", "values": [{"value": 900}]},
                    {"name": "saved", "period": "lifetime", "values": [{"value": 45}]}
                ]
            })))
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();
        let insights = client.get_media_insights("999").await.unwrap();

        assert_eq!(insights.media_id, "999");
        assert_eq!(insights.engagement, 120);
        assert_eq!(insights.impressions, 1500);
        assert_eq!(insights.reach, 900);
        assert_eq!(insights.saved, 45);
    }

    #[tokio::test]
    async fn test_missing_metric_is_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/999/insights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"name": "reach", "values": [{"value": 3}]}]
            })))
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();
        assert!(matches!(
            client.get_media_insights("999").await,
            Err(AppError::SourceFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_media_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/404404/insights"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "message": "Unsupported get request. Object with ID '404404' does not exist",
                    "type": "GraphMethodException",
                    "code": 100,
                    "error_subcode": 33
                }
            })))
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();
        let err = client.get_media_insights("404404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_server_failure_is_unavailable_not_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GraphApiClient::new(&config_for(&server)).unwrap();
        let err = client.get_media_insights("1").await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_disabled_platform_reports_configuration() {
        let platform = DisabledSocialPlatform;
        assert!(matches!(
            platform.list_recent_media().await,
            Err(AppError::Configuration { .. })
        ));
    }
}
