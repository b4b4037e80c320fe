//! News source adapter
//!
//! Fetches category/language filtered headlines. A call succeeds or fails as
//! a whole; a payload without a well-formed article list is a format error.

use crate::config::NewsConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// One headline item, transient input to the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: String,
    /// Article description, used as prompt material
    pub content: String,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

/// Capability: fetch the current tech headlines
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_tech_news(&self) -> Result<Vec<NewsItem>>;

    /// Name used in logs, metrics and error messages
    fn source_name(&self) -> &str;
}

/// NewsAPI top-headlines client
pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    category: String,
    language: String,
}

#[derive(Deserialize)]
struct HeadlinesResponse {
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct Article {
    #[serde(default)]
    source: Option<ArticleSource>,
    title: String,
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl From<Article> for NewsItem {
    fn from(article: Article) -> Self {
        NewsItem {
            title: article.title,
            source: article
                .source
                .and_then(|s| s.name)
                .unwrap_or_default(),
            url: article.url.unwrap_or_default(),
            content: article.description.or(article.content).unwrap_or_default(),
        }
    }
}

const SOURCE_NAME: &str = "newsapi";

impl NewsApiClient {
    /// Create a new client; the API key is mandatory
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let api_key = super::required(&config.api_key, "news.api_key (NEWS_API_KEY)")?;

        Ok(Self {
            client: super::http_client(config.timeout())?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
            language: config.language.clone(),
        })
    }

    fn parse_headlines(body: &str) -> Result<Vec<NewsItem>> {
        let parsed: HeadlinesResponse = serde_json::from_str(body)
            .map_err(|e| AppError::format(SOURCE_NAME, format!("unexpected response format: {}", e)))?;

        Ok(parsed.articles.into_iter().map(NewsItem::from).collect())
    }

    async fn request_headlines(&self) -> Result<Vec<NewsItem>> {
        let url = format!("{}/top-headlines", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", self.category.as_str()),
                ("language", self.language.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| super::transport_error(SOURCE_NAME, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| super::transport_error(SOURCE_NAME, e))?;

        if !status.is_success() {
            return Err(super::status_error(SOURCE_NAME, status, &body));
        }

        Self::parse_headlines(&body)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[tracing::instrument(skip(self), fields(source = SOURCE_NAME, category = %self.category))]
    async fn fetch_tech_news(&self) -> Result<Vec<NewsItem>> {
        let start = Instant::now();
        let result = self.request_headlines().await;
        metrics::record_source_call(
            SOURCE_NAME,
            "fetch_tech_news",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match &result {
            Ok(items) => tracing::info!(count = items.len(), "Fetched tech headlines"),
            Err(e) => tracing::warn!(error = %e, "Headline fetch failed"),
        }
        result
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }
}

/// Offline news source returning a fixed, ordered set of headlines
pub struct StaticNewsSource {
    items: Vec<NewsItem>,
}

impl StaticNewsSource {
    pub fn new() -> Self {
        Self::with_items(default_headlines())
    }

    pub fn with_items(items: Vec<NewsItem>) -> Self {
        Self { items }
    }
}

impl Default for StaticNewsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    async fn fetch_tech_news(&self) -> Result<Vec<NewsItem>> {
        tracing::debug!(count = self.items.len(), "Serving static headlines");
        Ok(self.items.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

fn default_headlines() -> Vec<NewsItem> {
    vec![
        NewsItem::new(
            "Apple Announces New AR Glasses",
            "TechCrunch",
            "https://techcrunch.com/apple-ar-glasses",
            "Apple unveiled lightweight AR glasses aimed at everyday wear.",
        ),
        NewsItem::new(
            "Google Releases Major Search Algorithm Update",
            "The Verge",
            "https://www.theverge.com/google-search-update",
            "The update leans heavily on generative answers at the top of results.",
        ),
        NewsItem::new(
            "Microsoft Expands Azure AI Regions",
            "ZDNet",
            "https://www.zdnet.com/azure-ai-regions",
            "New data center regions target capacity for AI workloads.",
        ),
        NewsItem::new(
            "Meta Opens Its Latest Open-Weight Language Model",
            "Wired",
            "https://www.wired.com/meta-open-model",
            "Meta released model weights under a permissive community license.",
        ),
        NewsItem::new(
            "Tesla Shows Progress on Humanoid Robot",
            "Electrek",
            "https://electrek.co/tesla-robot",
            "A demo showed the robot sorting parts on a factory line.",
        ),
        NewsItem::new(
            "Amazon Tests Drone Delivery in New Cities",
            "Reuters",
            "https://www.reuters.com/amazon-drones",
            "The company is expanding its drone pilot after regulatory approval.",
        ),
    ]
}

/// Create a news source based on configuration
pub fn create_news_source(config: &NewsConfig) -> Result<Arc<dyn NewsSource>> {
    match config.provider.as_str() {
        "newsapi" => Ok(Arc::new(NewsApiClient::new(config)?)),
        "static" => Ok(Arc::new(StaticNewsSource::new())),
        other => Err(AppError::Configuration {
            message: format!("unknown news provider: {}", other),
        }),
    }
}
