//! External source adapters
//!
//! Three independent boundary clients, each behind a capability trait so
//! the pipeline and tests can swap in deterministic substitutes:
//! - [`NewsSource`]: headline items
//! - [`ContentGenerator`]: generative text
//! - [`SocialPlatform`]: published media and engagement insights

pub mod generator;
pub mod news;
pub mod social;

pub use generator::{
    create_generator, system_prompt, ContentGenerator, OpenAiGenerator, TemplateGenerator,
    ToneLevel,
};
pub use news::{create_news_source, NewsApiClient, NewsItem, NewsSource, StaticNewsSource};
pub use social::{
    collect_media, create_social_platform, DisabledSocialPlatform, GraphApiClient, Media,
    MediaCollection, MediaInsights, MediaPage, SocialPlatform,
};

use crate::errors::AppError;
use reqwest::StatusCode;
use std::time::Duration;

/// Build the HTTP client used by one adapter
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .user_agent(concat!("trendcaster/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5).min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })
}

/// Map a transport-level failure to the error taxonomy
pub(crate) fn transport_error(source_name: &str, err: reqwest::Error) -> AppError {
    if err.is_decode() {
        AppError::format(source_name, format!("undecodable response body: {}", err))
    } else {
        AppError::unavailable(source_name, err.to_string())
    }
}

/// Map a non-success HTTP status to the error taxonomy.
///
/// Throttling and server-side failures are transient; any other rejection
/// means the request or response contract does not hold.
pub(crate) fn status_error(source_name: &str, status: StatusCode, body: &str) -> AppError {
    let snippet: String = body.chars().take(300).collect();
    let message = format!("HTTP {}: {}", status.as_u16(), snippet);

    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        AppError::unavailable(source_name, message)
    } else {
        AppError::format(source_name, message)
    }
}

/// Require a non-empty credential from configuration
pub(crate) fn required(value: &Option<String>, name: &str) -> Result<String, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Configuration {
            message: format!("{} is not set", name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(status_error("x", StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(status_error("x", StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(matches!(
            status_error("x", StatusCode::UNAUTHORIZED, "bad key"),
            AppError::SourceFormat { .. }
        ));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(&Some("  ".into()), "NEWS_API_KEY").is_err());
        assert!(required(&None, "NEWS_API_KEY").is_err());
        assert_eq!(required(&Some("k".into()), "NEWS_API_KEY").unwrap(), "k");
    }
}
