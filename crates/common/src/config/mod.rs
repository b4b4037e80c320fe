//! Configuration management for Trendcaster
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values
//!
//! Loaded once at process start and handed to component constructors.

use config::{Config, ConfigError, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// News source configuration
    #[serde(default)]
    pub news: NewsConfig,

    /// Generative text configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Social platform configuration
    #[serde(default)]
    pub social: SocialConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Full connection string; wins over the discrete parameters
    pub url: Option<String>,

    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsConfig {
    /// News provider: newsapi, static
    #[serde(default = "default_news_provider")]
    pub provider: String,

    pub api_key: Option<String>,

    #[serde(default = "default_news_base_url")]
    pub base_url: String,

    #[serde(default = "default_news_category")]
    pub category: String,

    #[serde(default = "default_news_language")]
    pub language: String,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Generator provider: openai, template
    #[serde(default = "default_generator_provider")]
    pub provider: String,

    pub api_key: Option<String>,

    #[serde(default = "default_generator_base_url")]
    pub base_url: String,

    /// Fixed model, never chosen per request
    #[serde(default = "default_generator_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocialConfig {
    /// Social provider: graph, disabled
    #[serde(default = "default_social_provider")]
    pub provider: String,

    pub access_token: Option<String>,

    pub user_id: Option<String>,

    #[serde(default = "default_social_base_url")]
    pub base_url: String,

    /// Items requested per media page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Install the Prometheus recorder and expose /metrics
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Service name for log records
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 90 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_news_provider() -> String { "newsapi".to_string() }
fn default_news_base_url() -> String { "https://newsapi.org/v2".to_string() }
fn default_news_category() -> String { "technology".to_string() }
fn default_news_language() -> String { "en".to_string() }
fn default_source_timeout() -> u64 { 15 }
fn default_generator_provider() -> String { "openai".to_string() }
fn default_generator_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_generator_model() -> String { crate::DEFAULT_GENERATION_MODEL.to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 800 }
fn default_generator_timeout() -> u64 { 60 }
fn default_social_provider() -> String { "graph".to_string() }
fn default_social_base_url() -> String { "https://graph.instagram.com/v12.0".to_string() }
fn default_page_size() -> u32 { 25 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_enabled() -> bool { true }
fn default_service_name() -> String { "trendcaster".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__NEWS__API_KEY=...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific file, still honouring APP__ overrides
    pub fn from_file(path: &str) -> std::result::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl DatabaseConfig {
    /// Resolve the connection target: `url` first, then the discrete parameters
    pub fn connection_url(&self) -> Result<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_string());
        }

        match (&self.host, self.port, &self.user, &self.name) {
            (Some(host), Some(port), Some(user), Some(name)) => {
                let invalid = |what: &str| AppError::Configuration {
                    message: format!("database {} cannot be used in a connection url", what),
                };
                let mut url = Url::parse(&format!("postgres://{}:{}/", host, port))
                    .map_err(|_| invalid("host"))?;
                url.path_segments_mut()
                    .map_err(|_| invalid("host"))?
                    .pop_if_empty()
                    .push(name);
                url.set_username(user).map_err(|_| invalid("user"))?;
                if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
                    url.set_password(Some(password))
                        .map_err(|_| invalid("password"))?;
                }
                Ok(url.to_string())
            }
            _ => Err(AppError::Configuration {
                message: "database connection parameters not set (url or host/port/user/name)"
                    .to_string(),
            }),
        }
    }

    /// Connection target with the password masked, for logs
    pub fn redacted_url(&self) -> Result<String> {
        let raw = self.connection_url()?;
        Ok(match Url::parse(&raw) {
            Ok(mut url) if url.password().is_some() => match url.set_password(Some("***")) {
                Ok(()) => url.to_string(),
                Err(()) => redact_url_password(&raw),
            },
            Ok(_) => raw,
            Err(_) => redact_url_password(&raw),
        })
    }
}

fn redact_url_password(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.find('@') else {
        return url.to_string();
    };
    match rest[..at].find(':') {
        Some(colon) => format!(
            "{}{}:***{}",
            &url[..scheme_end + 3],
            &rest[..colon],
            &rest[at..]
        ),
        None => url.to_string(),
    }
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SocialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: None,
            user: None,
            password: None,
            name: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            provider: default_news_provider(),
            api_key: None,
            base_url: default_news_base_url(),
            category: default_news_category(),
            language: default_news_language(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: default_generator_provider(),
            api_key: None,
            base_url: default_generator_base_url(),
            model: default_generator_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_generator_timeout(),
        }
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            provider: default_social_provider(),
            access_token: None,
            user_id: None,
            base_url: default_social_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_metrics_enabled(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: Some("postgres://localhost/trendcaster".to_string()),
                ..DatabaseConfig::default()
            },
            news: NewsConfig::default(),
            generator: GeneratorConfig::default(),
            social: SocialConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
