//! Trendcaster Common Library
//!
//! Core of the content backend, shared by the gateway binary:
//! - Source adapters (news, generative text, social platform)
//! - Content pipeline (trends, ideas, tone, speculation)
//! - Persistence (SeaORM models, Postgres repository, in-memory store)
//! - Analytics snapshots and response assembly
//! - Error types, configuration and metrics

pub mod analytics;
pub mod assembler;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod pipeline;
pub mod sources;

// Re-export commonly used types
pub use analytics::{AnalyticsRecorder, ImportOutcome};
pub use config::AppConfig;
pub use db::{ContentStore, DbPool, MemoryStore, Repository};
pub use errors::{AppError, Result};
pub use pipeline::ContentPipeline;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generation model
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Speculations shown in the dashboard feed
pub const RECENT_SPECULATIONS: u64 = 5;

/// Pages followed when listing platform media
pub const MEDIA_PAGE_LIMIT: usize = 4;
