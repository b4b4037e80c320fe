//! Database layer for Trendcaster
//!
//! Provides:
//! - SeaORM entity models
//! - The [`ContentStore`] contract with a Postgres [`Repository`] and an
//!   in-process [`MemoryStore`]
//! - Connection pool management and schema provisioning

mod memory;
pub mod models;
mod repository;
pub mod schema;

pub use memory::MemoryStore;
pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use models::*;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Persistence contract shared by every store implementation.
///
/// Identity and timestamps are assigned by the store. Lists are newest first.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn save_content_idea(&self, idea: NewContentIdea) -> Result<ContentIdea>;

    async fn list_content_ideas(&self) -> Result<Vec<ContentIdea>>;

    async fn save_post(&self, post: NewPost) -> Result<Post>;

    async fn find_post(&self, id: i32) -> Result<Option<Post>>;

    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Fails with `Constraint` when `post_id` references no post
    async fn save_analytics(&self, snapshot: NewAnalytics) -> Result<Analytics>;

    async fn list_analytics(&self) -> Result<Vec<Analytics>>;

    /// Snapshots for one post, `recorded_at` descending
    async fn list_analytics_for_post(&self, post_id: i32) -> Result<Vec<Analytics>>;

    async fn save_speculation(&self, speculation: NewSpeculation) -> Result<Speculation>;

    /// Most recent `limit` speculations
    async fn list_speculations(&self, limit: u64) -> Result<Vec<Speculation>>;

    async fn ping(&self) -> Result<()>;
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let url = config.connection_url()?;
        info!(target_db = %config.redacted_url()?, "Connecting to database...");

        let mut opts = ConnectOptions::new(url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })?;

        info!("Database connection established");
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;
        Ok(())
    }

    /// Create the four tables if missing
    pub async fn provision_schema(&self) -> Result<()> {
        schema::provision(&self.conn).await
    }
}
