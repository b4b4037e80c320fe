//! Schema provisioning
//!
//! Every statement is `IF NOT EXISTS`, so provisioning runs on each start.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::info;

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS content_ideas (
        id SERIAL PRIMARY KEY,
        headline TEXT NOT NULL,
        content TEXT NOT NULL,
        talking_points TEXT[] NOT NULL DEFAULT '{}',
        hashtags TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS posts (
        id SERIAL PRIMARY KEY,
        platform_media_id TEXT,
        caption TEXT NOT NULL,
        media_url TEXT,
        permalink TEXT,
        status TEXT NOT NULL DEFAULT 'draft'
            CHECK (status IN ('draft', 'scheduled', 'posted')),
        scheduled_at TIMESTAMPTZ,
        posted_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS analytics (
        id SERIAL PRIMARY KEY,
        post_id INTEGER NOT NULL REFERENCES posts(id),
        engagement BIGINT NOT NULL DEFAULT 0,
        impressions BIGINT NOT NULL DEFAULT 0,
        reach BIGINT NOT NULL DEFAULT 0,
        saved BIGINT NOT NULL DEFAULT 0,
        recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS speculations (
        id SERIAL PRIMARY KEY,
        company VARCHAR(255) NOT NULL,
        topic VARCHAR(255) NOT NULL,
        headline TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_content_ideas_created_at ON content_ideas (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_analytics_post_recorded ON analytics (post_id, recorded_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_speculations_created_at ON speculations (created_at DESC)",
];

/// Create all tables and indexes if they do not exist yet
pub async fn provision(conn: &DatabaseConnection) -> Result<()> {
    for statement in STATEMENTS {
        conn.execute_unprepared(statement).await?;
    }
    info!(statements = STATEMENTS.len(), "Schema provisioned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent() {
        for statement in STATEMENTS {
            assert!(statement.contains("IF NOT EXISTS"), "{statement}");
        }
    }
}
