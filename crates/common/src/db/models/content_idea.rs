//! Content idea entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{self, AppError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_ideas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub headline: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Ordered, stored as TEXT[]
    pub talking_points: Vec<String>,

    /// Ordered, stored as TEXT[]
    pub hashtags: Vec<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A content idea before the store has assigned identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContentIdea {
    pub headline: String,
    pub content: String,
    pub talking_points: Vec<String>,
    pub hashtags: Vec<String>,
}

impl NewContentIdea {
    pub fn validate(&self) -> errors::Result<()> {
        if self.headline.trim().is_empty() {
            return Err(AppError::invalid_parameter("headline", "headline must not be empty"));
        }
        if self.content.trim().is_empty() {
            return Err(AppError::invalid_parameter("content", "content must not be empty"));
        }
        Ok(())
    }
}
