//! Post entity and lifecycle status

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{self, AppError};
use crate::sources::Media;

/// Post lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Posted,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Posted => "posted",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = AppError;

    fn from_str(s: &str) -> errors::Result<Self> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "scheduled" => Ok(PostStatus::Scheduled),
            "posted" => Ok(PostStatus::Posted),
            other => Err(AppError::invalid_parameter(
                "status",
                format!("unknown post status '{}'", other),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub platform_media_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub caption: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub media_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub permalink: Option<String>,

    /// One of draft, scheduled, posted
    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub scheduled_at: Option<DateTimeUtc>,

    pub posted_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Get the post status as an enum
    pub fn post_status(&self) -> errors::Result<PostStatus> {
        self.status.parse()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::analytics::Entity")]
    Analytics,
}

impl Related<super::analytics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Analytics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A post before the store has assigned identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub platform_media_id: Option<String>,
    pub caption: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    pub status: PostStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTimeUtc>,
    #[serde(default)]
    pub posted_at: Option<DateTimeUtc>,
}

impl NewPost {
    pub fn draft(caption: impl Into<String>) -> Self {
        Self {
            platform_media_id: None,
            caption: caption.into(),
            media_url: None,
            permalink: None,
            status: PostStatus::Draft,
            scheduled_at: None,
            posted_at: None,
        }
    }

    pub fn scheduled(caption: impl Into<String>, at: DateTimeUtc) -> Self {
        Self {
            status: PostStatus::Scheduled,
            scheduled_at: Some(at),
            ..Self::draft(caption)
        }
    }

    /// Record media that is already live on the platform
    pub fn from_published_media(media: &Media) -> errors::Result<Self> {
        let posted_at = media.published_at().ok_or_else(|| {
            AppError::invalid_parameter(
                "timestamp",
                format!("media {} has an unparseable timestamp '{}'", media.id, media.timestamp),
            )
        })?;

        Ok(Self {
            platform_media_id: Some(media.id.clone()),
            caption: media.caption.clone().unwrap_or_default(),
            media_url: media.media_url.clone(),
            permalink: media.permalink.clone(),
            status: PostStatus::Posted,
            scheduled_at: None,
            posted_at: Some(posted_at),
        })
    }

    /// Lifecycle invariants: scheduled needs scheduled_at, posted needs posted_at
    pub fn validate(&self) -> errors::Result<()> {
        match self.status {
            PostStatus::Scheduled if self.scheduled_at.is_none() => Err(
                AppError::invalid_parameter("scheduled_at", "a scheduled post needs scheduled_at"),
            ),
            PostStatus::Posted if self.posted_at.is_none() => Err(AppError::invalid_parameter(
                "posted_at",
                "a posted post needs posted_at",
            )),
            PostStatus::Draft | PostStatus::Scheduled if self.posted_at.is_some() => {
                Err(AppError::invalid_parameter(
                    "posted_at",
                    "posted_at is only valid for posted posts",
                ))
            }
            _ => Ok(()),
        }
    }
}
