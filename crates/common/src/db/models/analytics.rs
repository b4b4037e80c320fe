//! Analytics snapshot entity (append-only time series per post)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{self, AppError};
use crate::sources::MediaInsights;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub post_id: i32,

    pub engagement: i64,

    pub impressions: i64,

    pub reach: i64,

    pub saved: i64,

    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A snapshot before the store has assigned identity and `recorded_at`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnalytics {
    pub post_id: i32,
    pub engagement: i64,
    pub impressions: i64,
    pub reach: i64,
    pub saved: i64,
}

impl NewAnalytics {
    pub fn from_insights(post_id: i32, insights: &MediaInsights) -> Self {
        Self {
            post_id,
            engagement: insights.engagement,
            impressions: insights.impressions,
            reach: insights.reach,
            saved: insights.saved,
        }
    }

    pub fn validate(&self) -> errors::Result<()> {
        let counters = [
            ("engagement", self.engagement),
            ("impressions", self.impressions),
            ("reach", self.reach),
            ("saved", self.saved),
        ];
        for (field, value) in counters {
            if value < 0 {
                return Err(AppError::invalid_parameter(
                    field,
                    format!("{} must not be negative", field),
                ));
            }
        }
        Ok(())
    }
}
