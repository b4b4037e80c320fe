//! Speculation entity (append-only)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "speculations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub company: String,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub topic: String,

    #[sea_orm(column_type = "Text")]
    pub headline: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A speculation before the store has assigned identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpeculation {
    pub company: String,
    pub topic: String,
    pub headline: String,
    pub content: String,
}
