//! SeaORM entity models
//!
//! Four collections: content ideas, posts, analytics snapshots and
//! speculations. `id` and the creation timestamps are database defaults.

mod analytics;
mod content_idea;
mod post;
mod speculation;

pub use content_idea::{
    Entity as ContentIdeaEntity,
    Model as ContentIdea,
    ActiveModel as ContentIdeaActiveModel,
    Column as ContentIdeaColumn,
    NewContentIdea,
};

pub use post::{
    Entity as PostEntity,
    Model as Post,
    ActiveModel as PostActiveModel,
    Column as PostColumn,
    NewPost,
    PostStatus,
};

pub use analytics::{
    Entity as AnalyticsEntity,
    Model as Analytics,
    ActiveModel as AnalyticsActiveModel,
    Column as AnalyticsColumn,
    NewAnalytics,
};

pub use speculation::{
    Entity as SpeculationEntity,
    Model as Speculation,
    ActiveModel as SpeculationActiveModel,
    Column as SpeculationColumn,
    NewSpeculation,
};
