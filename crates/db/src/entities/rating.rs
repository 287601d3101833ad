//! Rating entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lowest accepted score.
pub const MIN_SCORE: i32 = 1;

/// Highest accepted score.
pub const MAX_SCORE: i32 = 5;

/// One user's score for one recommendation.
///
/// At most one row exists per (`recommendation_id`, `user_id`); a second
/// rating overwrites the first.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub recommendation_id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    pub rating: i32,

    #[sea_orm(column_type = "Text")]
    pub comment: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recommendation::Entity",
        from = "Column::RecommendationId",
        to = "super::recommendation::Column::Id"
    )]
    Recommendation,
}

impl Related<super::recommendation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recommendation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
