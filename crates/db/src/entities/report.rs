//! Moderation report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report status.
///
/// `Reviewed` and `Resolved` are both terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "reviewed")]
    Reviewed,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

/// Kind of content a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReportedItemType {
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "recommendation")]
    Recommendation,
}

/// Report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The user who submitted the report.
    pub reporter_id: String,
    /// Reporter display name at submission time.
    pub reporter_name: String,
    pub reported_item_type: ReportedItemType,
    pub reported_item_id: String,
    /// Author of the reported content.
    #[sea_orm(indexed)]
    pub reported_user_id: String,
    pub reported_user_name: String,
    pub reason: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub group_id: Option<String>,
    pub recommendation_id: Option<String>,
    /// Content snapshot taken at submission; never refreshed.
    #[sea_orm(column_type = "Text", nullable)]
    pub reported_content: Option<String>,
    #[sea_orm(indexed)]
    pub status: ReportStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_comment: Option<String>,
    pub admin_comment_at: Option<DateTimeWithTimeZone>,
    pub admin_comment_by: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub reviewed_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
