//! Report repository.

use std::sync::Arc;

use crate::entities::report::ReportStatus;
use crate::entities::{Report, report};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report not found: {id}")))
    }

    /// List reports in a given status, newest first.
    pub async fn find_by_status(&self, status: ReportStatus) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::Status.eq(status))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every report, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<report::Model>> {
        Report::find()
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reports filed against a user, newest first.
    pub async fn find_by_reported_user(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::ReportedUserId.eq(user_id))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Merge changed fields into a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::report::ReportedItemType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "user1".to_string(),
            reporter_name: "alice".to_string(),
            reported_item_type: ReportedItemType::Comment,
            reported_item_id: "c1".to_string(),
            reported_user_id: "user2".to_string(),
            reported_user_name: "bob".to_string(),
            reason: "Spam".to_string(),
            description: String::new(),
            group_id: None,
            recommendation_id: Some("rec1".to_string()),
            reported_content: Some("buy now".to_string()),
            status,
            admin_comment: None,
            admin_comment_at: None,
            admin_comment_by: None,
            created_at: Utc::now().into(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_report("r2", ReportStatus::Pending),
                    create_test_report("r1", ReportStatus::Pending),
                ]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.find_by_status(ReportStatus::Pending).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.status == ReportStatus::Pending));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
