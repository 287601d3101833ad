//! Recommendation repository.

use std::sync::Arc;

use crate::entities::{Recommendation, recommendation};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Recommendation repository for database operations.
#[derive(Clone)]
pub struct RecommendationRepository {
    db: Arc<DatabaseConnection>,
}

impl RecommendationRepository {
    /// Create a new recommendation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recommendation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recommendation::Model>> {
        Recommendation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a recommendation by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recommendation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recommendation not found: {id}")))
    }

    /// List the recommendations of one category, newest first.
    pub async fn find_by_category(
        &self,
        category_id: &str,
    ) -> AppResult<Vec<recommendation::Model>> {
        Recommendation::find()
            .filter(recommendation::Column::CategoryId.eq(category_id))
            .order_by_desc(recommendation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the recommendations written by a user.
    pub async fn find_by_creator(&self, user_id: &str) -> AppResult<Vec<recommendation::Model>> {
        Recommendation::find()
            .filter(recommendation::Column::CreatedBy.eq(user_id))
            .order_by_desc(recommendation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new recommendation.
    pub async fn create(
        &self,
        model: recommendation::ActiveModel,
    ) -> AppResult<recommendation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a recommendation.
    pub async fn update(
        &self,
        model: recommendation::ActiveModel,
    ) -> AppResult<recommendation::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a recommendation. Deleting a missing record is not an error.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Recommendation::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::recommendation::DEFAULT_COLOR;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_recommendation(id: &str, created_by: &str) -> recommendation::Model {
        recommendation::Model {
            id: id.to_string(),
            category_id: "cat1".to_string(),
            title: "Pho 99".to_string(),
            content: "Best broth in town".to_string(),
            image_url: String::new(),
            location: String::new(),
            color: DEFAULT_COLOR.to_string(),
            created_by: created_by.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let rec = create_test_recommendation("rec1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rec.clone()]])
                .into_connection(),
        );

        let repo = RecommendationRepository::new(db);
        let result = repo.get_by_id("rec1").await.unwrap();

        assert_eq!(result.created_by, "user1");
        assert_eq!(result.color, "#ff6f00");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recommendation::Model>::new()])
                .into_connection(),
        );

        let repo = RecommendationRepository::new(db);
        let result = repo.get_by_id("gone").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
