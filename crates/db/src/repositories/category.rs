//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the categories of a group.
    pub async fn find_by_group(&self, group_id: &str) -> AppResult<Vec<category::Model>> {
        Category::find()
            .filter(category::Column::GroupId.eq(group_id))
            .order_by_asc(category::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_group() {
        let categories = vec![
            category::Model {
                id: "cat1".to_string(),
                name: "Restaurants".to_string(),
                group_id: "group1".to_string(),
                created_at: Utc::now().into(),
            },
            category::Model {
                id: "cat2".to_string(),
                name: "Movies".to_string(),
                group_id: "group1".to_string(),
                created_at: Utc::now().into(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([categories])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.find_by_group("group1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].name, "Movies");
    }
}
