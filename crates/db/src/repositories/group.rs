//! Group repository.

use std::sync::Arc;

use crate::entities::{Category, Group, Membership, category, group, membership};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

/// Row counts removed by [`GroupRepository::delete_with_members_and_categories`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupBatchDeletion {
    pub memberships: u64,
    pub categories: u64,
    pub groups: u64,
}

/// Group repository for database operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a group by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {id}")))
    }

    /// Find groups by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<group::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Group::find()
            .filter(group::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(group::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every group.
    pub async fn find_all(&self) -> AppResult<Vec<group::Model>> {
        Group::find()
            .order_by_asc(group::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new group.
    pub async fn create(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the listed memberships, the listed categories, and the group
    /// itself in a single transaction.
    ///
    /// Either every row goes or none does.
    pub async fn delete_with_members_and_categories(
        &self,
        group_id: &str,
        membership_ids: &[String],
        category_ids: &[String],
    ) -> AppResult<GroupBatchDeletion> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut deleted = GroupBatchDeletion::default();

        if !membership_ids.is_empty() {
            deleted.memberships = Membership::delete_many()
                .filter(membership::Column::Id.is_in(membership_ids.to_vec()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .rows_affected;
        }

        if !category_ids.is_empty() {
            deleted.categories = Category::delete_many()
                .filter(category::Column::Id.is_in(category_ids.to_vec()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .rows_affected;
        }

        deleted.groups = Group::delete_by_id(group_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_group(id: &str, name: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_by: "user1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let group = create_test_group("group1", "Foodies");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.find_by_id("group1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Foodies");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_batch_delete_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let deleted = repo
            .delete_with_members_and_categories(
                "group1",
                &["m1".to_string(), "m2".to_string()],
                &["c1".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(
            deleted,
            GroupBatchDeletion {
                memberships: 2,
                categories: 1,
                groups: 1,
            }
        );
    }
}
