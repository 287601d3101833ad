//! Membership repository.

use std::sync::Arc;

use crate::entities::membership::MemberRole;
use crate::entities::{Membership, membership};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Membership repository for database operations.
#[derive(Clone)]
pub struct MembershipRepository {
    db: Arc<DatabaseConnection>,
}

impl MembershipRepository {
    /// Create a new membership repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a membership by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<membership::Model>> {
        Membership::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the memberships of a group, oldest first.
    pub async fn find_by_group(&self, group_id: &str) -> AppResult<Vec<membership::Model>> {
        Membership::find()
            .filter(membership::Column::GroupId.eq(group_id))
            .order_by_asc(membership::Column::CreatedAt)
            .order_by_asc(membership::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the memberships of a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<membership::Model>> {
        Membership::find()
            .filter(membership::Column::UserId.eq(user_id))
            .order_by_asc(membership::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the first membership of a user in a group.
    pub async fn find_by_group_and_user(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<Option<membership::Model>> {
        Membership::find()
            .filter(membership::Column::GroupId.eq(group_id))
            .filter(membership::Column::UserId.eq(user_id))
            .order_by_asc(membership::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new membership.
    pub async fn create(&self, model: membership::ActiveModel) -> AppResult<membership::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Merge a new role into an existing membership.
    pub async fn set_role(
        &self,
        membership: membership::Model,
        role: MemberRole,
    ) -> AppResult<membership::Model> {
        let mut active: membership::ActiveModel = membership.into();
        active.role = Set(role);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a membership. Deleting a missing record is not an error.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Membership::delete_by_id(id)
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
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_membership(id: &str, user_id: &str, role: MemberRole) -> membership::Model {
        membership::Model {
            id: id.to_string(),
            group_id: "group1".to_string(),
            user_id: user_id.to_string(),
            role,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_group() {
        let members = vec![
            create_test_membership("m1", "user1", MemberRole::Admin),
            create_test_membership("m2", "user2", MemberRole::Member),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([members])
                .into_connection(),
        );

        let repo = MembershipRepository::new(db);
        let result = repo.find_by_group("group1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, MemberRole::Admin);
    }

    #[tokio::test]
    async fn test_set_role() {
        let member = create_test_membership("m2", "user2", MemberRole::Member);
        let promoted = membership::Model {
            role: MemberRole::Admin,
            ..member.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[promoted]])
                .into_connection(),
        );

        let repo = MembershipRepository::new(db);
        let result = repo.set_role(member, MemberRole::Admin).await.unwrap();

        assert_eq!(result.role, MemberRole::Admin);
        assert_eq!(result.user_id, "user2");
    }
}
