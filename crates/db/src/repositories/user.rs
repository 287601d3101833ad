//! User repository.

use std::sync::Arc;

use crate::entities::user::UserStatus;
use crate::entities::{PushToken, User, push_token, user};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the first user with exactly this username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .order_by_asc(user::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a username is taken, ignoring case.
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Find the first user registered with this e-mail.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .order_by_asc(user::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every user.
    pub async fn find_all(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Merge a status and ban expiry into several users at once.
    ///
    /// Ids without a record are skipped.
    pub async fn set_status_many(
        &self,
        ids: &[String],
        status: UserStatus,
        banned_until: Option<DateTimeWithTimeZone>,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = User::update_many()
            .col_expr(user::Column::Status, Expr::value(status))
            .col_expr(user::Column::BannedUntil, Expr::value(banned_until))
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete a user and their push tokens.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.delete_many(&[id.to_string()]).await.map(|_| ())
    }

    /// Delete several users and their push tokens.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        PushToken::delete_many()
            .filter(push_token::Column::UserId.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = User::delete_many()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    // ==================== Push Tokens ====================

    /// List a user's push tokens, oldest first.
    pub async fn find_push_tokens(&self, user_id: &str) -> AppResult<Vec<push_token::Model>> {
        PushToken::find()
            .filter(push_token::Column::UserId.eq(user_id))
            .order_by_asc(push_token::Column::CreatedAt)
            .order_by_asc(push_token::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find one push token of a user.
    pub async fn find_push_token(
        &self,
        user_id: &str,
        token: &str,
    ) -> AppResult<Option<push_token::Model>> {
        PushToken::find()
            .filter(push_token::Column::UserId.eq(user_id))
            .filter(push_token::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a push token.
    pub async fn add_push_token(
        &self,
        model: push_token::ActiveModel,
    ) -> AppResult<push_token::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a push token.
    pub async fn remove_push_token(&self, user_id: &str, token: &str) -> AppResult<()> {
        PushToken::delete_many()
            .filter(push_token::Column::UserId.eq(user_id))
            .filter(push_token::Column::Token.eq(token))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
