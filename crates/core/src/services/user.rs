//! User service.

use chrono::{DateTime, Duration, Utc};
use recomate_common::config::ModerationConfig;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::user::{self, UserStatus};
use recomate_db::entities::push_token;
use recomate_db::repositories::{
    MembershipRepository, RatingRepository, RecommendationRepository, UserRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::rating::mean;
use crate::session::Session;

/// Input for registering a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(max = 512))]
    pub bio: Option<String>,
}

/// Profile fields to merge into the caller's record. `None` leaves a field as is.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    #[validate(length(max = 512))]
    pub bio: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// Activity summary shown on a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStats {
    pub groups_count: u64,
    pub posts_count: u64,
    /// Mean of every rating left on the user's recommendations.
    pub avg_rating: f64,
}

/// Whether a ban is in force at `now`. A ban without an end date never lapses.
#[must_use]
pub fn is_banned(user: &user::Model, now: DateTime<Utc>) -> bool {
    user.status == UserStatus::Banned
        && user
            .banned_until
            .is_none_or(|until| until.with_timezone(&Utc) > now)
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    membership_repo: MembershipRepository,
    recommendation_repo: RecommendationRepository,
    rating_repo: RatingRepository,
    default_ban_days: u32,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        membership_repo: MembershipRepository,
        recommendation_repo: RecommendationRepository,
        rating_repo: RatingRepository,
        moderation: &ModerationConfig,
    ) -> Self {
        Self {
            user_repo,
            membership_repo,
            recommendation_repo,
            rating_repo,
            default_ban_days: moderation.default_ban_days,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    ///
    /// The username check and the insert are separate round trips; two
    /// concurrent registrations can still claim the same name.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if self.user_repo.username_exists(&username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(username.to_lowercase()),
            username: Set(username),
            email: Set(input.email),
            status: Set(UserStatus::Active),
            banned_until: Set(None),
            photo_url: Set(input.photo_url),
            bio: Set(input.bio),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<Option<user::Model>> {
        if user_id.is_empty() {
            return Ok(None);
        }
        self.user_repo.find_by_id(user_id).await
    }

    /// Username of a user, or an empty string.
    pub async fn username(&self, user_id: &str) -> AppResult<String> {
        Ok(self
            .get(user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_default())
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_username(username).await
    }

    /// List every user.
    pub async fn list_all(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }

    /// Check that the account behind `email` may sign in.
    pub async fn ensure_can_sign_in(&self, email: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        if is_banned(&user, Utc::now()) {
            let until = user
                .banned_until
                .map_or_else(|| "further notice".to_string(), |t| t.to_rfc3339());
            return Err(AppError::PermissionDenied(format!(
                "Account is banned until {until}"
            )));
        }

        Ok(user)
    }

    /// Merge profile changes into the caller's record.
    pub async fn update_profile(
        &self,
        session: &Session,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        let user_id = session.user_id()?;
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let current_lower = user.username_lower.clone();
        let mut active: user::ActiveModel = user.into();

        if let Some(username) = input.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(AppError::Validation("Username is required".to_string()));
            }
            let lower = username.to_lowercase();
            if lower != current_lower && self.user_repo.username_exists(&username).await? {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            active.username = Set(username);
            active.username_lower = Set(lower);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(photo_url) = input.photo_url {
            active.photo_url = Set(Some(photo_url));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Ban users for `days` days, or the configured default.
    pub async fn ban_users(
        &self,
        session: &Session,
        user_ids: &[String],
        days: Option<u32>,
    ) -> AppResult<u64> {
        let admin_id = session.require_admin()?;

        let days = days.unwrap_or(self.default_ban_days);
        let until = Duration::try_days(i64::from(days))
            .and_then(|length| Utc::now().checked_add_signed(length))
            .ok_or_else(|| AppError::Validation("Ban length out of range".to_string()))?;

        let banned = self
            .user_repo
            .set_status_many(user_ids, UserStatus::Banned, Some(until.into()))
            .await?;

        tracing::info!(count = banned, days = days, banned_by = admin_id, "Users banned");
        Ok(banned)
    }

    /// Lift a ban.
    pub async fn unban_user(&self, session: &Session, user_id: &str) -> AppResult<()> {
        let admin_id = session.require_admin()?;

        self.user_repo
            .set_status_many(&[user_id.to_string()], UserStatus::Active, None)
            .await?;

        tracing::info!(user_id = user_id, unbanned_by = admin_id, "User unbanned");
        Ok(())
    }

    /// Delete user records. Their memberships and content stay behind.
    pub async fn delete_users(&self, session: &Session, user_ids: &[String]) -> AppResult<u64> {
        let admin_id = session.require_admin()?;

        let deleted = self.user_repo.delete_many(user_ids).await?;
        tracing::info!(count = deleted, deleted_by = admin_id, "Users deleted");
        Ok(deleted)
    }

    /// Delete the caller's own record.
    pub async fn delete_own_account(&self, session: &Session) -> AppResult<()> {
        let user_id = session.user_id()?;

        self.user_repo.delete(user_id).await?;
        tracing::info!(user_id = user_id, "Account deleted by owner");
        Ok(())
    }

    /// Group, post and rating figures for a profile.
    pub async fn quick_stats(&self, user_id: &str) -> AppResult<QuickStats> {
        if user_id.is_empty() {
            return Ok(QuickStats {
                groups_count: 0,
                posts_count: 0,
                avg_rating: 0.0,
            });
        }

        let groups_count = self.membership_repo.find_by_user(user_id).await?.len() as u64;
        let recommendation_ids: Vec<String> = self
            .recommendation_repo
            .find_by_creator(user_id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let posts_count = recommendation_ids.len() as u64;

        let ratings = self
            .rating_repo
            .find_by_recommendations(&recommendation_ids)
            .await?;

        Ok(QuickStats {
            groups_count,
            posts_count,
            avg_rating: mean(ratings.iter().map(|r| r.rating)),
        })
    }

    // ==================== Push Tokens ====================

    /// Register a device token for the caller. Registering twice is a no-op.
    pub async fn add_push_token(
        &self,
        session: &Session,
        token: &str,
    ) -> AppResult<push_token::Model> {
        let user_id = session.user_id()?;

        if token.is_empty() {
            return Err(AppError::Validation("Push token is required".to_string()));
        }
        if let Some(existing) = self.user_repo.find_push_token(user_id, token).await? {
            return Ok(existing);
        }

        let model = push_token::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            token: Set(token.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.user_repo.add_push_token(model).await
    }

    /// Forget a device token of the caller.
    pub async fn remove_push_token(&self, session: &Session, token: &str) -> AppResult<()> {
        let user_id = session.user_id()?;
        self.user_repo.remove_push_token(user_id, token).await
    }

    /// The caller's device tokens, oldest first.
    pub async fn push_tokens(&self, session: &Session) -> AppResult<Vec<String>> {
        let user_id = session.user_id()?;
        Ok(self
            .user_repo
            .find_push_tokens(user_id)
            .await?
            .into_iter()
            .map(|t| t.token)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> UserService {
        let db = Arc::new(db);
        UserService::new(
            UserRepository::new(Arc::clone(&db)),
            MembershipRepository::new(Arc::clone(&db)),
            RecommendationRepository::new(Arc::clone(&db)),
            RatingRepository::new(db),
            &ModerationConfig::default(),
        )
    }

    fn user(status: UserStatus, banned_until: Option<DateTime<Utc>>) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            email: "alice@example.com".to_string(),
            status,
            banned_until: banned_until.map(Into::into),
            photo_url: None,
            bio: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_is_banned() {
        let now = Utc::now();

        assert!(!is_banned(&user(UserStatus::Active, None), now));
        assert!(is_banned(&user(UserStatus::Banned, None), now));
        assert!(is_banned(
            &user(UserStatus::Banned, Some(now + Duration::days(3))),
            now
        ));
        assert!(!is_banned(
            &user(UserStatus::Banned, Some(now - Duration::days(1))),
            now
        ));
    }

    #[tokio::test]
    async fn test_banned_user_cannot_sign_in() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user(
                UserStatus::Banned,
                Some(Utc::now() + Duration::days(7)),
            )]])
            .into_connection();

        let result = service(db).ensure_can_sign_in("alice@example.com").await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_unknown_email_cannot_sign_in() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).ensure_can_sign_in("ghost@example.com").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_ban_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let session = Session::signed_in("u2", "bob@example.com", &ModerationConfig::default());

        let result = service(db)
            .ban_users(&session, &["u1".to_string()], Some(3))
            .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }
}
