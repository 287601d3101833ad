//! Membership service.
//!
//! The ledger of who belongs to which group. Every removal hands the group
//! back to [`GroupService::restore_consistency`].

use chrono::Utc;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::membership::{self, MemberRole};
use recomate_db::entities::notification::NotificationType;
use recomate_db::repositories::{GroupRepository, MembershipRepository, UserRepository};
use sea_orm::Set;
use serde::Serialize;

use crate::services::group::{GroupService, GroupState};
use crate::services::notification::NotificationService;
use crate::session::Session;

const INVITE_TITLE: &str = "Group Invitation";

/// Result of inviting a user by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    Invited(membership::Model),
    /// No user has that username. Nothing was written.
    UserNotFound,
}

/// A membership with the member's username.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub membership: membership::Model,
    pub username: String,
}

/// Service for managing group memberships.
#[derive(Clone)]
pub struct MembershipService {
    membership_repo: MembershipRepository,
    group_repo: GroupRepository,
    user_repo: UserRepository,
    groups: GroupService,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl MembershipService {
    /// Create a new membership service.
    #[must_use]
    pub const fn new(
        membership_repo: MembershipRepository,
        group_repo: GroupRepository,
        user_repo: UserRepository,
        groups: GroupService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            membership_repo,
            group_repo,
            user_repo,
            groups,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Insert a membership record.
    ///
    /// No check is made for an existing membership of the same user.
    pub async fn create_membership(
        &self,
        group_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> AppResult<membership::Model> {
        let model = membership::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            user_id: Set(user_id.to_string()),
            role: Set(role),
            created_at: Set(Utc::now().into()),
        };

        self.membership_repo.create(model).await
    }

    /// Make a member an admin of their group. Promoting an admin again is a
    /// no-op; a missing membership yields `None`.
    pub async fn promote_to_admin(
        &self,
        session: &Session,
        membership_id: &str,
    ) -> AppResult<Option<membership::Model>> {
        session.user_id()?;

        let Some(member) = self.membership_repo.find_by_id(membership_id).await? else {
            tracing::debug!(membership_id = membership_id, "Promotion of missing membership");
            return Ok(None);
        };

        self.groups.require_manage(session, &member.group_id).await?;

        if member.role == MemberRole::Admin {
            return Ok(Some(member));
        }

        let promoted = self
            .membership_repo
            .set_role(member, MemberRole::Admin)
            .await?;

        tracing::info!(
            group_id = %promoted.group_id,
            user_id = %promoted.user_id,
            "Member promoted to admin"
        );

        Ok(Some(promoted))
    }

    /// Remove a membership, then restore the group's invariants.
    ///
    /// Returns `None` when the membership does not exist.
    pub async fn remove_member(
        &self,
        session: &Session,
        membership_id: &str,
    ) -> AppResult<Option<GroupState>> {
        let caller_id = session.user_id()?;

        let Some(member) = self.membership_repo.find_by_id(membership_id).await? else {
            tracing::debug!(membership_id = membership_id, "Removal of missing membership");
            return Ok(None);
        };

        self.groups.require_manage(session, &member.group_id).await?;

        if member.role == MemberRole::Admin && member.user_id != caller_id && !session.is_admin()
        {
            return Err(AppError::PermissionDenied(
                "Only administrators can remove another group admin".to_string(),
            ));
        }

        self.membership_repo.delete(&member.id).await?;

        tracing::info!(
            group_id = %member.group_id,
            user_id = %member.user_id,
            removed_by = caller_id,
            "Member removed"
        );

        let state = self
            .groups
            .restore_consistency(&member.group_id, member.role)
            .await?;

        Ok(Some(state))
    }

    /// Leave a group. Leaving a group you are not in does nothing and
    /// returns `None`.
    pub async fn leave_group(
        &self,
        session: &Session,
        group_id: &str,
    ) -> AppResult<Option<GroupState>> {
        let user_id = session.user_id()?;

        let Some(member) = self
            .membership_repo
            .find_by_group_and_user(group_id, user_id)
            .await?
        else {
            tracing::debug!(group_id = group_id, user_id = user_id, "Not a member");
            return Ok(None);
        };

        self.membership_repo.delete(&member.id).await?;

        tracing::info!(group_id = group_id, user_id = user_id, "Member left group");

        let state = self
            .groups
            .restore_consistency(group_id, member.role)
            .await?;

        Ok(Some(state))
    }

    /// Join a group as a regular member.
    pub async fn join_group(
        &self,
        session: &Session,
        group_id: &str,
    ) -> AppResult<membership::Model> {
        let user_id = session.user_id()?;
        self.group_repo.get_by_id(group_id).await?;

        if let Some(existing) = self
            .membership_repo
            .find_by_group_and_user(group_id, user_id)
            .await?
        {
            return Ok(existing);
        }

        self.create_membership(group_id, user_id, MemberRole::Member)
            .await
    }

    /// Add a user to a group by exact username.
    ///
    /// The invitee is notified in-app and by push unless they invited
    /// themselves. Notification failures never fail the invite.
    pub async fn invite_by_username(
        &self,
        session: &Session,
        group_id: &str,
        username: &str,
    ) -> AppResult<InviteOutcome> {
        let inviter_id = session.user_id()?;

        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        let Some(invitee) = self.user_repo.find_by_username(username).await? else {
            return Ok(InviteOutcome::UserNotFound);
        };

        let membership = self
            .create_membership(group_id, &invitee.id, MemberRole::Member)
            .await?;

        if invitee.id != inviter_id {
            let inviter_name = self
                .user_repo
                .find_by_id(inviter_id)
                .await?
                .map_or_else(|| "Someone".to_string(), |u| u.username);
            let group_name = self
                .group_repo
                .find_by_id(group_id)
                .await?
                .map_or_else(|| "a group".to_string(), |g| g.name);
            let body = format!("{inviter_name} added you to \"{group_name}\"");

            if let Err(e) = self
                .notifications
                .notify(
                    &invitee.id,
                    INVITE_TITLE,
                    &body,
                    NotificationType::GroupInvite,
                    Some(group_id),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to record invite notification");
            }
            self.notifications
                .push_to_user(&invitee.id, INVITE_TITLE, &body)
                .await;
        }

        tracing::info!(
            group_id = group_id,
            user_id = %invitee.id,
            invited_by = inviter_id,
            "User invited to group"
        );

        Ok(InviteOutcome::Invited(membership))
    }

    /// List the members of a group with their usernames.
    pub async fn list_members(&self, group_id: &str) -> AppResult<Vec<MemberView>> {
        let memberships = self.membership_repo.find_by_group(group_id).await?;

        let user_ids: Vec<String> = memberships.iter().map(|m| m.user_id.clone()).collect();
        let users = self.user_repo.find_by_ids(&user_ids).await?;

        Ok(memberships
            .into_iter()
            .map(|membership| {
                let username = users
                    .iter()
                    .find(|u| u.id == membership.user_id)
                    .map_or_else(|| "Unknown".to_string(), |u| u.username.clone());
                MemberView {
                    membership,
                    username,
                }
            })
            .collect())
    }

    /// The caller's membership in a group.
    pub async fn my_membership(
        &self,
        session: &Session,
        group_id: &str,
    ) -> AppResult<Option<membership::Model>> {
        let user_id = session.user_id()?;
        self.membership_repo
            .find_by_group_and_user(group_id, user_id)
            .await
    }

    /// Whether the caller may manage the group's members.
    pub async fn can_manage(&self, session: &Session, group_id: &str) -> AppResult<bool> {
        self.groups.can_manage(session, group_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use recomate_common::config::{ModerationConfig, NotificationsConfig};
    use recomate_db::entities::user;
    use recomate_db::repositories::{
        CategoryRepository, NotificationRepository, RatingRepository, RecommendationRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> MembershipService {
        let db = Arc::new(db);
        let groups = GroupService::new(
            GroupRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            MembershipRepository::new(Arc::clone(&db)),
            RecommendationRepository::new(Arc::clone(&db)),
            RatingRepository::new(Arc::clone(&db)),
        );
        let notifications = NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            &NotificationsConfig::default(),
        );
        MembershipService::new(
            MembershipRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
            groups,
            notifications,
        )
    }

    fn alice() -> Session {
        Session::signed_in("alice", "alice@example.com", &ModerationConfig::default())
    }

    #[tokio::test]
    async fn test_promote_missing_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<membership::Model>::new()])
            .into_connection();

        let result = service(db).promote_to_admin(&alice(), "gone").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_leave_group_not_a_member() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<membership::Model>::new()])
            .into_connection();

        let result = service(db).leave_group(&alice(), "group1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_invite_empty_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .invite_by_username(&alice(), "group1", "   ")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invite_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db)
            .invite_by_username(&alice(), "group1", "nobody")
            .await
            .unwrap();

        assert_eq!(result, InviteOutcome::UserNotFound);
    }

    #[tokio::test]
    async fn test_anonymous_cannot_leave() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .leave_group(&Session::anonymous(), "group1")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
