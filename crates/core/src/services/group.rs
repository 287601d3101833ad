//! Group service.
//!
//! Owns the group lifecycle: creation, cascading deletion, and the
//! "every active group has an admin" invariant.

use chrono::Utc;
use rand::seq::SliceRandom;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::membership::MemberRole;
use recomate_db::entities::{category, group, membership};
use recomate_db::repositories::{
    CategoryRepository, GroupRepository, MembershipRepository, RatingRepository,
    RecommendationRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::session::Session;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 2048))]
    #[serde(default)]
    pub description: String,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSummary {
    pub ratings: u64,
    pub recommendations: u64,
    pub memberships: u64,
    pub categories: u64,
    pub group_deleted: bool,
}

/// Where a group ended up after a membership was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupState {
    /// At least one membership remains, and at least one of them is an admin.
    Active,
    /// No memberships remained, so the group was cascaded away.
    Deleted,
}

/// Service for managing groups.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    category_repo: CategoryRepository,
    membership_repo: MembershipRepository,
    recommendation_repo: RecommendationRepository,
    rating_repo: RatingRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(
        group_repo: GroupRepository,
        category_repo: CategoryRepository,
        membership_repo: MembershipRepository,
        recommendation_repo: RecommendationRepository,
        rating_repo: RatingRepository,
    ) -> Self {
        Self {
            group_repo,
            category_repo,
            membership_repo,
            recommendation_repo,
            rating_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by ID.
    pub async fn get(&self, group_id: &str) -> AppResult<Option<group::Model>> {
        self.group_repo.find_by_id(group_id).await
    }

    /// List every group.
    pub async fn list_all(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// List the groups a user belongs to.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<group::Model>> {
        if user_id.is_empty() {
            return Ok(vec![]);
        }

        let mut group_ids: Vec<String> = self
            .membership_repo
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();
        group_ids.sort();
        group_ids.dedup();

        self.group_repo.find_by_ids(&group_ids).await
    }

    /// Name of a group, or an empty string when it does not exist.
    pub async fn group_name(&self, group_id: &str) -> AppResult<String> {
        if group_id.is_empty() {
            return Ok(String::new());
        }

        Ok(self
            .group_repo
            .find_by_id(group_id)
            .await?
            .map(|g| g.name)
            .unwrap_or_default())
    }

    /// Create a group. The creator becomes its first admin.
    pub async fn create_group(
        &self,
        session: &Session,
        input: CreateGroupInput,
    ) -> AppResult<group::Model> {
        let user_id = session.user_id()?;
        input.validate()?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Group name is required".to_string()));
        }

        let now = Utc::now();
        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            description: Set(input.description),
            created_by: Set(user_id.to_string()),
            created_at: Set(now.into()),
        };

        let group = self.group_repo.create(model).await?;

        let member_model = membership::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group.id.clone()),
            user_id: Set(user_id.to_string()),
            role: Set(MemberRole::Admin),
            created_at: Set(now.into()),
        };
        self.membership_repo.create(member_model).await?;

        tracing::info!(group_id = %group.id, user_id = user_id, "Group created");

        Ok(group)
    }

    /// Delete a group on request of a global admin or one of its admins.
    pub async fn delete_group(
        &self,
        session: &Session,
        group_id: &str,
    ) -> AppResult<CascadeSummary> {
        self.require_manage(session, group_id).await?;
        self.group_repo.get_by_id(group_id).await?;

        self.delete_group_cascade(group_id).await
    }

    /// Delete a group together with everything beneath it.
    ///
    /// Runs in two phases. Phase 1 deletes ratings, then recommendations, one
    /// round trip at a time and outside any transaction. Phase 2 deletes the
    /// memberships and categories found up front, plus the group record, in
    /// a single transaction. A phase 2 failure does not undo phase 1.
    pub async fn delete_group_cascade(&self, group_id: &str) -> AppResult<CascadeSummary> {
        let memberships = self.membership_repo.find_by_group(group_id).await?;
        let categories = self.category_repo.find_by_group(group_id).await?;

        let mut recommendation_ids = Vec::new();
        let mut rating_ids = Vec::new();
        for category in &categories {
            let recommendations = self
                .recommendation_repo
                .find_by_category(&category.id)
                .await?;
            for recommendation in recommendations {
                let ratings = self
                    .rating_repo
                    .find_by_recommendation(&recommendation.id)
                    .await?;
                rating_ids.extend(ratings.into_iter().map(|r| r.id));
                recommendation_ids.push(recommendation.id);
            }
        }

        // Phase 1
        for id in &rating_ids {
            self.rating_repo.delete(id).await?;
        }
        for id in &recommendation_ids {
            self.recommendation_repo.delete(id).await?;
        }

        // Phase 2
        let membership_ids: Vec<String> = memberships.into_iter().map(|m| m.id).collect();
        let category_ids: Vec<String> = categories.into_iter().map(|c| c.id).collect();
        let deleted = self
            .group_repo
            .delete_with_members_and_categories(group_id, &membership_ids, &category_ids)
            .await?;

        let summary = CascadeSummary {
            ratings: rating_ids.len() as u64,
            recommendations: recommendation_ids.len() as u64,
            memberships: deleted.memberships,
            categories: deleted.categories,
            group_deleted: deleted.groups > 0,
        };

        tracing::info!(
            group_id = group_id,
            ratings = summary.ratings,
            recommendations = summary.recommendations,
            memberships = summary.memberships,
            categories = summary.categories,
            "Group deleted with cascade"
        );

        Ok(summary)
    }

    /// Promote an arbitrary remaining member when the group has no admin.
    ///
    /// The pick is uniformly random, not weighted by seniority. Returns the
    /// promoted membership, or `None` when the group is empty or already has
    /// an admin.
    pub async fn assign_random_admin(
        &self,
        group_id: &str,
    ) -> AppResult<Option<membership::Model>> {
        let remaining = self.membership_repo.find_by_group(group_id).await?;

        if remaining.is_empty() {
            return Ok(None);
        }
        if remaining.iter().any(|m| m.role == MemberRole::Admin) {
            return Ok(None);
        }

        let chosen = {
            let mut rng = rand::thread_rng();
            remaining.choose(&mut rng).cloned()
        };
        let Some(chosen) = chosen else {
            return Ok(None);
        };

        let promoted = self
            .membership_repo
            .set_role(chosen, MemberRole::Admin)
            .await?;

        tracing::info!(
            group_id = group_id,
            user_id = %promoted.user_id,
            "Promoted random member to admin"
        );

        Ok(Some(promoted))
    }

    /// Re-establish group invariants after a membership was deleted.
    ///
    /// An empty group is cascaded away; this takes precedence over
    /// succession. Otherwise, when the removed membership was an admin, a
    /// new admin is picked if none remains.
    pub async fn restore_consistency(
        &self,
        group_id: &str,
        removed_role: MemberRole,
    ) -> AppResult<GroupState> {
        let remaining = self.membership_repo.find_by_group(group_id).await?;

        if remaining.is_empty() {
            self.delete_group_cascade(group_id).await?;
            return Ok(GroupState::Deleted);
        }

        if removed_role == MemberRole::Admin {
            self.assign_random_admin(group_id).await?;
        }

        Ok(GroupState::Active)
    }

    /// Whether the caller may manage the group's members.
    ///
    /// Global admins may manage every group; otherwise the caller needs an
    /// admin membership in it.
    pub async fn can_manage(&self, session: &Session, group_id: &str) -> AppResult<bool> {
        let Ok(user_id) = session.user_id() else {
            return Ok(false);
        };
        if session.is_admin() {
            return Ok(true);
        }

        Ok(self
            .membership_repo
            .find_by_group_and_user(group_id, user_id)
            .await?
            .is_some_and(|m| m.role.can_manage_members()))
    }

    /// Fail unless the caller may manage the group.
    pub async fn require_manage(&self, session: &Session, group_id: &str) -> AppResult<()> {
        session.user_id()?;
        if !self.can_manage(session, group_id).await? {
            return Err(AppError::PermissionDenied(
                "Only group admins can do this".to_string(),
            ));
        }
        Ok(())
    }

    // ==================== Categories ====================

    /// Create a category inside a group.
    pub async fn create_category(
        &self,
        session: &Session,
        group_id: &str,
        name: &str,
    ) -> AppResult<category::Model> {
        session.user_id()?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }
        self.group_repo.get_by_id(group_id).await?;

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            group_id: Set(group_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.category_repo.create(model).await
    }

    /// List the categories of a group.
    pub async fn list_categories(&self, group_id: &str) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_by_group(group_id).await
    }
}
