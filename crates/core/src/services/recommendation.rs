//! Recommendation service.

use chrono::Utc;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::recommendation::{self, DEFAULT_COLOR};
use recomate_db::repositories::{RecommendationRepository, UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::session::Session;

/// Input for posting a recommendation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecommendationInput {
    #[validate(length(min = 1))]
    pub category_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
}

/// Input for editing a recommendation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecommendationInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
}

fn or_default_color(color: Option<String>) -> String {
    color
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

/// Recommendation service for business logic.
#[derive(Clone)]
pub struct RecommendationService {
    recommendation_repo: RecommendationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl RecommendationService {
    /// Create a new recommendation service.
    #[must_use]
    pub const fn new(
        recommendation_repo: RecommendationRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            recommendation_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a recommendation under a category.
    pub async fn add(
        &self,
        session: &Session,
        input: CreateRecommendationInput,
    ) -> AppResult<recommendation::Model> {
        let user_id = session.user_id()?;
        input.validate()?;

        if input.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let model = recommendation::ActiveModel {
            id: Set(self.id_gen.generate()),
            category_id: Set(input.category_id),
            title: Set(input.title),
            content: Set(input.content),
            image_url: Set(input.image_url.unwrap_or_default()),
            location: Set(input.location.unwrap_or_default()),
            color: Set(or_default_color(input.color)),
            created_by: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.recommendation_repo.create(model).await
    }

    /// Edit a recommendation. Only its author may do this.
    pub async fn update(
        &self,
        session: &Session,
        recommendation_id: &str,
        input: UpdateRecommendationInput,
    ) -> AppResult<recommendation::Model> {
        input.validate()?;
        let recommendation = self.require_owner(session, recommendation_id).await?;

        let mut active: recommendation::ActiveModel = recommendation.into();
        active.title = Set(input.title);
        active.content = Set(input.content);
        active.image_url = Set(input.image_url.unwrap_or_default());
        active.location = Set(input.location.unwrap_or_default());
        active.color = Set(or_default_color(input.color));
        active.updated_at = Set(Some(Utc::now().into()));

        self.recommendation_repo.update(active).await
    }

    /// Delete a recommendation. Only its author may do this.
    pub async fn delete(&self, session: &Session, recommendation_id: &str) -> AppResult<()> {
        let recommendation = self.require_owner(session, recommendation_id).await?;
        self.recommendation_repo.delete(&recommendation.id).await?;

        tracing::info!(recommendation_id = recommendation_id, "Recommendation deleted");
        Ok(())
    }

    /// Re-fetch the record and check authorship on every call.
    async fn require_owner(
        &self,
        session: &Session,
        recommendation_id: &str,
    ) -> AppResult<recommendation::Model> {
        let user_id = session.user_id()?;
        let recommendation = self.recommendation_repo.get_by_id(recommendation_id).await?;

        if recommendation.created_by != user_id {
            return Err(AppError::PermissionDenied(
                "Only the author can change this recommendation".to_string(),
            ));
        }

        Ok(recommendation)
    }

    /// Get a recommendation by ID.
    pub async fn get(&self, recommendation_id: &str) -> AppResult<Option<recommendation::Model>> {
        if recommendation_id.is_empty() {
            return Ok(None);
        }
        self.recommendation_repo.find_by_id(recommendation_id).await
    }

    /// List the recommendations of a category, newest first.
    pub async fn list_by_category(
        &self,
        category_id: &str,
    ) -> AppResult<Vec<recommendation::Model>> {
        if category_id.is_empty() {
            return Ok(vec![]);
        }
        self.recommendation_repo.find_by_category(category_id).await
    }

    /// Username of a recommendation's author, or an empty string.
    pub async fn creator_name(&self, recommendation_id: &str) -> AppResult<String> {
        let Some(recommendation) = self.get(recommendation_id).await? else {
            return Ok(String::new());
        };

        Ok(self
            .user_repo
            .find_by_id(&recommendation.created_by)
            .await?
            .map(|u| u.username)
            .unwrap_or_default())
    }

    /// Title of a recommendation, or an empty string.
    pub async fn title(&self, recommendation_id: &str) -> AppResult<String> {
        Ok(self
            .get(recommendation_id)
            .await?
            .map(|r| r.title)
            .unwrap_or_default())
    }
}
