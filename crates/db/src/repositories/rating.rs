//! Rating repository.

use std::sync::Arc;

use crate::entities::{Rating, rating};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Rating repository for database operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List the ratings of a recommendation.
    pub async fn find_by_recommendation(
        &self,
        recommendation_id: &str,
    ) -> AppResult<Vec<rating::Model>> {
        Rating::find()
            .filter(rating::Column::RecommendationId.eq(recommendation_id))
            .order_by_asc(rating::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the ratings of several recommendations.
    pub async fn find_by_recommendations(
        &self,
        recommendation_ids: &[String],
    ) -> AppResult<Vec<rating::Model>> {
        if recommendation_ids.is_empty() {
            return Ok(vec![]);
        }

        Rating::find()
            .filter(rating::Column::RecommendationId.is_in(recommendation_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the first rating a user left on a recommendation.
    pub async fn find_by_recommendation_and_user(
        &self,
        recommendation_id: &str,
        user_id: &str,
    ) -> AppResult<Option<rating::Model>> {
        Rating::find()
            .filter(rating::Column::RecommendationId.eq(recommendation_id))
            .filter(rating::Column::UserId.eq(user_id))
            .order_by_asc(rating::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new rating.
    pub async fn create(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a rating.
    pub async fn update(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a rating. Deleting a missing record is not an error.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Rating::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
