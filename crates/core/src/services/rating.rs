//! Rating service.
//!
//! A user has at most one rating per recommendation; rating again updates it.

use chrono::Utc;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::rating::{self, MAX_SCORE, MIN_SCORE};
use recomate_db::repositories::RatingRepository;
use sea_orm::Set;

use crate::session::Session;

/// Whether [`RatingService::add_rating`] inserted or overwrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingOutcome {
    Created(rating::Model),
    Updated(rating::Model),
}

impl RatingOutcome {
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    #[must_use]
    pub const fn rating(&self) -> &rating::Model {
        match self {
            Self::Created(r) | Self::Updated(r) => r,
        }
    }
}

/// Rating service for business logic.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: RatingRepository,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(rating_repo: RatingRepository) -> Self {
        Self {
            rating_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Rate a recommendation on the caller's behalf.
    pub async fn add_rating(
        &self,
        session: &Session,
        recommendation_id: &str,
        score: i32,
        comment: Option<&str>,
    ) -> AppResult<RatingOutcome> {
        let user_id = session.user_id()?;

        if recommendation_id.is_empty() {
            return Err(AppError::Validation(
                "Recommendation id is required".to_string(),
            ));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(AppError::Validation(format!(
                "Rating must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }

        let comment = comment.unwrap_or_default().to_string();
        let now = Utc::now();

        if let Some(existing) = self
            .rating_repo
            .find_by_recommendation_and_user(recommendation_id, user_id)
            .await?
        {
            let mut active: rating::ActiveModel = existing.into();
            active.rating = Set(score);
            active.comment = Set(comment);
            active.updated_at = Set(Some(now.into()));

            return self.rating_repo.update(active).await.map(RatingOutcome::Updated);
        }

        let model = rating::ActiveModel {
            id: Set(self.id_gen.generate()),
            recommendation_id: Set(recommendation_id.to_string()),
            user_id: Set(user_id.to_string()),
            rating: Set(score),
            comment: Set(comment),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        self.rating_repo.create(model).await.map(RatingOutcome::Created)
    }

    /// Average score of a recommendation, `0.0` when unrated.
    pub async fn average(&self, recommendation_id: &str) -> AppResult<f64> {
        if recommendation_id.is_empty() {
            return Ok(0.0);
        }

        let ratings = self
            .rating_repo
            .find_by_recommendation(recommendation_id)
            .await?;
        Ok(mean(ratings.iter().map(|r| r.rating)))
    }

    /// Number of ratings on a recommendation.
    pub async fn count(&self, recommendation_id: &str) -> AppResult<u64> {
        if recommendation_id.is_empty() {
            return Ok(0);
        }

        let ratings = self
            .rating_repo
            .find_by_recommendation(recommendation_id)
            .await?;
        Ok(ratings.len() as u64)
    }
}

/// Mean of the scores, `0.0` for none.
pub(crate) fn mean(scores: impl Iterator<Item = i32>) -> f64 {
    let (total, count) = scores.fold((0_i64, 0_u64), |(total, count), score| {
        (total + i64::from(score), count + 1)
    });
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use recomate_common::config::ModerationConfig;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn test_mean() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert_eq!(mean([4, 5].into_iter()), 4.5);
    }

    #[tokio::test]
    async fn test_score_out_of_range() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = RatingService::new(RatingRepository::new(db));
        let session = Session::signed_in("u1", "u1@example.com", &ModerationConfig::default());

        for score in [0, 6, -1] {
            let result = service.add_rating(&session, "rec1", score, None).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }
}
