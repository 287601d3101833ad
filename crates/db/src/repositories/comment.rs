//! Comment repository.

use std::sync::Arc;

use crate::entities::comment_vote::VoteKind;
use crate::entities::{Comment, CommentVote, comment, comment_vote};
use recomate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))
    }

    /// List the comments of a recommendation, oldest first.
    pub async fn find_by_recommendation(
        &self,
        recommendation_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::RecommendationId.eq(recommendation_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment and its votes.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        CommentVote::delete_many()
            .filter(comment_vote::Column::CommentId.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ==================== Votes ====================

    /// List the votes cast on several comments.
    pub async fn find_votes_for_comments(
        &self,
        comment_ids: &[String],
    ) -> AppResult<Vec<comment_vote::Model>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        CommentVote::find()
            .filter(comment_vote::Column::CommentId.is_in(comment_ids.to_vec()))
            .order_by_asc(comment_vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's vote on a comment.
    pub async fn find_vote(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> AppResult<Option<comment_vote::Model>> {
        CommentVote::find()
            .filter(comment_vote::Column::CommentId.eq(comment_id))
            .filter(comment_vote::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a vote.
    pub async fn create_vote(
        &self,
        model: comment_vote::ActiveModel,
    ) -> AppResult<comment_vote::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move an existing vote to the other list.
    pub async fn set_vote_kind(
        &self,
        vote: comment_vote::Model,
        kind: VoteKind,
    ) -> AppResult<comment_vote::Model> {
        let mut active: comment_vote::ActiveModel = vote.into();
        active.kind = Set(kind);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Withdraw a vote.
    pub async fn delete_vote(&self, id: &str) -> AppResult<()> {
        CommentVote::delete_by_id(id)
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

    #[tokio::test]
    async fn test_find_by_recommendation() {
        let comments = vec![comment::Model {
            id: "c1".to_string(),
            recommendation_id: "rec1".to_string(),
            user_id: "user1".to_string(),
            text: "buy now".to_string(),
            created_at: Utc::now().into(),
        }];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([comments])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_recommendation("rec1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "buy now");
    }

    #[tokio::test]
    async fn test_set_vote_kind() {
        let vote = comment_vote::Model {
            id: "v1".to_string(),
            comment_id: "c1".to_string(),
            user_id: "user2".to_string(),
            kind: VoteKind::Like,
            created_at: Utc::now().into(),
        };
        let flipped = comment_vote::Model {
            kind: VoteKind::Dislike,
            ..vote.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[flipped]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.set_vote_kind(vote, VoteKind::Dislike).await.unwrap();

        assert_eq!(result.kind, VoteKind::Dislike);
    }
}
