//! Comment service.

use chrono::Utc;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::comment;
use recomate_db::entities::comment_vote::{self, VoteKind};
use recomate_db::repositories::{CommentRepository, UserRepository};
use sea_orm::Set;
use serde::Serialize;

use crate::session::Session;

/// A comment with its votes and the author's username.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub username: String,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, user_repo: UserRepository) -> Self {
        Self {
            comment_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a recommendation.
    pub async fn add(
        &self,
        session: &Session,
        recommendation_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        let user_id = session.user_id()?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            recommendation_id: Set(recommendation_id.to_string()),
            user_id: Set(user_id.to_string()),
            text: Set(text.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.comment_repo.create(model).await
    }

    /// Comments on a recommendation, oldest first.
    pub async fn list(&self, recommendation_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self
            .comment_repo
            .find_by_recommendation(recommendation_id)
            .await?;

        let comment_ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let votes = self.comment_repo.find_votes_for_comments(&comment_ids).await?;

        let user_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        let users = self.user_repo.find_by_ids(&user_ids).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let voters = |kind: VoteKind| -> Vec<String> {
                    votes
                        .iter()
                        .filter(|v| v.comment_id == comment.id && v.kind == kind)
                        .map(|v| v.user_id.clone())
                        .collect()
                };
                let likes = voters(VoteKind::Like);
                let dislikes = voters(VoteKind::Dislike);
                let username = users
                    .iter()
                    .find(|u| u.id == comment.user_id)
                    .map_or_else(|| "Unknown".to_string(), |u| u.username.clone());

                CommentView {
                    comment,
                    username,
                    likes,
                    dislikes,
                }
            })
            .collect())
    }

    /// Like or dislike a comment.
    ///
    /// Casting the same vote again withdraws it; casting the other one moves
    /// it. Returns the caller's vote after the call.
    pub async fn vote(
        &self,
        session: &Session,
        comment_id: &str,
        kind: VoteKind,
    ) -> AppResult<Option<VoteKind>> {
        let user_id = session.user_id()?;
        self.comment_repo.get_by_id(comment_id).await?;

        match self.comment_repo.find_vote(comment_id, user_id).await? {
            Some(existing) if existing.kind == kind => {
                self.comment_repo.delete_vote(&existing.id).await?;
                Ok(None)
            }
            Some(existing) => {
                let moved = self.comment_repo.set_vote_kind(existing, kind).await?;
                Ok(Some(moved.kind))
            }
            None => {
                let model = comment_vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    comment_id: Set(comment_id.to_string()),
                    user_id: Set(user_id.to_string()),
                    kind: Set(kind),
                    created_at: Set(Utc::now().into()),
                };
                let vote = self.comment_repo.create_vote(model).await?;
                Ok(Some(vote.kind))
            }
        }
    }

    /// Delete a comment. Allowed for its author and global admins.
    pub async fn delete(&self, session: &Session, comment_id: &str) -> AppResult<()> {
        let user_id = session.user_id()?;
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.user_id != user_id && !session.is_admin() {
            return Err(AppError::PermissionDenied(
                "Only the author can delete this comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment_id).await
    }

    /// Text of a comment, if it still exists.
    pub async fn content(&self, comment_id: &str) -> AppResult<Option<String>> {
        if comment_id.is_empty() {
            return Ok(None);
        }
        Ok(self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .map(|c| c.text))
    }
}
