//! Report service.
//!
//! Moderation reports move `pending -> reviewed` or `pending -> resolved`;
//! both targets are terminal. Comment reports carry a snapshot of the
//! comment text taken at submission, so review still works after the
//! comment is gone.

use chrono::Utc;
use recomate_common::{AppError, AppResult, IdGenerator};
use recomate_db::entities::report::{self, ReportStatus, ReportedItemType};
use recomate_db::repositories::{CommentRepository, ReportRepository, UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::session::Session;

/// Reasons offered to reporters.
pub const REPORT_REASONS: [&str; 7] = [
    "Harassment or bullying",
    "Hate speech",
    "Spam",
    "Inappropriate content",
    "False information",
    "Privacy violation",
    "Other",
];

/// Snapshot stored when the reported comment no longer exists.
pub const COMMENT_NOT_FOUND: &str = "Comment not found or deleted";

/// Snapshot stored when the reported comment could not be fetched.
pub const COMMENT_UNAVAILABLE: &str = "Content unavailable - comment may have been deleted";

const COMMENT_ID_MISSING: &str = "Comment not found";
const COMMENT_BODY_EMPTY: &str = "Comment content unavailable";
const COMMENT_LOAD_FAILED: &str = "Error loading comment content";

/// Input for submitting a report.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportInput {
    pub reported_item_type: ReportedItemType,
    #[validate(length(min = 1))]
    pub reported_item_id: String,
    pub reported_user_id: String,
    #[serde(default)]
    pub reported_user_name: String,
    #[validate(length(min = 1, max = 128))]
    pub reason: String,
    #[validate(length(max = 2048))]
    #[serde(default)]
    pub description: String,
    pub group_id: Option<String>,
    pub recommendation_id: Option<String>,
    /// Text of the reported comment as the reporter saw it.
    pub comment_content: Option<String>,
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a report as the signed-in user.
    pub async fn submit_report(
        &self,
        session: &Session,
        input: SubmitReportInput,
    ) -> AppResult<report::Model> {
        let reporter_id = session.user_id()?;
        input.validate()?;

        if input.reason.trim().is_empty() {
            return Err(AppError::Validation("A reason is required".to_string()));
        }

        let reporter_name = self
            .user_repo
            .find_by_id(reporter_id)
            .await?
            .map(|u| if u.username.is_empty() { u.email } else { u.username })
            .unwrap_or_default();

        let reported_content = match input.reported_item_type {
            ReportedItemType::Comment => match input.comment_content.filter(|c| !c.is_empty()) {
                Some(snapshot) => Some(snapshot),
                None => Some(match self.live_comment_text(&input.reported_item_id).await {
                    Ok(Some(text)) => text,
                    Ok(None) => COMMENT_NOT_FOUND.to_string(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to fetch reported comment");
                        COMMENT_UNAVAILABLE.to_string()
                    }
                }),
            },
            ReportedItemType::Recommendation => None,
        };

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            reporter_id: Set(reporter_id.to_string()),
            reporter_name: Set(reporter_name),
            reported_item_type: Set(input.reported_item_type),
            reported_item_id: Set(input.reported_item_id),
            reported_user_id: Set(input.reported_user_id),
            reported_user_name: Set(input.reported_user_name),
            reason: Set(input.reason),
            description: Set(input.description),
            group_id: Set(input.group_id.filter(|g| !g.is_empty())),
            recommendation_id: Set(input.recommendation_id.filter(|r| !r.is_empty())),
            reported_content: Set(reported_content),
            status: Set(ReportStatus::Pending),
            admin_comment: Set(None),
            admin_comment_at: Set(None),
            admin_comment_by: Set(None),
            created_at: Set(Utc::now().into()),
            reviewed_at: Set(None),
            reviewed_by: Set(None),
        };

        let report = self.report_repo.create(model).await?;

        tracing::info!(
            report_id = %report.id,
            reporter_id = reporter_id,
            reason = %report.reason,
            "Report submitted"
        );

        Ok(report)
    }

    /// Like [`Self::submit_report`], reporting only success or failure.
    pub async fn try_submit_report(&self, session: &Session, input: SubmitReportInput) -> bool {
        match self.submit_report(session, input).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to submit report");
                false
            }
        }
    }

    /// Close a pending report as reviewed or resolved.
    ///
    /// An admin comment, when given, is written in the same update.
    pub async fn update_status(
        &self,
        session: &Session,
        report_id: &str,
        status: ReportStatus,
        admin_comment: Option<&str>,
    ) -> AppResult<report::Model> {
        let admin_id = session.require_admin()?;

        if status == ReportStatus::Pending {
            return Err(AppError::Validation(
                "A report can only move to reviewed or resolved".to_string(),
            ));
        }

        let report = self.report_repo.get_by_id(report_id).await?;
        if report.status != ReportStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Report {report_id} is already {:?}",
                report.status
            )));
        }

        let now = Utc::now();
        let mut active: report::ActiveModel = report.into();
        active.status = Set(status);
        active.reviewed_at = Set(Some(now.into()));
        active.reviewed_by = Set(Some(admin_id.to_string()));

        if let Some(comment) = admin_comment.map(str::trim).filter(|c| !c.is_empty()) {
            active.admin_comment = Set(Some(comment.to_string()));
            active.admin_comment_at = Set(Some(now.into()));
            active.admin_comment_by = Set(Some(admin_id.to_string()));
        }

        let updated = self.report_repo.update(active).await?;

        tracing::info!(
            report_id = report_id,
            status = ?updated.status,
            reviewed_by = admin_id,
            "Report closed"
        );

        Ok(updated)
    }

    /// Like [`Self::update_status`], reporting only success or failure.
    pub async fn try_update_status(
        &self,
        session: &Session,
        report_id: &str,
        status: ReportStatus,
        admin_comment: Option<&str>,
    ) -> bool {
        match self
            .update_status(session, report_id, status, admin_comment)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, report_id = report_id, "Failed to update report status");
                false
            }
        }
    }

    /// Attach or replace the admin comment of a report.
    pub async fn set_admin_comment(
        &self,
        session: &Session,
        report_id: &str,
        comment: &str,
    ) -> AppResult<report::Model> {
        let admin_id = session.require_admin()?;
        let report = self.report_repo.get_by_id(report_id).await?;

        let mut active: report::ActiveModel = report.into();
        active.admin_comment = Set(Some(comment.to_string()));
        active.admin_comment_at = Set(Some(Utc::now().into()));
        active.admin_comment_by = Set(Some(admin_id.to_string()));

        self.report_repo.update(active).await
    }

    /// Pending reports, newest first.
    pub async fn list_pending(&self) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_by_status(ReportStatus::Pending).await
    }

    /// Every report, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_all().await
    }

    /// Reports filed against a user, newest first.
    pub async fn reports_for_user(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_by_reported_user(user_id).await
    }

    /// Content to show a moderator for a report.
    ///
    /// The stored snapshot wins; older reports without one fall back to the
    /// live comment.
    pub async fn reported_content(&self, report: &report::Model) -> AppResult<String> {
        if let Some(snapshot) = report.reported_content.as_ref().filter(|s| !s.is_empty()) {
            return Ok(snapshot.clone());
        }
        if report.reported_item_type != ReportedItemType::Comment {
            return Ok(String::new());
        }

        Ok(match self.live_comment_text(&report.reported_item_id).await {
            Ok(Some(text)) => text,
            Ok(None) => COMMENT_NOT_FOUND.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, report_id = %report.id, "Failed to load comment");
                COMMENT_LOAD_FAILED.to_string()
            }
        })
    }

    /// `Ok(None)` when the comment is gone.
    async fn live_comment_text(&self, comment_id: &str) -> AppResult<Option<String>> {
        if comment_id.is_empty() {
            return Ok(Some(COMMENT_ID_MISSING.to_string()));
        }

        Ok(self.comment_repo.find_by_id(comment_id).await?.map(|c| {
            if c.text.is_empty() {
                COMMENT_BODY_EMPTY.to_string()
            } else {
                c.text
            }
        }))
    }
}
