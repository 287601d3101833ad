//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod group;
pub mod membership;
pub mod notification;
pub mod rating;
pub mod recommendation;
pub mod report;
pub mod user;

pub use comment::{CommentService, CommentView};
pub use group::{CascadeSummary, CreateGroupInput, GroupService, GroupState};
pub use membership::{InviteOutcome, MemberView, MembershipService};
pub use notification::{
    NoOpPushDispatcher, NotificationService, PushDispatcher, PushDispatcherService,
};
pub use rating::{RatingOutcome, RatingService};
pub use recommendation::{
    CreateRecommendationInput, RecommendationService, UpdateRecommendationInput,
};
pub use report::{REPORT_REASONS, ReportService, SubmitReportInput};
pub use user::{QuickStats, RegisterInput, UpdateProfileInput, UserService};
