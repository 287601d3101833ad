//! Repositories: one per collection, each a thin query layer over sea-orm.

pub mod category;
pub mod comment;
pub mod group;
pub mod membership;
pub mod notification;
pub mod rating;
pub mod recommendation;
pub mod report;
pub mod user;

pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use group::GroupRepository;
pub use membership::MembershipRepository;
pub use notification::NotificationRepository;
pub use rating::RatingRepository;
pub use recommendation::RecommendationRepository;
pub use report::ReportRepository;
pub use user::UserRepository;
