//! Database entities.
//!
//! Each module mirrors one collection of the document store. There are no
//! foreign keys between tables: referential cleanup happens in the services.

pub mod category;
pub mod comment;
pub mod comment_vote;
pub mod group;
pub mod membership;
pub mod notification;
pub mod push_token;
pub mod rating;
pub mod recommendation;
pub mod report;
pub mod user;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use comment_vote::Entity as CommentVote;
pub use group::Entity as Group;
pub use membership::Entity as Membership;
pub use notification::Entity as Notification;
pub use push_token::Entity as PushToken;
pub use rating::Entity as Rating;
pub use recommendation::Entity as Recommendation;
pub use report::Entity as Report;
pub use user::Entity as User;
