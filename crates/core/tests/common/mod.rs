//! Shared wiring for the service integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use recomate_common::Config;
use recomate_core::{
    CommentService, GroupService, MembershipService, NotificationService, PushDispatcherService,
    RatingService, RecommendationService, RegisterInput, ReportService, Session, UserService,
};
use recomate_db::entities::user;
use recomate_db::repositories::{
    CategoryRepository, CommentRepository, GroupRepository, MembershipRepository,
    NotificationRepository, RatingRepository, RecommendationRepository, ReportRepository,
    UserRepository,
};
use recomate_db::test_utils::{TestDatabase, test_config};

pub const ADMIN_EMAIL: &str = "mod@recomate.app";

/// Every service over one in-memory database.
pub struct App {
    pub db: TestDatabase,
    pub config: Config,
    pub users: UserService,
    pub groups: GroupService,
    pub memberships: MembershipService,
    pub recommendations: RecommendationService,
    pub ratings: RatingService,
    pub comments: CommentService,
    pub reports: ReportService,
    pub notifications: NotificationService,
}

impl App {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    pub async fn with_dispatcher(dispatcher: PushDispatcherService) -> Self {
        Self::build(Some(dispatcher)).await
    }

    async fn build(dispatcher: Option<PushDispatcherService>) -> Self {
        let db = TestDatabase::in_memory().await.unwrap();
        let config = test_config(&[ADMIN_EMAIL]);
        let conn = db.connection();

        let user_repo = UserRepository::new(Arc::clone(&conn));
        let group_repo = GroupRepository::new(Arc::clone(&conn));
        let category_repo = CategoryRepository::new(Arc::clone(&conn));
        let membership_repo = MembershipRepository::new(Arc::clone(&conn));
        let recommendation_repo = RecommendationRepository::new(Arc::clone(&conn));
        let rating_repo = RatingRepository::new(Arc::clone(&conn));
        let comment_repo = CommentRepository::new(Arc::clone(&conn));
        let report_repo = ReportRepository::new(Arc::clone(&conn));
        let notification_repo = NotificationRepository::new(Arc::clone(&conn));

        let mut notifications =
            NotificationService::new(notification_repo, user_repo.clone(), &config.notifications);
        if let Some(dispatcher) = dispatcher {
            notifications.set_dispatcher(dispatcher);
        }

        let groups = GroupService::new(
            group_repo.clone(),
            category_repo,
            membership_repo.clone(),
            recommendation_repo.clone(),
            rating_repo.clone(),
        );
        let memberships = MembershipService::new(
            membership_repo.clone(),
            group_repo,
            user_repo.clone(),
            groups.clone(),
            notifications.clone(),
        );
        let users = UserService::new(
            user_repo.clone(),
            membership_repo,
            recommendation_repo.clone(),
            rating_repo.clone(),
            &config.moderation,
        );
        let recommendations = RecommendationService::new(recommendation_repo, user_repo.clone());
        let ratings = RatingService::new(rating_repo);
        let comments = CommentService::new(comment_repo.clone(), user_repo.clone());
        let reports = ReportService::new(report_repo, user_repo, comment_repo);

        Self {
            db,
            config,
            users,
            groups,
            memberships,
            recommendations,
            ratings,
            comments,
            reports,
            notifications,
        }
    }

    /// Register a user and sign them in.
    pub async fn sign_up(&self, username: &str) -> (user::Model, Session) {
        self.sign_up_with_email(username, &format!("{username}@example.com"))
            .await
    }

    /// Register a global administrator and sign them in.
    pub async fn sign_up_admin(&self, username: &str) -> (user::Model, Session) {
        self.sign_up_with_email(username, ADMIN_EMAIL).await
    }

    async fn sign_up_with_email(&self, username: &str, email: &str) -> (user::Model, Session) {
        let user = self
            .users
            .register(RegisterInput {
                username: username.to_string(),
                email: email.to_string(),
                photo_url: None,
                bio: None,
            })
            .await
            .unwrap();
        let session = Session::signed_in(&user.id, &user.email, &self.config.moderation);
        (user, session)
    }
}
