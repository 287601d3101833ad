//! Repository tests against a migrated in-memory SQLite database.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use recomate_common::AppError;
use recomate_db::entities::membership::MemberRole;
use recomate_db::entities::user::UserStatus;
use recomate_db::entities::{category, group, membership, push_token, rating, user};
use recomate_db::repositories::{
    CategoryRepository, GroupRepository, MembershipRepository, RatingRepository, UserRepository,
};
use recomate_db::test_utils::TestDatabase;
use sea_orm::Set;

fn user_model(id: &str, username: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        username_lower: Set(username.to_lowercase()),
        email: Set(format!("{id}@example.com")),
        status: Set(UserStatus::Active),
        banned_until: Set(None),
        photo_url: Set(None),
        bio: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
async fn test_username_lookup_is_case_insensitive() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());

    users.create(user_model("u1", "Alice")).await.unwrap();

    assert!(users.username_exists("alice").await.unwrap());
    assert!(users.username_exists("ALICE").await.unwrap());
    assert!(!users.username_exists("bob").await.unwrap());
    assert_eq!(
        users.find_by_username("Alice").await.unwrap().unwrap().id,
        "u1"
    );
}

#[tokio::test]
async fn test_ban_merges_only_status_fields() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());

    let mut model = user_model("u1", "alice");
    model.bio = Set(Some("likes ramen".to_string()));
    users.create(model).await.unwrap();
    users.create(user_model("u2", "bob")).await.unwrap();

    let until = Utc::now() + Duration::days(7);
    let updated = users
        .set_status_many(
            &["u1".to_string(), "missing".to_string()],
            UserStatus::Banned,
            Some(until.into()),
        )
        .await
        .unwrap();

    assert_eq!(updated, 1);
    let alice = users.get_by_id("u1").await.unwrap();
    assert_eq!(alice.status, UserStatus::Banned);
    assert!(alice.banned_until.is_some());
    assert_eq!(alice.bio.as_deref(), Some("likes ramen"));
    assert_eq!(
        users.get_by_id("u2").await.unwrap().status,
        UserStatus::Active
    );
}

#[tokio::test]
async fn test_push_tokens_removed_with_user() {
    let db = TestDatabase::in_memory().await.unwrap();
    let users = UserRepository::new(db.connection());

    users.create(user_model("u1", "alice")).await.unwrap();
    for (id, token) in [("t1", "ExponentPushToken[a]"), ("t2", "ExponentPushToken[b]")] {
        users
            .add_push_token(push_token::ActiveModel {
                id: Set(id.to_string()),
                user_id: Set("u1".to_string()),
                token: Set(token.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();
    }

    let tokens = users.find_push_tokens("u1").await.unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].token, "ExponentPushToken[a]");

    users.delete("u1").await.unwrap();

    assert!(users.find_by_id("u1").await.unwrap().is_none());
    assert!(users.find_push_tokens("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_group_batch_delete_leaves_other_groups() {
    let db = TestDatabase::in_memory().await.unwrap();
    let groups = GroupRepository::new(db.connection());
    let categories = CategoryRepository::new(db.connection());
    let memberships = MembershipRepository::new(db.connection());
    let now = Utc::now();

    for id in ["g1", "g2"] {
        groups
            .create(group::ActiveModel {
                id: Set(id.to_string()),
                name: Set(format!("group {id}")),
                description: Set(String::new()),
                created_by: Set("u1".to_string()),
                created_at: Set(now.into()),
            })
            .await
            .unwrap();
        memberships
            .create(membership::ActiveModel {
                id: Set(format!("m-{id}")),
                group_id: Set(id.to_string()),
                user_id: Set("u1".to_string()),
                role: Set(MemberRole::Admin),
                created_at: Set(now.into()),
            })
            .await
            .unwrap();
        categories
            .create(category::ActiveModel {
                id: Set(format!("c-{id}")),
                name: Set("Food".to_string()),
                group_id: Set(id.to_string()),
                created_at: Set(now.into()),
            })
            .await
            .unwrap();
    }

    let deleted = groups
        .delete_with_members_and_categories("g1", &["m-g1".to_string()], &["c-g1".to_string()])
        .await
        .unwrap();

    assert_eq!(deleted.memberships, 1);
    assert_eq!(deleted.categories, 1);
    assert_eq!(deleted.groups, 1);
    assert!(groups.find_by_id("g1").await.unwrap().is_none());
    assert!(memberships.find_by_group("g1").await.unwrap().is_empty());
    assert!(categories.find_by_group("g1").await.unwrap().is_empty());

    assert!(groups.find_by_id("g2").await.unwrap().is_some());
    assert_eq!(memberships.find_by_group("g2").await.unwrap().len(), 1);
    assert_eq!(categories.find_by_group("g2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_set_role_is_a_merge() {
    let db = TestDatabase::in_memory().await.unwrap();
    let memberships = MembershipRepository::new(db.connection());

    let created = memberships
        .create(membership::ActiveModel {
            id: Set("m1".to_string()),
            group_id: Set("g1".to_string()),
            user_id: Set("u2".to_string()),
            role: Set(MemberRole::Member),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let promoted = memberships
        .set_role(created.clone(), MemberRole::Admin)
        .await
        .unwrap();

    assert_eq!(promoted.role, MemberRole::Admin);
    assert_eq!(promoted.user_id, created.user_id);
    assert_eq!(promoted.group_id, created.group_id);
}

fn rating_model(
    id: &str,
    recommendation_id: &str,
    user_id: &str,
    score: i32,
) -> rating::ActiveModel {
    rating::ActiveModel {
        id: Set(id.to_string()),
        recommendation_id: Set(recommendation_id.to_string()),
        user_id: Set(user_id.to_string()),
        rating: Set(score),
        comment: Set(String::new()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
async fn test_second_rating_for_same_user_is_rejected() {
    let db = TestDatabase::in_memory().await.unwrap();
    let ratings = RatingRepository::new(db.connection());

    ratings.create(rating_model("r1", "rec1", "u1", 4)).await.unwrap();
    ratings.create(rating_model("r2", "rec1", "u2", 2)).await.unwrap();

    let duplicate = ratings.create(rating_model("r3", "rec1", "u1", 5)).await;

    assert!(matches!(duplicate, Err(AppError::Database(_))));
    assert_eq!(ratings.find_by_recommendation("rec1").await.unwrap().len(), 2);
}
