//! Notification service.
//!
//! In-app notifications are stored records. Device push goes through a
//! [`PushDispatcher`]; the transport itself lives outside this crate.

use async_trait::async_trait;
use chrono::Utc;
use recomate_common::config::NotificationsConfig;
use recomate_common::{AppResult, IdGenerator};
use recomate_db::entities::notification::{self, NotificationType};
use recomate_db::repositories::{NotificationRepository, UserRepository};
use sea_orm::Set;
use std::sync::Arc;

/// Sends a push message to one device token.
#[async_trait]
pub trait PushDispatcher: Send + Sync {
    async fn send(&self, token: &str, title: &str, body: &str) -> AppResult<()>;
}

/// Dispatcher that drops every message.
#[derive(Clone, Default)]
pub struct NoOpPushDispatcher;

#[async_trait]
impl PushDispatcher for NoOpPushDispatcher {
    async fn send(&self, _token: &str, _title: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }
}

pub type PushDispatcherService = Arc<dyn PushDispatcher>;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    dispatcher: PushDispatcherService,
    enabled: bool,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service with a no-op push dispatcher.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        config: &NotificationsConfig,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            dispatcher: Arc::new(NoOpPushDispatcher),
            enabled: config.enabled,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the push dispatcher.
    pub fn set_dispatcher(&mut self, dispatcher: PushDispatcherService) {
        self.dispatcher = dispatcher;
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an in-app notification. Returns `None` when notifications are off.
    pub async fn notify(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        notification_type: NotificationType,
        group_id: Option<&str>,
    ) -> AppResult<Option<notification::Model>> {
        if !self.enabled {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(title.to_string()),
            body: Set(body.to_string()),
            notification_type: Set(notification_type),
            group_id: Set(group_id.map(ToString::to_string)),
            created_at: Set(Utc::now().into()),
        };

        self.notification_repo.create(model).await.map(Some)
    }

    /// Fire-and-forget push to one token. Failures are logged only.
    pub async fn push(&self, token: &str, title: &str, body: &str) {
        if !self.enabled {
            return;
        }

        if let Err(e) = self.dispatcher.send(token, title, body).await {
            tracing::warn!(error = %e, "Failed to dispatch push notification");
        }
    }

    /// Push to the oldest registered token of a user, if any.
    pub async fn push_to_user(&self, user_id: &str, title: &str, body: &str) {
        if !self.enabled {
            return;
        }

        match self.user_repo.find_push_tokens(user_id).await {
            Ok(tokens) => {
                if let Some(first) = tokens.first() {
                    self.push(&first.token, title, body).await;
                } else {
                    tracing::debug!(user_id = user_id, "No push token registered");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = user_id, "Failed to load push tokens");
            }
        }
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<notification::Model>> {
        self.notification_repo.find_by_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use recomate_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Mutex;

    struct FailingDispatcher {
        attempts: Mutex<u32>,
    }

    #[async_trait]
    impl PushDispatcher for FailingDispatcher {
        async fn send(&self, _token: &str, _title: &str, _body: &str) -> AppResult<()> {
            *self.attempts.lock().unwrap() += 1;
            Err(AppError::ExternalService("push gateway down".to_string()))
        }
    }

    fn service(enabled: bool) -> NotificationService {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
            &NotificationsConfig { enabled },
        )
    }

    #[tokio::test]
    async fn test_push_failure_is_swallowed() {
        let dispatcher = Arc::new(FailingDispatcher {
            attempts: Mutex::new(0),
        });
        let mut service = service(true);
        service.set_dispatcher(dispatcher.clone());

        service.push("token-1", "Group Invitation", "hello").await;

        assert_eq!(*dispatcher.attempts.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_disabled_skips_everything() {
        let dispatcher = Arc::new(FailingDispatcher {
            attempts: Mutex::new(0),
        });
        let mut service = service(false);
        service.set_dispatcher(dispatcher.clone());

        service.push("token-1", "t", "b").await;
        let recorded = service
            .notify("user1", "t", "b", NotificationType::GroupInvite, None)
            .await
            .unwrap();

        assert!(recorded.is_none());
        assert_eq!(*dispatcher.attempts.lock().unwrap(), 0);
    }
}
