//! Actor context for service calls.

use recomate_common::config::ModerationConfig;
use recomate_common::{AppError, AppResult};

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub email: String,
    /// Listed in the moderation admin e-mails.
    pub is_admin: bool,
}

/// Who is calling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// Nobody is signed in.
    #[default]
    Anonymous,
    SignedIn(Actor),
}

impl Session {
    /// A session with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::Anonymous
    }

    /// A signed-in session. Global admin status comes from `moderation`.
    #[must_use]
    pub fn signed_in(
        user_id: impl Into<String>,
        email: impl Into<String>,
        moderation: &ModerationConfig,
    ) -> Self {
        let email = email.into();
        let is_admin = moderation.is_admin_email(&email);

        Self::SignedIn(Actor {
            user_id: user_id.into(),
            email,
            is_admin,
        })
    }

    /// The caller's user id, or `Unauthorized` when nobody is signed in.
    pub fn user_id(&self) -> AppResult<&str> {
        match self {
            Self::SignedIn(actor) => Ok(&actor.user_id),
            Self::Anonymous => Err(AppError::Unauthorized),
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::SignedIn(actor) => Some(&actor.email),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// Whether the caller is a global administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::SignedIn(actor) if actor.is_admin)
    }

    /// The caller's user id, provided they are a global administrator.
    pub fn require_admin(&self) -> AppResult<&str> {
        let user_id = self.user_id()?;
        if !self.is_admin() {
            return Err(AppError::PermissionDenied(
                "Administrator access required".to_string(),
            ));
        }
        Ok(user_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn moderation() -> ModerationConfig {
        ModerationConfig {
            admin_emails: vec!["root@recomate.app".to_string()],
            default_ban_days: 7,
        }
    }

    #[test]
    fn test_anonymous_has_no_user() {
        let session = Session::anonymous();
        assert!(matches!(session.user_id(), Err(AppError::Unauthorized)));
        assert!(!session.is_admin());
        assert!(session.email().is_none());
    }

    #[test]
    fn test_admin_from_config() {
        let admin = Session::signed_in("u1", "ROOT@recomate.app", &moderation());
        let user = Session::signed_in("u2", "bob@recomate.app", &moderation());

        assert!(admin.is_admin());
        assert_eq!(admin.require_admin().unwrap(), "u1");
        assert!(!user.is_admin());
        assert!(matches!(
            user.require_admin(),
            Err(AppError::PermissionDenied(_))
        ));
    }
}
