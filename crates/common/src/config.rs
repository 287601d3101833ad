//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Moderation configuration.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Moderation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// E-mail addresses of global administrators.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    /// Ban length used when an administrator does not pick one.
    #[serde(default = "default_ban_days")]
    pub default_ban_days: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            admin_emails: Vec::new(),
            default_ban_days: default_ban_days(),
        }
    }
}

impl ModerationConfig {
    /// Whether `email` belongs to a global administrator.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        !email.is_empty()
            && self
                .admin_emails
                .iter()
                .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Whether in-app notifications and push dispatch are enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_ban_days() -> u32 {
    7
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` in the working directory (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `RECOMATE_ENV`)
    /// 4. Environment variables with `RECOMATE__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("RECOMATE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RECOMATE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("moderation.admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("RECOMATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
