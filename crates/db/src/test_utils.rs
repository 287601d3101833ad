//! Test utilities for database operations.
//!
//! Provides an in-memory SQLite database with the full schema applied.
//! Connecting requires the `sqlx-sqlite` feature of sea-orm, which the
//! `test-utils` feature turns on.

use std::sync::Arc;
use std::time::Duration;

use recomate_common::config::{Config, DatabaseConfig, ModerationConfig, NotificationsConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// URL of a private in-memory SQLite database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated, throwaway database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    ///
    /// The pool is pinned to a single long-lived connection, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(IN_MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(3600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the shared database connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }
}

/// Configuration pointing at the in-memory database with the given global admins.
#[must_use]
pub fn test_config(admin_emails: &[&str]) -> Config {
    Config {
        database: DatabaseConfig {
            url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        moderation: ModerationConfig {
            admin_emails: admin_emails.iter().map(ToString::to_string).collect(),
            default_ban_days: 7,
        },
        notifications: NotificationsConfig { enabled: true },
    }
}
