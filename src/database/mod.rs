// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! Connection pooling and schema migrations for the `SQLite` store, plus the
//! shared row helpers used by the repository implementations.

/// Repository traits and their `SQLite` implementations
pub mod repositories;
/// Transaction guard and retry helper
pub mod transactions;

use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};
use crate::metrics::{MetricsSink, NoopMetrics};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database manager: connection pool plus the metrics sink for query timing
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    metrics: Arc<dyn MetricsSink>,
}

impl Database {
    /// Connect, and migrate when `auto_migrate` is set
    ///
    /// In-memory databases use a single long-lived connection so every query
    /// sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails
    pub async fn new(config: &DatabaseConfig, metrics: Arc<dyn MetricsSink>) -> AppResult<Self> {
        let pool = match &config.url {
            DatabaseUrl::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to open in-memory database: {e}"))
                })?,
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
                    .map_err(|e| AppError::database(format!("Invalid database URL: {e}")))?
                    .create_if_missing(true)
                    .foreign_keys(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(BUSY_TIMEOUT);
                SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(options)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?
            }
        };

        let db = Self { pool, metrics };
        if config.auto_migrate {
            db.migrate().await?;
        }
        info!(url = %config.url, "Database ready");
        Ok(db)
    }

    /// Fresh migrated in-memory database with metrics disabled
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails
    pub async fn in_memory() -> AppResult<Self> {
        let config = DatabaseConfig {
            url: DatabaseUrl::Memory,
            max_connections: 1,
            auto_migrate: true,
        };
        Self::new(&config, Arc::new(NoopMetrics)).await
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Metrics sink shared with the repositories
    #[must_use]
    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    /// Record timing and outcome of one repository operation
    pub fn observe<T>(&self, operation: &str, started: Instant, result: &AppResult<T>) {
        self.metrics
            .record_db_query(operation, result.is_ok(), started.elapsed());
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_mentors().await?;
        self.migrate_training_requests().await?;
        self.migrate_learning_processes().await?;
        debug!("Database migrations applied");
        Ok(())
    }

    async fn run_ddl(&self, statement: &str) -> AppResult<()> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    async fn migrate_users(&self) -> AppResult<()> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'employee' CHECK (role IN ('employee', 'admin')),
                department TEXT,
                job_title TEXT,
                telegram TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await
    }

    async fn migrate_mentors(&self) -> AppResult<()> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS mentors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                job_title TEXT NOT NULL,
                experience TEXT,
                workload INTEGER NOT NULL DEFAULT 0 CHECK (workload BETWEEN 0 AND 5),
                email TEXT NOT NULL,
                telegram TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl("CREATE INDEX IF NOT EXISTS idx_mentors_workload ON mentors(workload, name)")
            .await
    }

    async fn migrate_training_requests(&self) -> AppResult<()> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS training_requests (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                topic TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'approved', 'rejected')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_training_requests_user ON training_requests(user_id)",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_training_requests_status ON training_requests(status)",
        )
        .await
    }

    async fn migrate_learning_processes(&self) -> AppResult<()> {
        self.run_ddl(
            r"
            CREATE TABLE IF NOT EXISTS learning_processes (
                id TEXT PRIMARY KEY,
                request_id TEXT NOT NULL UNIQUE REFERENCES training_requests(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                mentor_id TEXT NOT NULL REFERENCES mentors(id),
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'completed')),
                start_date TEXT NOT NULL,
                end_date TEXT,
                plan TEXT NOT NULL DEFAULT '[]',
                feedback_rating INTEGER CHECK (feedback_rating BETWEEN 1 AND 5),
                feedback_comment TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_learning_processes_user ON learning_processes(user_id)",
        )
        .await?;
        self.run_ddl(
            "CREATE INDEX IF NOT EXISTS idx_learning_processes_mentor \
             ON learning_processes(mentor_id)",
        )
        .await
    }
}

/// Canonical timestamp encoding: fixed-width RFC 3339 so text order is time order
#[must_use]
pub fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns an internal error for malformed values
pub fn decode_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{value}': {e}")))
}

/// Parse a stored UUID
///
/// # Errors
///
/// Returns an internal error for malformed values
pub fn decode_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

/// Whether an error is a UNIQUE constraint violation
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
