// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database, services, auth, and seeded user/mentor/request helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::wildcard_in_or_patterns,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `mentorship_server`

use std::sync::{Arc, Once};

use anyhow::Result;
use mentorship_server::{
    auth::AuthManager,
    config::environment::{
        AuthConfig, DatabaseConfig, DatabaseUrl, Environment, HttpConfig, LogLevel, ServerConfig,
    },
    database::Database,
    metrics::{MetricsSink, RecordingMetrics},
    models::{Mentor, NewMentor, TrainingRequest, User},
    permissions::UserRole,
    resources::ServerResources,
    services::{RegisterInput, Services},
};

static INIT_LOGGER: Once = Once::new();

/// Secret used by every test auth manager
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// Password used for seeded users
pub const TEST_PASSWORD: &str = "password123";

/// Cheapest bcrypt cost accepted by the bcrypt crate
pub const TEST_BCRYPT_COST: u32 = 4;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::in_memory().await?)
}

/// Test database that records metrics
pub async fn create_test_database_with_metrics() -> Result<(Database, Arc<RecordingMetrics>)> {
    init_test_logging();
    let metrics = Arc::new(RecordingMetrics::new());
    let sink: Arc<dyn MetricsSink> = metrics.clone();
    let config = DatabaseConfig {
        url: DatabaseUrl::Memory,
        max_connections: 1,
        auto_migrate: true,
    };
    Ok((Database::new(&config, sink).await?, metrics))
}

/// Create test authentication manager with a cheap bcrypt cost
pub fn create_test_auth_manager() -> AuthManager {
    AuthManager::new(TEST_JWT_SECRET.as_bytes(), 24).with_bcrypt_cost(TEST_BCRYPT_COST)
}

/// Services over a fresh in-memory database
pub async fn create_test_services() -> Result<(Database, Services)> {
    let database = create_test_database().await?;
    let services = Services::new(&database, Arc::new(create_test_auth_manager()));
    Ok((database, services))
}

/// Configuration matching the in-memory test setup
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        host: "127.0.0.1".to_owned(),
        log_level: LogLevel::Warn,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: DatabaseUrl::Memory,
            max_connections: 1,
            auto_migrate: true,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_owned(),
            token_ttl_hours: 24,
        },
        http: HttpConfig {
            cors_allowed_origins: vec!["*".to_owned()],
            request_timeout_secs: 30,
        },
    }
}

/// Full server resources over a fresh in-memory database with recording metrics
pub async fn create_test_server_resources() -> Result<Arc<ServerResources>> {
    let (database, _) = create_test_database_with_metrics().await?;
    Ok(Arc::new(ServerResources::new(
        database,
        create_test_auth_manager(),
        Arc::new(test_config()),
    )))
}

/// Registration input with the standard test password
pub fn register_input(name: &str, email: &str, role: UserRole) -> RegisterInput {
    RegisterInput {
        name: name.to_owned(),
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        role: Some(role.as_str().to_owned()),
        department: Some("Engineering".to_owned()),
        job_title: Some("Developer".to_owned()),
        telegram: None,
    }
}

/// Register an employee
pub async fn create_test_user(services: &Services, email: &str) -> Result<User> {
    Ok(services
        .auth
        .register(register_input("Test User", email, UserRole::Employee))
        .await?)
}

/// Register an admin
pub async fn create_test_admin(services: &Services, email: &str) -> Result<User> {
    Ok(services
        .auth
        .register(register_input("Test Admin", email, UserRole::Admin))
        .await?)
}

/// Create a mentor with zero workload
pub async fn create_test_mentor(services: &Services, name: &str) -> Result<Mentor> {
    Ok(services
        .mentors
        .create(NewMentor {
            name: name.to_owned(),
            job_title: "Senior Engineer".to_owned(),
            experience: Some("10 years".to_owned()),
            email: format!("{}@mentors.example.com", name.to_lowercase()),
            telegram: Some(format!("@{}", name.to_lowercase())),
        })
        .await?)
}

/// Create a pending request for `user`
pub async fn create_test_request(services: &Services, user: &User) -> Result<TrainingRequest> {
    Ok(services
        .requests
        .create(user.id, "Go", "basics")
        .await?)
}
