// ABOUTME: Centralized resource container for dependency injection in the HTTP server
// ABOUTME: Holds the database, auth manager, services, metrics sink, and configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server Resources Module
//!
// NOTE: All `.clone()` calls in this file are Safe - they share Arc handles
// (database pool, auth manager, metrics sink) across the services.
//!
//! Every route handler receives `State<Arc<ServerResources>>`; nothing is
//! rebuilt per request.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::metrics::MetricsSink;
use crate::middleware::AuthMiddleware;
use crate::services::Services;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Connection pool and migrations
    pub database: Database,
    /// Token issuer and password hasher
    pub auth_manager: Arc<AuthManager>,
    /// Bearer token extraction for handlers
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Domain services
    pub services: Arc<Services>,
    /// Metrics sink shared with the database layer
    pub metrics: Arc<dyn MetricsSink>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire the services over an already-connected database
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        let auth_manager = Arc::new(auth_manager);
        let auth_middleware = Arc::new(AuthMiddleware::new(auth_manager.clone()));
        let services = Arc::new(Services::new(&database, auth_manager.clone()));
        let metrics = database.metrics().clone();

        Self {
            database,
            auth_manager,
            auth_middleware,
            services,
            metrics,
            config,
        }
    }

    /// Connect the database described by `config` and wire everything over it
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_config(
        config: ServerConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> AppResult<Self> {
        let database = Database::new(&config.database, metrics).await?;
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl_hours,
        );
        Ok(Self::new(database, auth_manager, Arc::new(config)))
    }
}
