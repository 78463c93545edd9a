// ABOUTME: Main library entry point for the corporate mentorship API
// ABOUTME: Training requests, mentor assignment, learning plans, and feedback over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Mentorship Server
//!
//! Backend for a corporate mentorship program. Employees submit training
//! requests, admins approve them and assign mentors with spare capacity, and
//! mentees work through a checklist plan until they complete the process with
//! feedback.
//!
//! ## Architecture
//!
//! - **routes**: thin axum handlers, one struct per domain
//! - **services**: business rules over the repository traits
//! - **database**: `SQLite` pool, migrations, repositories, transactions
//! - **auth**: HS256 tokens and bcrypt password hashing
//! - **metrics**: injected `MetricsSink` with a Prometheus renderer
//!
//! Domain types and errors live in the `mentorship-core` crate and are
//! re-exported here.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mentorship_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Mentorship server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Token issuing, validation, and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Connection pool, schema, repositories, and transactions
pub mod database;

/// Structured logging setup
pub mod logging;

/// Metrics sink trait and implementations
pub mod metrics;

/// Authentication, authorization, CORS, and request tracking middleware
pub mod middleware;

/// Shared server resources for dependency injection
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Domain services
pub mod services;

// Re-export core domain modules from mentorship-core

/// Error types and codes
pub use mentorship_core::errors;

/// Domain entities
pub use mentorship_core::models;

/// Domain limits and messages
pub use mentorship_core::constants;

/// Roles and access predicates
pub use mentorship_core::permissions;
