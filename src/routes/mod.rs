// ABOUTME: Route module organization for the mentorship HTTP API
// ABOUTME: One route struct per domain, each with thin handlers that delegate to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the mentorship server
//!
//! Each domain module contains only route definitions and thin handler
//! functions. Handlers authenticate, authorize, call one service method, and
//! return JSON; every failure is an [`AppError`] rendered by its
//! `IntoResponse` impl.

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Registration, login, and the caller's own profile
pub mod auth;
/// Liveness endpoint
pub mod health;
/// Learning processes, plans, notes, and completion
pub mod learnings;
/// Mentor directory and admin mentor management
pub mod mentors;
/// Prometheus exposition
pub mod metrics;
/// Training requests and their review
pub mod requests;
/// Admin user management
pub mod users;

/// Authentication route handlers
pub use auth::AuthRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Learning process route handlers
pub use learnings::LearningRoutes;
/// Mentor route handlers
pub use mentors::MentorRoutes;
/// Metrics route handlers
pub use metrics::MetricsRoutes;
/// Training request route handlers
pub use requests::RequestRoutes;
/// User administration route handlers
pub use users::UserRoutes;

/// JSON request body; malformed or mistyped bodies become `INVALID_INPUT`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Parse a path id; anything that is not a UUID cannot name a stored resource
pub(crate) fn parse_id(raw: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::not_found(resource).with_resource_id(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Mentor").unwrap(), id);
        let err = parse_id("not-a-uuid", "Mentor").unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }
}
