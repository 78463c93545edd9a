// ABOUTME: Bearer token authentication for HTTP handlers
// ABOUTME: Extracts the Authorization header, validates the JWT, and yields the caller identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{AuthManager, AuthResult};
use crate::errors::{AppError, AppResult};

/// Middleware for bearer token authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub fn new(auth_manager: Arc<AuthManager>) -> Self {
        Self { auth_manager }
    }

    /// Authenticate a request from its headers
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` without an Authorization header, otherwise the
    /// errors of [`Self::authenticate_request`]
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        self.authenticate_request(auth_header)
    }

    /// Authenticate a raw Authorization header value
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The header is missing (`AUTH_REQUIRED`)
    /// - The header is not `Bearer <token>` (`AUTH_INVALID`)
    /// - The token signature or algorithm is wrong (`AUTH_INVALID`)
    /// - The token has expired (`AUTH_EXPIRED`)
    #[tracing::instrument(
        skip(self, auth_header),
        fields(
            auth_method = tracing::field::Empty,
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let Some(header) = auth_header else {
            tracing::debug!("Authentication failed: missing authorization header");
            tracing::Span::current().record("success", false);
            return Err(AppError::auth_required());
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            tracing::Span::current()
                .record("auth_method", "INVALID")
                .record("success", false);
            tracing::warn!("Authentication failed: authorization header is not a bearer token");
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ));
        };

        tracing::Span::current().record("auth_method", "JWT_TOKEN");
        match self.auth_manager.authenticate(token.trim()) {
            Ok(result) => {
                tracing::Span::current()
                    .record("user_id", result.user_id.to_string())
                    .record("success", true);
                tracing::debug!(user_id = %result.user_id, "JWT authentication successful");
                Ok(result)
            }
            Err(e) => {
                tracing::Span::current().record("success", false);
                tracing::warn!("JWT authentication failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::User;
    use crate::permissions::UserRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn middleware() -> (AuthMiddleware, Arc<AuthManager>) {
        let manager = Arc::new(AuthManager::new(b"middleware-test-secret-of-32-bytes!", 1));
        (AuthMiddleware::new(manager.clone()), manager)
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ann".to_owned(),
            email: "ann@example.com".to_owned(),
            password_hash: String::new(),
            role: UserRole::Employee,
            department: None,
            job_title: None,
            telegram: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_header_requires_auth() {
        let (mw, _) = middleware();
        let err = mw.authenticate_request(None).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[test]
    fn test_non_bearer_header_is_invalid() {
        let (mw, _) = middleware();
        let err = mw.authenticate_request(Some("Basic abc")).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_valid_bearer_token() {
        let (mw, manager) = middleware();
        let user = user();
        let token = manager.generate_token(&user).unwrap();
        let auth = mw
            .authenticate_request(Some(&format!("Bearer {token}")))
            .unwrap();
        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.role, UserRole::Employee);
    }
}
