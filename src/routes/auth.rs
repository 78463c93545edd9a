// ABOUTME: Authentication route handlers: register, login, and the caller's profile
// ABOUTME: Login failures are indistinguishable between unknown email and wrong password
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes
//!
//! `register` and `login` are public; `me` requires a bearer token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::JsonBody;
use crate::errors::AppError;
use crate::models::UserProfileUpdate;
use crate::resources::ServerResources;
use crate::services::RegisterInput;

/// Login request payload
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route(
                "/api/auth/me",
                get(Self::handle_get_me).put(Self::handle_update_me),
            )
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(body): JsonBody<RegisterInput>,
    ) -> Result<Response, AppError> {
        let user = resources.services.auth.register(body).await?;
        Ok((StatusCode::CREATED, Json(user)).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(body): JsonBody<LoginRequest>,
    ) -> Result<Response, AppError> {
        let login = resources
            .services
            .auth
            .login(&body.email, &body.password)
            .await?;
        Ok((StatusCode::OK, Json(login)).into_response())
    }

    /// Handle GET /api/auth/me
    async fn handle_get_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let user = resources.services.auth.get_user(auth.user_id).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle PUT /api/auth/me
    async fn handle_update_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<UserProfileUpdate>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let user = resources
            .services
            .auth
            .update_profile(auth.user_id, body)
            .await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }
}
