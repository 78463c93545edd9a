// ABOUTME: Admin user management route handlers
// ABOUTME: List, inspect, and edit users (role included) plus their requests and learnings

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{parse_id, JsonBody};
use crate::errors::{AppError, AppResult};
use crate::middleware::require_admin;
use crate::models::UserProfileUpdate;
use crate::resources::ServerResources;

/// User administration routes implementation
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user administration routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::handle_list))
            .route(
                "/api/users/:id",
                get(Self::handle_get).put(Self::handle_update),
            )
            .route("/api/users/:id/requests", get(Self::handle_requests))
            .route("/api/users/:id/learnings", get(Self::handle_learnings))
            .with_state(resources)
    }

    fn admin_target(
        resources: &ServerResources,
        headers: &HeaderMap,
        raw_id: Option<&str>,
    ) -> AppResult<Option<Uuid>> {
        let auth = resources.auth_middleware.authenticate_headers(headers)?;
        require_admin(&auth)?;
        raw_id.map(|raw| parse_id(raw, "User")).transpose()
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::admin_target(&resources, &headers, None)?;
        let users = resources.services.auth.list_users().await?;
        Ok((StatusCode::OK, Json(users)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = Self::admin_target(&resources, &headers, Some(&id))?
            .ok_or_else(|| AppError::not_found("User"))?;
        let user = resources.services.auth.get_user(id).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<UserProfileUpdate>,
    ) -> Result<Response, AppError> {
        let id = Self::admin_target(&resources, &headers, Some(&id))?
            .ok_or_else(|| AppError::not_found("User"))?;
        let user = resources.services.auth.admin_update_user(id, body).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    async fn handle_requests(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = Self::admin_target(&resources, &headers, Some(&id))?
            .ok_or_else(|| AppError::not_found("User"))?;
        let requests = resources.services.requests.list_for_user(id).await?;
        Ok((StatusCode::OK, Json(requests)).into_response())
    }

    async fn handle_learnings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = Self::admin_target(&resources, &headers, Some(&id))?
            .ok_or_else(|| AppError::not_found("User"))?;
        let learnings = resources.services.learning.user_learnings(id).await?;
        Ok((StatusCode::OK, Json(learnings)).into_response())
    }
}
