// ABOUTME: Training request route handlers: submit, list, edit, review, and assign
// ABOUTME: Review and assignment are admin-only; reads and edits are owner-or-admin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{parse_id, JsonBody};
use crate::errors::AppError;
use crate::middleware::{require_admin, require_owner};
use crate::models::RequestStatus;
use crate::resources::ServerResources;

/// Body for creating or editing a request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    /// Requested topic
    pub topic: String,
    /// Free-text description
    pub description: String,
}

/// Body for assigning a mentor
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignBody {
    /// Mentor to assign
    pub mentor_id: String,
}

/// Query for the admin listing
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    /// Optional status filter
    pub status: Option<String>,
}

/// Training request routes implementation
pub struct RequestRoutes;

impl RequestRoutes {
    /// Create all training request routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/requests",
                post(Self::handle_create).get(Self::handle_list_all),
            )
            .route("/api/requests/my", get(Self::handle_list_mine))
            .route(
                "/api/requests/:id",
                get(Self::handle_get).put(Self::handle_update),
            )
            .route("/api/requests/:id/approve", post(Self::handle_approve))
            .route("/api/requests/:id/reject", post(Self::handle_reject))
            .route("/api/requests/:id/assign", post(Self::handle_assign))
            .with_state(resources)
    }

    /// Handle POST /api/requests
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<RequestBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let request = resources
            .services
            .requests
            .create(auth.user_id, &body.topic, &body.description)
            .await?;
        Ok((StatusCode::CREATED, Json(request)).into_response())
    }

    /// Handle GET /api/requests/my
    async fn handle_list_mine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let requests = resources
            .services
            .requests
            .list_for_user(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(requests)).into_response())
    }

    /// Handle GET /api/requests?status=
    async fn handle_list_all(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListRequestsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;

        let status = query
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(RequestStatus::parse)
            .transpose()?;
        let requests = resources.services.requests.list_all(status).await?;
        Ok((StatusCode::OK, Json(requests)).into_response())
    }

    /// Handle GET /api/requests/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let id = parse_id(&id, "Training request")?;

        let request = resources.services.requests.get(id).await?;
        require_owner(&auth, request.user_id)?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Handle PUT /api/requests/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<RequestBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let id = parse_id(&id, "Training request")?;

        let existing = resources.services.requests.get(id).await?;
        require_owner(&auth, existing.user_id)?;
        let request = resources
            .services
            .requests
            .update(id, &body.topic, &body.description)
            .await?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Handle POST /api/requests/:id/approve
    async fn handle_approve(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;
        let id = parse_id(&id, "Training request")?;

        let request = resources.services.requests.approve(id).await?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Handle POST /api/requests/:id/reject
    async fn handle_reject(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;
        let id = parse_id(&id, "Training request")?;

        let request = resources.services.requests.reject(id).await?;
        Ok((StatusCode::OK, Json(request)).into_response())
    }

    /// Handle POST /api/requests/:id/assign
    async fn handle_assign(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<AssignBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;
        let request_id = parse_id(&id, "Training request")?;
        if body.mentor_id.trim().is_empty() {
            return Err(AppError::missing_field("mentorId"));
        }
        let mentor_id = parse_id(&body.mentor_id, "Mentor")?;

        let learning = resources
            .services
            .learning
            .approve_and_assign(request_id, mentor_id)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }
}
