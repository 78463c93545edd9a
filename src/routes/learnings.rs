// ABOUTME: Learning process route handlers: detail view, plan items, notes, and completion
// ABOUTME: The mentee or an admin may act on a process; the full overwrite is admin-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Learning process routes
//!
//! Every per-process route loads the process first to check ownership, then
//! calls the service. Mutations on a completed process fail with
//! `LEARNING_NOT_ACTIVE` (400).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_id, JsonBody};
use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::middleware::{require_admin, require_owner};
use crate::models::{LearningOverride, PlanItem};
use crate::resources::ServerResources;

/// Body for adding a plan item
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddPlanItemBody {
    /// Item text
    pub text: String,
}

/// Body for updating a plan item
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePlanItemBody {
    /// New text; blank keeps the current text
    pub text: Option<String>,
    /// Completion flag
    pub completed: bool,
}

/// Body for replacing the whole plan
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplacePlanBody {
    /// Replacement items
    pub plan: Vec<PlanItem>,
}

/// Body for setting notes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotesBody {
    /// New notes; blank clears them
    pub notes: Option<String>,
}

/// Body for completing a process
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompleteBody {
    /// Rating in `1..=5`
    pub rating: i64,
    /// Feedback comment
    pub comment: String,
}

/// Learning process routes implementation
pub struct LearningRoutes;

impl LearningRoutes {
    /// Create all learning process routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/learnings", get(Self::handle_list_mine))
            .route(
                "/api/learnings/:id",
                get(Self::handle_get).put(Self::handle_admin_update),
            )
            .route("/api/learnings/:id/progress", get(Self::handle_progress))
            .route(
                "/api/learnings/:id/plan",
                post(Self::handle_add_item).put(Self::handle_replace_plan),
            )
            .route(
                "/api/learnings/:id/plan/:item_id",
                put(Self::handle_update_item).delete(Self::handle_remove_item),
            )
            .route(
                "/api/learnings/:id/plan/:item_id/toggle",
                patch(Self::handle_toggle_item),
            )
            .route("/api/learnings/:id/notes", put(Self::handle_notes))
            .route("/api/learnings/:id/complete", post(Self::handle_complete))
            .with_state(resources)
    }

    /// Authenticate, parse the id, and check the caller is the mentee or an admin
    async fn authorize(
        resources: &ServerResources,
        headers: &HeaderMap,
        raw_id: &str,
    ) -> AppResult<(AuthResult, Uuid)> {
        let auth = resources.auth_middleware.authenticate_headers(headers)?;
        let id = parse_id(raw_id, "Learning process")?;
        let learning = resources.services.learning.get(id).await?;
        require_owner(&auth, learning.user_id)?;
        Ok((auth, id))
    }

    fn parse_item_id(raw: &str) -> AppResult<u8> {
        raw.trim()
            .parse()
            .map_err(|_| AppError::invalid_input(format!("invalid plan item id '{raw}'")))
    }

    /// Handle GET /api/learnings - the caller's own processes
    async fn handle_list_mine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let learnings = resources
            .services
            .learning
            .user_learnings(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(learnings)).into_response())
    }

    /// Handle GET /api/learnings/:id - detailed view
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        let id = parse_id(&id, "Learning process")?;

        let details = resources.services.learning.get_details(id).await?;
        require_owner(&auth, details.learning.user_id)?;
        Ok((StatusCode::OK, Json(details)).into_response())
    }

    /// Handle GET /api/learnings/:id/progress
    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let progress = resources.services.learning.progress(id).await?;
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "progress": progress })),
        )
            .into_response())
    }

    /// Handle POST /api/learnings/:id/plan
    async fn handle_add_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<AddPlanItemBody>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let learning = resources
            .services
            .learning
            .add_plan_item(id, &body.text)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle PUT /api/learnings/:id/plan
    async fn handle_replace_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<ReplacePlanBody>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let learning = resources.services.learning.update_plan(id, body.plan).await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle PUT /api/learnings/:id/plan/:item_id
    async fn handle_update_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, item_id)): Path<(String, String)>,
        JsonBody(body): JsonBody<UpdatePlanItemBody>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let item_id = Self::parse_item_id(&item_id)?;
        let learning = resources
            .services
            .learning
            .update_plan_item(id, item_id, body.text.as_deref(), body.completed)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle PATCH /api/learnings/:id/plan/:item_id/toggle
    async fn handle_toggle_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, item_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let item_id = Self::parse_item_id(&item_id)?;
        let learning = resources
            .services
            .learning
            .toggle_plan_item(id, item_id)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle DELETE /api/learnings/:id/plan/:item_id
    async fn handle_remove_item(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, item_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let item_id = Self::parse_item_id(&item_id)?;
        let learning = resources
            .services
            .learning
            .remove_plan_item(id, item_id)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle PUT /api/learnings/:id/notes
    async fn handle_notes(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<NotesBody>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let learning = resources
            .services
            .learning
            .update_notes(id, body.notes)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle POST /api/learnings/:id/complete
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<CompleteBody>,
    ) -> Result<Response, AppError> {
        let (_, id) = Self::authorize(&resources, &headers, &id).await?;
        let learning = resources
            .services
            .learning
            .complete(id, body.rating, &body.comment)
            .await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }

    /// Handle PUT /api/learnings/:id - admin override
    async fn handle_admin_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<LearningOverride>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;
        let id = parse_id(&id, "Learning process")?;

        let learning = resources.services.learning.admin_update(id, body).await?;
        Ok((StatusCode::OK, Json(learning)).into_response())
    }
}
