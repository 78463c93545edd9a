// ABOUTME: Mentor route handlers: directory reads for employees, CRUD for admins
// ABOUTME: PUT is a direct admin override that may set the workload counter

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{parse_id, JsonBody};
use crate::errors::AppError;
use crate::middleware::require_admin;
use crate::models::{MentorUpdate, NewMentor};
use crate::resources::ServerResources;

/// Query for the mentor listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMentorsQuery {
    /// Only mentors that can take another student
    pub available: Option<bool>,
    /// Optional workload ceiling
    pub max_workload: Option<i64>,
}

/// Mentor routes implementation
pub struct MentorRoutes;

impl MentorRoutes {
    /// Create all mentor routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/mentors",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/mentors/:id",
                get(Self::handle_get).put(Self::handle_update),
            )
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListMentorsQuery>,
    ) -> Result<Response, AppError> {
        resources.auth_middleware.authenticate_headers(&headers)?;

        let mentors = if query.available.unwrap_or(false) {
            resources.services.mentors.available().await?
        } else {
            resources.services.mentors.all(query.max_workload).await?
        };
        Ok((StatusCode::OK, Json(mentors)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources.auth_middleware.authenticate_headers(&headers)?;
        let id = parse_id(&id, "Mentor")?;

        let mentor = resources.services.mentors.get(id).await?;
        Ok((StatusCode::OK, Json(mentor)).into_response())
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<NewMentor>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;

        let mentor = resources.services.mentors.create(body).await?;
        Ok((StatusCode::CREATED, Json(mentor)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<MentorUpdate>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_headers(&headers)?;
        require_admin(&auth)?;
        let id = parse_id(&id, "Mentor")?;

        let mentor = resources.services.mentors.update(id, body).await?;
        Ok((StatusCode::OK, Json(mentor)).into_response())
    }
}
