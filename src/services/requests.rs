// ABOUTME: Training request lifecycle: create, review, edit, and list
// ABOUTME: Review transitions are checked on the model and re-checked by a guarded UPDATE
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use uuid::Uuid;

use crate::database::repositories::{RequestRepository, UserRepository};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{RequestStatus, TrainingRequest};

/// Training request service
pub struct RequestService {
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
}

impl RequestService {
    /// Create the service
    #[must_use]
    pub fn new(requests: Arc<dyn RequestRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { requests, users }
    }

    /// Submit a new pending request for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` for blank input, `RESOURCE_NOT_FOUND` for an unknown user
    pub async fn create(
        &self,
        user_id: Uuid,
        topic: &str,
        description: &str,
    ) -> AppResult<TrainingRequest> {
        let request = TrainingRequest::new(user_id, topic, description)?;
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found("User").with_resource_id(user_id.to_string()));
        }
        self.requests.create(&request).await?;
        AppLogger::log_lifecycle_event("training_request", &request.id.to_string(), "created");
        Ok(request)
    }

    /// Fetch one request
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn get(&self, id: Uuid) -> AppResult<TrainingRequest> {
        self.requests
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Training request").with_resource_id(id.to_string()))
    }

    /// Requests of one user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<TrainingRequest>> {
        self.requests.list_by_user(user_id).await
    }

    /// All requests, newest first, optionally filtered
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_all(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>> {
        self.requests.list(status).await
    }

    /// pending -> approved
    ///
    /// # Errors
    ///
    /// Returns `REQUEST_ALREADY_APPROVED` or `INVALID_STATE_TRANSITION`; the stored status is
    /// unchanged
    pub async fn approve(&self, id: Uuid) -> AppResult<TrainingRequest> {
        let mut request = self.get(id).await?;
        request.approve()?;
        self.requests
            .transition_from_pending(id, RequestStatus::Approved)
            .await?;
        AppLogger::log_lifecycle_event("training_request", &id.to_string(), "approved");
        Ok(request)
    }

    /// pending -> rejected
    ///
    /// # Errors
    ///
    /// Returns `REQUEST_ALREADY_REJECTED` or `INVALID_STATE_TRANSITION`; the stored status is
    /// unchanged
    pub async fn reject(&self, id: Uuid) -> AppResult<TrainingRequest> {
        let mut request = self.get(id).await?;
        request.reject()?;
        self.requests
            .transition_from_pending(id, RequestStatus::Rejected)
            .await?;
        AppLogger::log_lifecycle_event("training_request", &id.to_string(), "rejected");
        Ok(request)
    }

    /// Replace topic and description in any status
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` or `MISSING_REQUIRED_FIELD`
    pub async fn update(
        &self,
        id: Uuid,
        topic: &str,
        description: &str,
    ) -> AppResult<TrainingRequest> {
        let mut request = self.get(id).await?;
        request.update_content(topic, description)?;
        self.requests.update_content(&request).await?;
        Ok(request)
    }
}
