// ABOUTME: Learning process lifecycle: mentor assignment, plan and notes edits, completion
// ABOUTME: Assignment and completion persist as single transactions with guarded workload updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Learning Service
//!
//! ```text
//! approved request + mentor with capacity --assign--> active --complete--> completed
//! ```
//!
//! Every plan or notes mutation loads the process, applies the change through
//! [`LearningProcess`] (which rejects anything on a completed process), and
//! writes back with an UPDATE guarded on `status = 'active'`. A process that
//! completes between the load and the write therefore still fails with
//! `LEARNING_NOT_ACTIVE`.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::messages;
use crate::database::repositories::{LearningRepository, MentorRepository, RequestRepository};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{LearningDetails, LearningOverride, LearningProcess, PlanItem, RequestStatus};

/// Learning process service
pub struct LearningService {
    learnings: Arc<dyn LearningRepository>,
    requests: Arc<dyn RequestRepository>,
    mentors: Arc<dyn MentorRepository>,
}

impl LearningService {
    /// Create the service
    #[must_use]
    pub fn new(
        learnings: Arc<dyn LearningRepository>,
        requests: Arc<dyn RequestRepository>,
        mentors: Arc<dyn MentorRepository>,
    ) -> Self {
        Self {
            learnings,
            requests,
            mentors,
        }
    }

    /// Start a learning process for an approved request
    ///
    /// # Errors
    ///
    /// Returns `INVALID_STATE_TRANSITION` unless the request is approved, plus
    /// every error of the shared assignment path
    pub async fn assign_mentor(
        &self,
        request_id: Uuid,
        mentor_id: Uuid,
    ) -> AppResult<LearningProcess> {
        self.assign(request_id, mentor_id, false).await
    }

    /// Approve a pending request (if needed) and assign a mentor in one transaction
    ///
    /// # Errors
    ///
    /// Returns `INVALID_STATE_TRANSITION` for a rejected request, plus every
    /// error of the shared assignment path
    pub async fn approve_and_assign(
        &self,
        request_id: Uuid,
        mentor_id: Uuid,
    ) -> AppResult<LearningProcess> {
        self.assign(request_id, mentor_id, true).await
    }

    async fn assign(
        &self,
        request_id: Uuid,
        mentor_id: Uuid,
        allow_pending: bool,
    ) -> AppResult<LearningProcess> {
        let mut request = self.requests.get_by_id(request_id).await?.ok_or_else(|| {
            AppError::not_found("Training request").with_resource_id(request_id.to_string())
        })?;

        let approve_request = match request.status {
            RequestStatus::Approved => false,
            RequestStatus::Pending if allow_pending => {
                request.approve()?;
                true
            }
            RequestStatus::Pending => {
                return Err(AppError::invalid_transition(messages::REQUEST_NOT_APPROVED));
            }
            RequestStatus::Rejected if allow_pending => {
                return Err(AppError::invalid_transition(messages::CANNOT_APPROVE_REJECTED));
            }
            RequestStatus::Rejected => {
                return Err(AppError::invalid_transition(messages::REQUEST_NOT_APPROVED));
            }
        };

        let mentor = self.mentors.get_by_id(mentor_id).await?.ok_or_else(|| {
            AppError::not_found("Mentor").with_resource_id(mentor_id.to_string())
        })?;
        if !mentor.can_take_student() {
            return Err(AppError::mentor_not_available());
        }

        if self.learnings.get_by_request_id(request_id).await?.is_some() {
            return Err(AppError::learning_already_exists());
        }

        let learning = LearningProcess::start(request.id, request.user_id, mentor.id);
        let workload = self
            .learnings
            .create_with_assignment(&learning, approve_request)
            .await?;

        info!(
            learning_id = %learning.id,
            request_id = %request_id,
            mentor_id = %mentor_id,
            mentor_workload = workload,
            approved_now = approve_request,
            "Mentor assigned"
        );
        AppLogger::log_lifecycle_event("learning_process", &learning.id.to_string(), "started");
        Ok(learning)
    }

    /// Fetch one process
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn get(&self, id: Uuid) -> AppResult<LearningProcess> {
        self.learnings
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Learning process").with_resource_id(id.to_string()))
    }

    /// Detailed view with request, mentee, and mentor summaries
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn get_details(&self, id: Uuid) -> AppResult<LearningDetails> {
        self.learnings
            .get_details(id)
            .await?
            .ok_or_else(|| AppError::not_found("Learning process").with_resource_id(id.to_string()))
    }

    /// Processes of one mentee
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn user_learnings(&self, user_id: Uuid) -> AppResult<Vec<LearningDetails>> {
        self.learnings.list_details_by_user(user_id).await
    }

    /// Processes of one mentor
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn mentor_learnings(&self, mentor_id: Uuid) -> AppResult<Vec<LearningDetails>> {
        self.learnings.list_details_by_mentor(mentor_id).await
    }

    /// Percentage of completed plan items
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn progress(&self, id: Uuid) -> AppResult<f64> {
        Ok(self.get(id).await?.progress())
    }

    async fn mutate_plan<T>(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut LearningProcess) -> AppResult<T>,
    ) -> AppResult<LearningProcess> {
        let mut learning = self.get(id).await?;
        change(&mut learning)?;
        self.learnings.update_plan(id, &learning.plan).await?;
        Ok(learning)
    }

    /// Append an item with id one past the current maximum
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE`, `MISSING_REQUIRED_FIELD`, or `PLAN_LIMIT_REACHED`
    pub async fn add_plan_item(&self, id: Uuid, text: &str) -> AppResult<LearningProcess> {
        self.mutate_plan(id, |lp| lp.add_plan_item(text)).await
    }

    /// Set an item's completion and, when non-blank, its text
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` or `PLAN_ITEM_NOT_FOUND`
    pub async fn update_plan_item(
        &self,
        id: Uuid,
        item_id: u8,
        text: Option<&str>,
        completed: bool,
    ) -> AppResult<LearningProcess> {
        self.mutate_plan(id, |lp| lp.update_plan_item(item_id, text, completed))
            .await
    }

    /// Flip an item's completion flag
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` or `PLAN_ITEM_NOT_FOUND`
    pub async fn toggle_plan_item(&self, id: Uuid, item_id: u8) -> AppResult<LearningProcess> {
        self.mutate_plan(id, |lp| lp.toggle_plan_item(item_id)).await
    }

    /// Delete an item
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` or `PLAN_ITEM_NOT_FOUND`
    pub async fn remove_plan_item(&self, id: Uuid, item_id: u8) -> AppResult<LearningProcess> {
        self.mutate_plan(id, |lp| lp.remove_plan_item(item_id)).await
    }

    /// Replace the whole plan
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` or a plan validation error
    pub async fn update_plan(&self, id: Uuid, plan: Vec<PlanItem>) -> AppResult<LearningProcess> {
        self.mutate_plan(id, |lp| lp.replace_plan(plan)).await
    }

    /// Set or clear notes
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` or `RESOURCE_NOT_FOUND`
    pub async fn update_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> AppResult<LearningProcess> {
        let mut learning = self.get(id).await?;
        learning.set_notes(notes)?;
        self.learnings
            .update_notes(id, learning.notes.as_deref())
            .await?;
        Ok(learning)
    }

    /// Finish with feedback and free one slot of the mentor's workload
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE`, `INVALID_RATING`, or `MISSING_REQUIRED_FIELD`;
    /// nothing is persisted on error
    pub async fn complete(
        &self,
        id: Uuid,
        rating: i64,
        comment: &str,
    ) -> AppResult<LearningProcess> {
        let mut learning = self.get(id).await?;
        learning.complete(rating, comment)?;
        let workload = self.learnings.complete(&learning).await?;

        info!(
            learning_id = %id,
            mentor_id = %learning.mentor_id,
            mentor_workload = workload,
            rating,
            "Learning process completed"
        );
        AppLogger::log_lifecycle_event("learning_process", &id.to_string(), "completed");
        Ok(learning)
    }

    /// Administrative overwrite of status, plan, feedback, and notes
    ///
    /// Reopening a completed process takes a slot of the mentor's workload
    /// again; completing through the override releases one.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND`, a structural validation error, or
    /// `MENTOR_NOT_AVAILABLE` when reopening for a mentor at capacity
    pub async fn admin_update(
        &self,
        id: Uuid,
        update: LearningOverride,
    ) -> AppResult<LearningProcess> {
        let mut learning = self.get(id).await?;
        let previous = learning.status;
        learning.apply_override(update)?;
        if let Some(workload) = self.learnings.overwrite(&learning, previous).await? {
            debug!(
                mentor_id = %learning.mentor_id,
                workload,
                "Mentor workload moved by learning override"
            );
        }
        AppLogger::log_lifecycle_event(
            "learning_process",
            &id.to_string(),
            &format!("admin override to {}", learning.status.as_str()),
        );
        Ok(learning)
    }
}
