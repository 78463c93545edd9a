// ABOUTME: Mentor management and workload counters
// ABOUTME: Availability means workload at most four, listed by workload then name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use uuid::Uuid;

use crate::constants::workload::MAX_ASSIGNABLE_WORKLOAD;
use crate::database::repositories::MentorRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{Mentor, MentorUpdate, NewMentor};

/// Mentor service
pub struct MentorService {
    mentors: Arc<dyn MentorRepository>,
}

impl MentorService {
    /// Create the service
    #[must_use]
    pub fn new(mentors: Arc<dyn MentorRepository>) -> Self {
        Self { mentors }
    }

    /// Create a mentor with zero workload
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank name/job title or a malformed email
    pub async fn create(&self, input: NewMentor) -> AppResult<Mentor> {
        let mentor = input.validated()?.into_mentor();
        self.mentors.create(&mentor).await?;
        Ok(mentor)
    }

    /// Fetch one mentor
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn get(&self, id: Uuid) -> AppResult<Mentor> {
        self.mentors
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Mentor").with_resource_id(id.to_string()))
    }

    /// Mentors that can take another student
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn available(&self) -> AppResult<Vec<Mentor>> {
        self.mentors.list(Some(MAX_ASSIGNABLE_WORKLOAD)).await
    }

    /// All mentors, optionally capped by workload
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn all(&self, max_workload: Option<i64>) -> AppResult<Vec<Mentor>> {
        self.mentors.list(max_workload).await
    }

    /// Admin override of every field, workload included
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND`, `INVALID_WORKLOAD`, or a validation error
    pub async fn update(&self, id: Uuid, update: MentorUpdate) -> AppResult<Mentor> {
        let mut mentor = self.get(id).await?;
        mentor.apply_update(update)?;
        self.mentors.update(&mentor).await?;
        Ok(mentor)
    }

    /// Take one more student
    ///
    /// # Errors
    ///
    /// Returns `MENTOR_NOT_AVAILABLE` at the cap, `RESOURCE_NOT_FOUND` when absent
    pub async fn increment_workload(&self, id: Uuid) -> AppResult<i64> {
        self.mentors.increment_workload(id).await
    }

    /// Release one student, never below zero
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn decrement_workload(&self, id: Uuid) -> AppResult<i64> {
        self.mentors.decrement_workload(id).await
    }
}
