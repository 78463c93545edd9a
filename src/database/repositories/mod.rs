// ABOUTME: Repository pattern interfaces for the mentorship domain
// ABOUTME: One focused trait per entity; services depend on these, not on SQL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Repositories
//!
//! Each trait is the persistence contract for one aggregate. The `SQLite`
//! implementations live next to them and share a [`Database`] handle.
//!
//! Operations that must change several rows together (assigning a mentor,
//! completing a learning process) are single repository calls so that the
//! transaction boundary stays inside the persistence layer.
//!
//! [`Database`]: crate::database::Database

mod learning_repository;
mod mentor_repository;
mod request_repository;
mod user_repository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{
    LearningDetails, LearningProcess, LearningStatus, Mentor, PlanItem, RequestStatus,
    TrainingRequest, User,
};

pub use learning_repository::LearningRepositoryImpl;
pub use mentor_repository::MentorRepositoryImpl;
pub use request_repository::RequestRepositoryImpl;
pub use user_repository::UserRepositoryImpl;

/// User account persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; `USER_ALREADY_EXISTS` on a duplicate email
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Look up by id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Look up by normalized email
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// All users, newest first
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Persist profile fields and role
    async fn update(&self, user: &User) -> AppResult<()>;
}

/// Mentor persistence with atomic workload counters
#[async_trait]
pub trait MentorRepository: Send + Sync {
    /// Insert a new mentor
    async fn create(&self, mentor: &Mentor) -> AppResult<()>;

    /// Look up by id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Mentor>>;

    /// Mentors ordered by workload then name, optionally capped
    async fn list(&self, max_workload: Option<i64>) -> AppResult<Vec<Mentor>>;

    /// Overwrite every editable field, workload included
    async fn update(&self, mentor: &Mentor) -> AppResult<()>;

    /// Guarded `workload + 1`; returns the new workload
    async fn increment_workload(&self, id: Uuid) -> AppResult<i64>;

    /// `workload - 1` with a floor of zero; returns the new workload
    async fn decrement_workload(&self, id: Uuid) -> AppResult<i64>;
}

/// Training request persistence
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a new request
    async fn create(&self, request: &TrainingRequest) -> AppResult<()>;

    /// Look up by id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<TrainingRequest>>;

    /// Requests of one user, newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<TrainingRequest>>;

    /// All requests, newest first, optionally filtered by status
    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>>;

    /// Persist topic and description
    async fn update_content(&self, request: &TrainingRequest) -> AppResult<()>;

    /// Guarded transition out of `pending`; fails if the stored status moved meanwhile
    async fn transition_from_pending(&self, id: Uuid, to: RequestStatus) -> AppResult<()>;
}

/// Learning process persistence
#[async_trait]
pub trait LearningRepository: Send + Sync {
    /// In one transaction: optionally approve the pending request, insert the
    /// process, and take one slot of the mentor's workload. Returns the mentor's
    /// new workload.
    async fn create_with_assignment(
        &self,
        learning: &LearningProcess,
        approve_request: bool,
    ) -> AppResult<i64>;

    /// Look up by id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<LearningProcess>>;

    /// Look up the process created for a request
    async fn get_by_request_id(&self, request_id: Uuid) -> AppResult<Option<LearningProcess>>;

    /// Process joined with request, mentee, and mentor summaries
    async fn get_details(&self, id: Uuid) -> AppResult<Option<LearningDetails>>;

    /// Detailed processes of one mentee, newest first
    async fn list_details_by_user(&self, user_id: Uuid) -> AppResult<Vec<LearningDetails>>;

    /// Detailed processes of one mentor, newest first
    async fn list_details_by_mentor(&self, mentor_id: Uuid) -> AppResult<Vec<LearningDetails>>;

    /// Persist the plan of an active process
    async fn update_plan(&self, id: Uuid, plan: &[PlanItem]) -> AppResult<()>;

    /// Persist the notes of an active process
    async fn update_notes(&self, id: Uuid, notes: Option<&str>) -> AppResult<()>;

    /// In one transaction: store completion and feedback, release one slot of
    /// the mentor's workload. Returns the mentor's new workload.
    async fn complete(&self, learning: &LearningProcess) -> AppResult<i64>;

    /// Administrative overwrite of status, plan, feedback, notes, and end date.
    ///
    /// Guarded on `previous` still being the stored status. A status flip moves
    /// one slot of the mentor's workload in the same transaction; returns the
    /// mentor's new workload when it changed.
    async fn overwrite(
        &self,
        learning: &LearningProcess,
        previous: LearningStatus,
    ) -> AppResult<Option<i64>>;
}
