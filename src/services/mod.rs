// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Auth, training requests, mentors, and the learning-process lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services validate invariants through the domain models and persist through
//! the repository traits. They know nothing about HTTP; the route layer maps
//! their [`AppError`](crate::errors::AppError) codes to status codes.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::database::repositories::{
    LearningRepository, LearningRepositoryImpl, MentorRepository, MentorRepositoryImpl,
    RequestRepository, RequestRepositoryImpl, UserRepository, UserRepositoryImpl,
};
use crate::database::Database;

/// Registration, login, token validation, and user administration
pub mod auth;
/// Learning process lifecycle: assignment, plan, notes, completion
pub mod learning;
/// Mentor CRUD and workload counters
pub mod mentors;
/// Training request lifecycle
pub mod requests;

pub use auth::{AuthService, LoginResponse, RegisterInput};
pub use learning::LearningService;
pub use mentors::MentorService;
pub use requests::RequestService;

/// Every service, wired over one set of repositories
pub struct Services {
    /// Auth and user administration
    pub auth: AuthService,
    /// Training requests
    pub requests: RequestService,
    /// Mentors
    pub mentors: MentorService,
    /// Learning processes
    pub learning: LearningService,
}

impl Services {
    /// Build the repositories over `database` and the services over them
    #[must_use]
    pub fn new(database: &Database, auth_manager: Arc<AuthManager>) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(UserRepositoryImpl::new(database.clone()));
        let mentors: Arc<dyn MentorRepository> =
            Arc::new(MentorRepositoryImpl::new(database.clone()));
        let requests: Arc<dyn RequestRepository> =
            Arc::new(RequestRepositoryImpl::new(database.clone()));
        let learnings: Arc<dyn LearningRepository> =
            Arc::new(LearningRepositoryImpl::new(database.clone()));

        Self {
            auth: AuthService::new(users.clone(), auth_manager),
            requests: RequestService::new(requests.clone(), users),
            mentors: MentorService::new(mentors.clone()),
            learning: LearningService::new(learnings, requests, mentors),
        }
    }
}
