// ABOUTME: Domain entity module exports for the mentorship platform
// ABOUTME: Users, mentors, training requests, and learning processes with their invariants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Domain Models
//!
//! Plain records with invariant-checking methods. Persistence and transport
//! layers construct these from rows and request bodies; every state
//! transition goes through a method here so the rules live in one place.

use crate::errors::{AppError, AppResult};

mod learning;
mod mentor;
mod training_request;
mod user;

pub use learning::{
    validate_plan, Feedback, LearningDetails, LearningOverride, LearningProcess, LearningStatus,
    MentorSummary, PlanItem, RequestSummary, UserSummary,
};
pub use mentor::{Mentor, MentorUpdate, NewMentor};
pub use training_request::{RequestStatus, TrainingRequest};
pub use user::{validate_email, validate_password, NewUser, User, UserProfileUpdate};

/// Trim and reject blank strings
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` naming `field` when `value` is blank
pub fn require_non_blank(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    Ok(trimmed.to_owned())
}

/// Normalize optional free text: blank becomes `None`
#[must_use]
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}
