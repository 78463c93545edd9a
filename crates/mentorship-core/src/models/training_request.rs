// ABOUTME: Training request model with its one-way approval state machine
// ABOUTME: pending -> approved | rejected; both outcomes are terminal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_non_blank;
use crate::constants::messages;
use crate::errors::{AppError, AppResult};

/// Review status of a training request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting admin review
    #[default]
    Pending,
    /// Accepted; a mentor may be assigned
    Approved,
    /// Declined
    Rejected,
}

impl RequestStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status filter value
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for anything but pending, approved, or rejected
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::invalid_input(format!(
                "invalid request status '{other}'"
            ))),
        }
    }
}

/// An employee's request for training on a topic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    /// Unique identifier
    pub id: Uuid,
    /// Requesting user
    pub user_id: Uuid,
    /// Requested topic
    pub topic: String,
    /// Free-text description
    pub description: String,
    /// Review status
    pub status: RequestStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TrainingRequest {
    /// New pending request
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` when topic or description is blank
    pub fn new(user_id: Uuid, topic: &str, description: &str) -> AppResult<Self> {
        let topic = require_non_blank("topic", topic)?;
        let description = require_non_blank("description", description)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            topic,
            description,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Awaiting review
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Approved by an admin
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == RequestStatus::Approved
    }

    /// Rejected by an admin
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.status == RequestStatus::Rejected
    }

    /// pending -> approved
    ///
    /// # Errors
    ///
    /// Fails without changing state when already approved or rejected
    pub fn approve(&mut self) -> AppResult<()> {
        match self.status {
            RequestStatus::Approved => Err(AppError::request_already_approved()),
            RequestStatus::Rejected => {
                Err(AppError::invalid_transition(messages::CANNOT_APPROVE_REJECTED))
            }
            RequestStatus::Pending => {
                self.status = RequestStatus::Approved;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    /// pending -> rejected
    ///
    /// # Errors
    ///
    /// Fails without changing state when already rejected or approved
    pub fn reject(&mut self) -> AppResult<()> {
        match self.status {
            RequestStatus::Rejected => Err(AppError::request_already_rejected()),
            RequestStatus::Approved => {
                Err(AppError::invalid_transition(messages::CANNOT_REJECT_APPROVED))
            }
            RequestStatus::Pending => {
                self.status = RequestStatus::Rejected;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    /// Replace topic and description; status is untouched
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` when topic or description is blank
    pub fn update_content(&mut self, topic: &str, description: &str) -> AppResult<()> {
        let topic = require_non_blank("topic", topic)?;
        let description = require_non_blank("description", description)?;
        self.topic = topic;
        self.description = description;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn request() -> TrainingRequest {
        TrainingRequest::new(Uuid::new_v4(), "Go", "basics").unwrap()
    }

    #[test]
    fn test_new_request_is_pending() {
        let req = request();
        assert!(req.is_pending());
        assert_eq!(req.topic, "Go");

        let err = TrainingRequest::new(Uuid::new_v4(), "  ", "basics").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn test_only_pending_edges_are_allowed() {
        let mut approved = request();
        approved.approve().unwrap();
        assert_eq!(
            approved.approve().unwrap_err().code,
            ErrorCode::RequestAlreadyApproved
        );
        assert_eq!(
            approved.reject().unwrap_err().code,
            ErrorCode::InvalidStateTransition
        );
        assert!(approved.is_approved());

        let mut rejected = request();
        rejected.reject().unwrap();
        assert_eq!(
            rejected.reject().unwrap_err().code,
            ErrorCode::RequestAlreadyRejected
        );
        assert_eq!(
            rejected.approve().unwrap_err().code,
            ErrorCode::InvalidStateTransition
        );
        assert!(rejected.is_rejected());
    }

    #[test]
    fn test_update_content_keeps_status() {
        let mut req = request();
        req.approve().unwrap();
        req.update_content("Rust", "ownership").unwrap();
        assert_eq!(req.topic, "Rust");
        assert!(req.is_approved());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(RequestStatus::parse("Approved").unwrap(), RequestStatus::Approved);
        assert_eq!(
            RequestStatus::parse("done").unwrap_err().code,
            ErrorCode::InvalidInput
        );
    }
}
