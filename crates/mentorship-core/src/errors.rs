// ABOUTME: Unified error handling with standard error codes and HTTP status mapping
// ABOUTME: Domain errors for requests, mentors, and learning processes share one AppError type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every layer of the server returns [`AppError`]. The [`ErrorCode`] carries
//! the domain meaning (`LEARNING_NOT_ACTIVE`, `MENTOR_NOT_AVAILABLE`, ...) and
//! decides the HTTP status at the boundary, so services never think in terms
//! of status codes.

use std::fmt;

#[cfg(feature = "http-response")]
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::messages;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1000-1999)
    /// No credentials supplied
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    /// Token could not be verified
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    /// Token past its expiry
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired = 1002,
    /// Email/password pair rejected
    #[serde(rename = "INVALID_CREDENTIALS")]
    InvalidCredentials = 1003,
    /// Caller lacks the role or ownership required
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1004,

    // Validation (3000-3999)
    /// Generic malformed input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Required field empty or absent
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// Malformed email address
    #[serde(rename = "INVALID_EMAIL")]
    InvalidEmail = 3002,
    /// Password below the length policy
    #[serde(rename = "WEAK_PASSWORD")]
    WeakPassword = 3003,
    /// Rating outside 1..=5
    #[serde(rename = "INVALID_RATING")]
    InvalidRating = 3004,
    /// Workload outside 0..=5
    #[serde(rename = "INVALID_WORKLOAD")]
    InvalidWorkload = 3005,

    // Resource Management (4000-4999)
    /// Entity does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Plan item id not present in the plan
    #[serde(rename = "PLAN_ITEM_NOT_FOUND")]
    PlanItemNotFound = 4001,

    // Domain state (4500-4999)
    /// Email already registered
    #[serde(rename = "USER_ALREADY_EXISTS")]
    UserAlreadyExists = 4500,
    /// Mentor at full workload
    #[serde(rename = "MENTOR_NOT_AVAILABLE")]
    MentorNotAvailable = 4501,
    /// Request is already approved
    #[serde(rename = "REQUEST_ALREADY_APPROVED")]
    RequestAlreadyApproved = 4502,
    /// Request is already rejected
    #[serde(rename = "REQUEST_ALREADY_REJECTED")]
    RequestAlreadyRejected = 4503,
    /// Transition not allowed from the current status
    #[serde(rename = "INVALID_STATE_TRANSITION")]
    InvalidStateTransition = 4504,
    /// Request already has a learning process
    #[serde(rename = "LEARNING_ALREADY_EXISTS")]
    LearningAlreadyExists = 4505,
    /// Learning process is completed
    #[serde(rename = "LEARNING_NOT_ACTIVE")]
    LearningNotActive = 4506,
    /// Plan holds the maximum number of items
    #[serde(rename = "PLAN_LIMIT_REACHED")]
    PlanLimitReached = 4507,

    // Configuration (6000-6999)
    /// Configuration missing or invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    /// Unexpected failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Encoding or decoding failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidEmail
            | Self::WeakPassword
            | Self::InvalidRating
            | Self::InvalidWorkload
            | Self::UserAlreadyExists
            | Self::MentorNotAvailable
            | Self::RequestAlreadyApproved
            | Self::RequestAlreadyRejected
            | Self::InvalidStateTransition
            | Self::LearningAlreadyExists
            | Self::LearningNotActive
            | Self::PlanLimitReached => 400,

            // 401 Unauthorized
            Self::AuthRequired
            | Self::AuthInvalid
            | Self::AuthExpired
            | Self::InvalidCredentials => 401,

            // 403 Forbidden
            Self::PermissionDenied => 403,

            // 404 Not Found
            Self::ResourceNotFound | Self::PlanItemNotFound => 404,

            // 500 Internal Server Error
            Self::ConfigError
            | Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError => 500,
        }
    }

    /// Whether details of this error must stay out of client responses
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.http_status() >= 500
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::InvalidCredentials => "Invalid email or password",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidEmail => "The email address is invalid",
            Self::WeakPassword => "The password does not meet the length policy",
            Self::InvalidRating => "The rating is outside the accepted range",
            Self::InvalidWorkload => "The workload is outside the accepted range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::PlanItemNotFound => "The requested plan item was not found",
            Self::UserAlreadyExists => "A user with this email already exists",
            Self::MentorNotAvailable => "The mentor cannot take more students",
            Self::RequestAlreadyApproved => "The training request is already approved",
            Self::RequestAlreadyRejected => "The training request is already rejected",
            Self::InvalidStateTransition => "The operation is not allowed in the current state",
            Self::LearningAlreadyExists => "A learning process already exists for this request",
            Self::LearningNotActive => "The learning process is not active",
            Self::PlanLimitReached => "The learning plan is full",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Resource ID if applicable
    pub resource_id: Option<String>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            request_id: None,
            resource_id: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a request ID to the error context
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.context.request_id = Some(request_id.into());
        self
    }

    /// Add a resource ID to the error context
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Correlation id, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Structured details
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        // Infrastructure details are logged at the boundary, never returned
        let message = if error.code.is_internal() {
            error.code.description().to_owned()
        } else {
            error.message
        };
        let details = if error.code.is_internal() {
            serde_json::Value::Null
        } else {
            error.context.details
        };

        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message,
                request_id: error.context.request_id,
                details,
            },
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Authentication expired
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Authentication token has expired")
    }

    /// Rejected login; identical for unknown email and wrong password
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials, messages::INVALID_CREDENTIALS)
    }

    /// Caller lacks role or ownership
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required field missing or blank
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{field} is required"),
        )
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Email already registered
    #[must_use]
    pub fn user_already_exists() -> Self {
        Self::new(ErrorCode::UserAlreadyExists, messages::USER_ALREADY_EXISTS)
    }

    /// Password below policy
    #[must_use]
    pub fn weak_password() -> Self {
        Self::new(ErrorCode::WeakPassword, messages::WEAK_PASSWORD)
    }

    /// Malformed email
    #[must_use]
    pub fn invalid_email() -> Self {
        Self::new(ErrorCode::InvalidEmail, messages::INVALID_EMAIL)
    }

    /// Workload outside 0..=5
    #[must_use]
    pub fn invalid_workload(workload: i64) -> Self {
        Self::new(ErrorCode::InvalidWorkload, messages::INVALID_WORKLOAD)
            .with_details(serde_json::json!({ "workload": workload }))
    }

    /// Rating outside 1..=5
    #[must_use]
    pub fn invalid_rating(rating: i64) -> Self {
        Self::new(ErrorCode::InvalidRating, messages::INVALID_RATING)
            .with_details(serde_json::json!({ "rating": rating }))
    }

    /// Mentor at capacity
    #[must_use]
    pub fn mentor_not_available() -> Self {
        Self::new(ErrorCode::MentorNotAvailable, messages::MENTOR_NOT_AVAILABLE)
    }

    /// Approve on an approved request
    #[must_use]
    pub fn request_already_approved() -> Self {
        Self::new(
            ErrorCode::RequestAlreadyApproved,
            messages::REQUEST_ALREADY_APPROVED,
        )
    }

    /// Reject on a rejected request
    #[must_use]
    pub fn request_already_rejected() -> Self {
        Self::new(
            ErrorCode::RequestAlreadyRejected,
            messages::REQUEST_ALREADY_REJECTED,
        )
    }

    /// Transition not allowed from the current status
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidStateTransition, message)
    }

    /// Request already has a learning process
    #[must_use]
    pub fn learning_already_exists() -> Self {
        Self::new(
            ErrorCode::LearningAlreadyExists,
            messages::LEARNING_ALREADY_EXISTS,
        )
    }

    /// Learning process is completed
    #[must_use]
    pub fn learning_not_active() -> Self {
        Self::new(ErrorCode::LearningNotActive, messages::LEARNING_NOT_ACTIVE)
    }

    /// Plan item id not in the plan
    #[must_use]
    pub fn plan_item_not_found(item_id: u8) -> Self {
        Self::new(ErrorCode::PlanItemNotFound, messages::PLAN_ITEM_NOT_FOUND)
            .with_resource_id(item_id.to_string())
    }

    /// Plan is full
    #[must_use]
    pub fn plan_limit_reached() -> Self {
        Self::new(ErrorCode::PlanLimitReached, messages::PLAN_LIMIT_REACHED)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::SerializationError,
            format!("JSON processing failed: {error}"),
        )
        .with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(format!("Database query failed: {error}")).with_source(error)
    }
}

#[cfg(feature = "http-response")]
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(feature = "http-response")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_internal() {
            tracing::error!(
                code = ?self.code,
                error = %self.message,
                source = ?self.source,
                "Request failed with internal error"
            );
        } else {
            tracing::debug!(code = ?self.code, error = %self.message, "Request rejected");
        }

        (status, axum::Json(ErrorResponse::from(self))).into_response()
    }
}
