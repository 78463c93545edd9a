// ABOUTME: Central authorization guards for admin-only and owner-or-admin routes
// ABOUTME: Verifies the caller's role from the token and returns 403 Forbidden if not authorized
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authorization guards
//!
//! Handlers call these right after authentication instead of inlining role
//! checks.
//!
//! ```rust,no_run
//! use mentorship_server::auth::AuthResult;
//! use mentorship_server::middleware::admin_guard::require_admin;
//!
//! fn admin_handler(auth: &AuthResult) -> Result<String, mentorship_server::errors::AppError> {
//!     require_admin(auth)?;
//!     Ok(format!("Welcome admin: {}", auth.email))
//! }
//! ```

use uuid::Uuid;

use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::permissions::require_owner_or_admin;

/// Require the admin role
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` (403) for non-admin callers
pub fn require_admin(auth: &AuthResult) -> AppResult<()> {
    if auth.is_admin() {
        return Ok(());
    }
    AppLogger::log_security_event(
        "admin_required",
        "non-admin caller on admin route",
        Some(&auth.user_id.to_string()),
    );
    Err(AppError::permission_denied("Admin privileges required"))
}

/// Require that the caller owns the resource or is an admin
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` (403) otherwise
pub fn require_owner(auth: &AuthResult, owner_id: Uuid) -> AppResult<()> {
    require_owner_or_admin(auth.user_id, auth.role, owner_id).inspect_err(|_| {
        AppLogger::log_security_event(
            "owner_required",
            "caller is neither owner nor admin",
            Some(&auth.user_id.to_string()),
        );
    })
}
