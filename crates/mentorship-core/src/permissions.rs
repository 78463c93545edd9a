// ABOUTME: User roles and the owner-or-admin access predicate
// ABOUTME: Shared by HTTP guards and services so access rules stay in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Role assigned to every user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular employee requesting training
    #[default]
    Employee,
    /// Administrator managing requests and mentors
    Admin,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Admin => "admin",
        }
    }

    /// Parse from string; anything unrecognized is an employee
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::Employee,
        }
    }

    /// Check for admin privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the caller owns the resource or is an admin
#[must_use]
pub fn is_owner_or_admin(caller_id: Uuid, caller_role: UserRole, owner_id: Uuid) -> bool {
    caller_role.is_admin() || caller_id == owner_id
}

/// Enforce [`is_owner_or_admin`]
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when the caller is neither the owner nor an admin
pub fn require_owner_or_admin(
    caller_id: Uuid,
    caller_role: UserRole,
    owner_id: Uuid,
) -> AppResult<()> {
    if is_owner_or_admin(caller_id, caller_role, owner_id) {
        Ok(())
    } else {
        Err(AppError::permission_denied(
            "Access denied: you can only access your own resources",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_unknown_role_defaults_to_employee() {
        assert_eq!(UserRole::parse("admin"), UserRole::Admin);
        assert_eq!(UserRole::parse("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::parse("superuser"), UserRole::Employee);
        assert_eq!(UserRole::parse(""), UserRole::Employee);
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(is_owner_or_admin(owner, UserRole::Employee, owner));
        assert!(is_owner_or_admin(stranger, UserRole::Admin, owner));
        assert!(!is_owner_or_admin(stranger, UserRole::Employee, owner));

        let err = require_owner_or_admin(stranger, UserRole::Employee, owner).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
