// ABOUTME: User account model with role and profile fields
// ABOUTME: Email and password policy checks used at registration time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{normalize_optional, require_non_blank};
use crate::constants::credentials::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};
use crate::permissions::UserRole;

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login email (unique)
    pub email: String,
    /// bcrypt hash; never leaves the server
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Access role
    pub role: UserRole,
    /// Department within the company
    pub department: Option<String>,
    /// Job title
    pub job_title: Option<String>,
    /// Telegram handle
    pub telegram: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Validated registration input (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Requested role
    pub role: UserRole,
    /// Department
    pub department: Option<String>,
    /// Job title
    pub job_title: Option<String>,
    /// Telegram handle
    pub telegram: Option<String>,
}

impl NewUser {
    /// Build registration input, trimming fields and normalizing the email
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the email is malformed
    pub fn new(
        name: &str,
        email: &str,
        role: UserRole,
        department: Option<String>,
        job_title: Option<String>,
        telegram: Option<String>,
    ) -> AppResult<Self> {
        let name = require_non_blank("name", name)?;
        let email = validate_email(email)?;
        Ok(Self {
            name,
            email,
            role,
            department: normalize_optional(department),
            job_title: normalize_optional(job_title),
            telegram: normalize_optional(telegram),
        })
    }

    /// Materialize into a `User` with the given password hash
    #[must_use]
    pub fn into_user(self, password_hash: String) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
            department: self.department,
            job_title: self.job_title,
            telegram: self.telegram,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New department
    pub department: Option<String>,
    /// New job title
    pub job_title: Option<String>,
    /// New telegram handle
    pub telegram: Option<String>,
    /// New role; honored only on the admin path
    pub role: Option<String>,
}

impl User {
    /// Apply a profile update; an empty string clears an optional field
    ///
    /// # Errors
    ///
    /// Returns an error if a provided name is blank
    pub fn apply_profile(&mut self, update: UserProfileUpdate) -> AppResult<()> {
        if let Some(name) = update.name {
            self.name = require_non_blank("name", &name)?;
        }
        if let Some(department) = update.department {
            self.department = normalize_optional(Some(department));
        }
        if let Some(job_title) = update.job_title {
            self.job_title = normalize_optional(Some(job_title));
        }
        if let Some(telegram) = update.telegram {
            self.telegram = normalize_optional(Some(telegram));
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check for admin privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Validate and normalize an email address (trimmed, lowercased)
///
/// # Errors
///
/// Returns `INVALID_EMAIL` for anything without a local part, an `@`, and a dotted domain
pub fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::invalid_email());
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.contains(char::is_whitespace) {
        return Err(AppError::invalid_email());
    }
    Ok(email)
}

/// Enforce the minimum password length
///
/// # Errors
///
/// Returns `WEAK_PASSWORD` when shorter than the policy minimum
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::weak_password());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_email_validation() {
        assert_eq!(validate_email(" Alice@Corp.Example ").unwrap(), "alice@corp.example");
        for bad in [
            "",
            "alice",
            "@corp.com",
            "alice@",
            "alice@corp",
            "alice@.com",
            "a b@corp.com",
        ] {
            assert_eq!(validate_email(bad).unwrap_err().code, ErrorCode::InvalidEmail, "{bad}");
        }
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("12345678").is_ok());
        assert_eq!(validate_password("1234567").unwrap_err().code, ErrorCode::WeakPassword);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = NewUser::new("Alice", "alice@corp.com", UserRole::Employee, None, None, None)
            .unwrap()
            .into_user("$2b$12$secret".to_owned());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("secret"));
        assert_eq!(json["role"], "employee");
    }

    #[test]
    fn test_apply_profile_clears_blank_optional_fields() {
        let mut user = NewUser::new(
            "Alice",
            "alice@corp.com",
            UserRole::Employee,
            Some("R&D".to_owned()),
            None,
            Some("@alice".to_owned()),
        )
        .unwrap()
        .into_user(String::new());

        user.apply_profile(UserProfileUpdate {
            department: Some(String::new()),
            job_title: Some("Engineer".to_owned()),
            ..UserProfileUpdate::default()
        })
        .unwrap();

        assert_eq!(user.department, None);
        assert_eq!(user.job_title.as_deref(), Some("Engineer"));
        assert_eq!(user.telegram.as_deref(), Some("@alice"));
    }
}
