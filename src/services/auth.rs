// ABOUTME: Registration, credential verification, and user administration
// ABOUTME: Unknown email and wrong password fail with the same error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthManager, AuthResult};
use crate::database::repositories::UserRepository;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{validate_email, validate_password, NewUser, User, UserProfileUpdate};
use crate::permissions::UserRole;

/// Registration input as received from the client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterInput {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
    /// Requested role; unknown values become employee
    pub role: Option<String>,
    /// Department
    pub department: Option<String>,
    /// Job title
    pub job_title: Option<String>,
    /// Telegram handle
    pub telegram: Option<String>,
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,
    /// Authenticated user
    pub user: User,
}

/// Account service
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    auth_manager: Arc<AuthManager>,
}

impl AuthService {
    /// Create the service
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, auth_manager: Arc<AuthManager>) -> Self {
        Self {
            users,
            auth_manager,
        }
    }

    /// Register a new account
    ///
    /// # Errors
    ///
    /// Returns a validation error, `WEAK_PASSWORD`, or `USER_ALREADY_EXISTS`
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        let role = input.role.as_deref().map(UserRole::parse).unwrap_or_default();
        let new_user = NewUser::new(
            &input.name,
            &input.email,
            role,
            input.department,
            input.job_title,
            input.telegram,
        )?;
        validate_password(&input.password)?;

        if self.users.get_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::user_already_exists());
        }

        let password_hash = self.auth_manager.hash_password(&input.password).await?;
        let user = new_user.into_user(password_hash);
        self.users.create(&user).await?;

        AppLogger::log_auth_event(&user.id.to_string(), "register", true, Some(user.role.as_str()));
        Ok(user)
    }

    /// Verify credentials and issue a token
    ///
    /// # Errors
    ///
    /// Returns `INVALID_CREDENTIALS` for an unknown email or a wrong password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let Ok(email) = validate_email(email) else {
            self.auth_manager.verify_dummy_password(password).await?;
            return Err(AppError::invalid_credentials());
        };
        let Some(user) = self.users.get_by_email(&email).await? else {
            self.auth_manager.verify_dummy_password(password).await?;
            AppLogger::log_auth_event("unknown", "login", false, Some("unknown email"));
            return Err(AppError::invalid_credentials());
        };
        if !self
            .auth_manager
            .verify_password(password, &user.password_hash)
            .await?
        {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("wrong password"));
            return Err(AppError::invalid_credentials());
        }

        let token = self.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);
        Ok(LoginResponse { token, user })
    }

    /// Validate a bearer token
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` or `AUTH_EXPIRED`
    pub fn validate_token(&self, token: &str) -> AppResult<AuthResult> {
        self.auth_manager.authenticate(token)
    }

    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when absent
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User").with_resource_id(user_id.to_string()))
    }

    /// Update the caller's own profile; a role change is ignored
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` or a validation error
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: UserProfileUpdate,
    ) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        user.apply_profile(UserProfileUpdate {
            role: None,
            ..update
        })?;
        self.users.update(&user).await?;
        Ok(user)
    }

    /// All users, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    /// Admin update of profile fields and role
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` or a validation error
    pub async fn admin_update_user(
        &self,
        user_id: Uuid,
        update: UserProfileUpdate,
    ) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        let role = update.role.as_deref().map(UserRole::parse);
        user.apply_profile(update)?;
        if let Some(role) = role {
            if role != user.role {
                info!(user_id = %user.id, from = %user.role, to = %role, "User role changed");
            }
            user.role = role;
        }
        self.users.update(&user).await?;
        Ok(user)
    }
}
