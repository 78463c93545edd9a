// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues and validates HS256 tokens carrying user id, email, and role
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Authentication
//!
//! Tokens are HS256 JWTs signed with the configured secret. Validation pins
//! the algorithm, so tokens signed any other way are rejected even when the
//! header claims otherwise. Password hashing runs on the blocking pool.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::task;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::permissions::UserRole;

/// Salt and digest of a well-formed bcrypt hash that matches no real password
const DUMMY_SALT_AND_DIGEST: &str = "92IXUNpkjO0rOQ5byMi.Ye4oKoEa3Ro9llC/.og/at2.uheWG/igi";

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let minutes = current_time.signed_duration_since(*expired_at).num_minutes();
                write!(
                    f,
                    "JWT token expired {minutes} minutes ago at {}",
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            other => Self::auth_invalid(other.to_string()),
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub user_id: String,
    /// User email
    pub email: String,
    /// Role at issue time
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller identity
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Caller email
    pub email: String,
    /// Caller role
    pub role: UserRole,
}

impl AuthResult {
    /// Check for admin privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Token issuer and validator
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_hours: i64,
    bcrypt_cost: u32,
    issued_tokens: AtomicU64,
}

impl Clone for AuthManager {
    fn clone(&self) -> Self {
        Self {
            encoding_key: self.encoding_key.clone(),
            decoding_key: self.decoding_key.clone(),
            token_ttl_hours: self.token_ttl_hours,
            bcrypt_cost: self.bcrypt_cost,
            issued_tokens: AtomicU64::new(self.issued_tokens.load(Ordering::Relaxed)),
        }
    }
}

impl AuthManager {
    /// Create a manager signing with `secret`; tokens live `token_ttl_hours`
    #[must_use]
    pub fn new(secret: &[u8], token_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_hours,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            issued_tokens: AtomicU64::new(0),
        }
    }

    /// Override the bcrypt work factor
    #[must_use]
    pub const fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Configured token lifetime in hours
    #[must_use]
    pub const fn token_ttl_hours(&self) -> i64 {
        self.token_ttl_hours
    }

    /// Number of tokens issued since startup
    #[must_use]
    pub fn issued_tokens(&self) -> u64 {
        self.issued_tokens.load(Ordering::Relaxed)
    }

    /// Generate a signed token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        self.generate_token_at(user, Utc::now())
    }

    fn generate_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> AppResult<String> {
        let expiry = issued_at + Duration::hours(self.token_ttl_hours);
        let claims = Claims {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;
        self.issued_tokens.fetch_add(1, Ordering::Relaxed);
        Ok(token)
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] for expired, tampered, malformed, or
    /// non-HS256 tokens
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_owned());

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                Err(self.expired_error(token))
            }
            Err(e) => Err(Self::convert_jwt_error(&e)),
        }
    }

    /// Validate a token and resolve the caller identity
    ///
    /// # Errors
    ///
    /// Returns `AUTH_EXPIRED` or `AUTH_INVALID`
    pub fn authenticate(&self, token: &str) -> AppResult<AuthResult> {
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|_| AppError::auth_invalid("Token carries an invalid user id"))?;
        Ok(AuthResult {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }

    fn expired_error(&self, token: &str) -> JwtValidationError {
        let current_time = Utc::now();
        let mut lenient = Validation::new(Algorithm::HS256);
        lenient.validate_exp = false;
        lenient.required_spec_claims.clear();
        let expired_at = decode::<Claims>(token, &self.decoding_key, &lenient)
            .ok()
            .and_then(|data| DateTime::from_timestamp(data.claims.exp, 0))
            .unwrap_or(current_time);
        tracing::warn!(
            "JWT token expired at {}",
            expired_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        JwtValidationError::TokenExpired {
            expired_at,
            current_time,
        }
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &JwtError) -> JwtValidationError {
        tracing::warn!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidAlgorithm => JwtValidationError::TokenInvalid {
                reason: "Token signed with an unexpected algorithm".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Hash a password with bcrypt on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Verify a password against a stored hash; malformed hashes never match
    ///
    /// # Errors
    ///
    /// Returns an internal error if the blocking task fails
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
    }

    /// Fixed bcrypt hash at the configured cost, used when no account exists
    #[must_use]
    pub fn dummy_hash(&self) -> String {
        format!("$2b${:02}${DUMMY_SALT_AND_DIGEST}", self.bcrypt_cost)
    }

    /// Run a full bcrypt verification against the dummy hash
    ///
    /// Unknown emails take as long to reject as wrong passwords.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the blocking task fails
    pub async fn verify_dummy_password(&self, password: &str) -> AppResult<()> {
        self.verify_password(password, &self.dummy_hash()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes-long";

    fn user(role: UserRole) -> User {
        NewUser::new("Alice", "alice@corp.com", role, None, None, None)
            .unwrap()
            .into_user(String::new())
    }

    #[test]
    fn test_token_round_trip_carries_identity() {
        let manager = AuthManager::new(SECRET, 24);
        let user = user(UserRole::Admin);
        let token = manager.generate_token(&user).unwrap();

        let auth = manager.authenticate(&token).unwrap();
        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.email, "alice@corp.com");
        assert!(auth.is_admin());
        assert_eq!(manager.issued_tokens(), 1);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = AuthManager::new(SECRET, 1);
        let token = manager
            .generate_token_at(&user(UserRole::Employee), Utc::now() - Duration::hours(3))
            .unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));
        let app: AppError = err.into();
        assert_eq!(app.code, crate::errors::ErrorCode::AuthExpired);
    }

    #[test]
    fn test_wrong_secret_and_tampering_are_rejected() {
        let manager = AuthManager::new(SECRET, 24);
        let other = AuthManager::new(b"another-secret-that-is-also-32-bytes!!", 24);
        let token = other.generate_token(&user(UserRole::Employee)).unwrap();
        assert!(matches!(
            manager.validate_token(&token).unwrap_err(),
            JwtValidationError::TokenInvalid { .. }
        ));

        let mut tampered = manager.generate_token(&user(UserRole::Employee)).unwrap();
        tampered.push('x');
        assert!(manager.validate_token(&tampered).is_err());
        assert!(manager.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let manager = AuthManager::new(SECRET, 24);
        let claims = Claims {
            user_id: Uuid::new_v4().to_string(),
            email: "mallory@corp.com".to_owned(),
            role: UserRole::Admin,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let manager = AuthManager::new(SECRET, 24).with_bcrypt_cost(4);
        let hash = manager.hash_password("correct horse").await.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(manager.verify_password("correct horse", &hash).await.unwrap());
        assert!(!manager.verify_password("wrong horse", &hash).await.unwrap());
        assert!(!manager.verify_password("correct horse", "garbage").await.unwrap());
    }

    #[tokio::test]
    async fn test_dummy_hash_is_well_formed_at_configured_cost() {
        let manager = AuthManager::new(SECRET, 24).with_bcrypt_cost(4);
        let dummy = manager.dummy_hash();
        assert!(dummy.starts_with("$2b$04$"));
        assert_eq!(dummy.len(), 60);
        // Parses and runs the full hash rather than bailing out on a malformed string
        assert!(!bcrypt::verify("correct horse", &dummy).unwrap());
        manager.verify_dummy_password("correct horse").await.unwrap();
    }
}
