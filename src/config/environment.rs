// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, JWT secret, token TTL, and HTTP limits from env vars
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default HTTP port
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default bind address
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default database location
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/mentorship.db";

/// Minimum JWT secret length accepted in production
const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` URLs
    pub fn parse_url(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            return Err(anyhow!("Only SQLite databases are supported, got: {s}"));
        }
        let path_str = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .unwrap_or(s);
        if path_str == ":memory:" {
            Ok(Self::Memory)
        } else if path_str.is_empty() {
            Err(anyhow!("Database path must not be empty"))
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/mentorship.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Pool size for file-backed databases
    pub max_connections: u32,
    /// Run schema migrations at startup
    pub auto_migrate: bool,
}

/// Token signing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for HS256 tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// HTTP layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Allowed CORS origins; `*` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// HTTP configuration
    pub http: HttpConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or any value fails to parse
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or any value fails to parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let http_port = match lookup("HTTP_PORT").or_else(|| lookup("SERVER_PORT")) {
            Some(port) => port
                .parse()
                .with_context(|| format!("Invalid HTTP_PORT value: {port}"))?,
            None => DEFAULT_HTTP_PORT,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?;

        let config = Self {
            http_port,
            host: var_or("HOST", DEFAULT_HOST),
            log_level: LogLevel::from_str_or_default(&var_or("LOG_LEVEL", "info")),
            environment: Environment::from_str_or_default(&var_or("ENVIRONMENT", "development")),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&var_or("DATABASE_URL", DEFAULT_DATABASE_URL))?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", "10")
                    .parse()
                    .context("Invalid DATABASE_MAX_CONNECTIONS value")?,
                auto_migrate: var_or("AUTO_MIGRATE", "true")
                    .parse()
                    .context("Invalid AUTO_MIGRATE value")?,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours: var_or("TOKEN_TTL_HOURS", "24")
                    .parse()
                    .context("Invalid TOKEN_TTL_HOURS value")?,
            },
            http: HttpConfig {
                cors_allowed_origins: parse_origins(&var_or("CORS_ALLOWED_ORIGINS", "*")),
                request_timeout_secs: var_or("REQUEST_TIMEOUT_SECS", "30")
                    .parse()
                    .context("Invalid REQUEST_TIMEOUT_SECS value")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error on a non-positive token TTL, an empty pool, or a short production secret
    pub fn validate(&self) -> Result<()> {
        if self.auth.token_ttl_hours <= 0 {
            return Err(anyhow!("TOKEN_TTL_HOURS must be positive"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow!("DATABASE_MAX_CONNECTIONS must be at least 1"));
        }
        if self.auth.jwt_secret.len() < MIN_PRODUCTION_SECRET_BYTES {
            if self.environment.is_production() {
                return Err(anyhow!(
                    "JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_BYTES} bytes in production"
                ));
            }
            warn!("JWT_SECRET is shorter than {MIN_PRODUCTION_SECRET_BYTES} bytes");
        }
        if self.database.url.is_memory() && self.environment.is_production() {
            warn!("Production environment is using an in-memory database");
        }
        Ok(())
    }

    /// Human-readable configuration summary (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Mentorship Server Configuration:\n\
             - HTTP: {}:{}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Auto Migrate: {}\n\
             - Token TTL: {}h\n\
             - CORS Origins: {}\n\
             - Request Timeout: {}s",
            self.host,
            self.http_port,
            self.environment,
            self.log_level,
            self.database.url,
            self.database.auto_migrate,
            self.auth.token_ttl_hours,
            self.http.cors_allowed_origins.join(","),
            self.http.request_timeout_secs,
        )
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "dev-secret")])).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.database.auto_migrate);
        assert_eq!(config.http.cors_allowed_origins, vec!["*".to_owned()]);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_jwt_secret_required() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "short"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("at least"));
    }

    #[test]
    fn test_server_port_fallback_and_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "dev-secret"),
            ("SERVER_PORT", "9000"),
            ("TOKEN_TTL_HOURS", "2"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.auth.token_ttl_hours, 2);
        assert_eq!(config.http.cors_allowed_origins.len(), 2);
        assert!(config.database.url.is_memory());
    }

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:").unwrap(), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/app.db").unwrap(),
            DatabaseUrl::SQLite { path: PathBuf::from("./data/app.db") }
        );
        assert_eq!(
            DatabaseUrl::parse_url("app.db").unwrap().to_connection_string(),
            "sqlite:app.db"
        );
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config =
            ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "super-secret-value")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(!config.summary().contains("super-secret-value"));
    }
}
