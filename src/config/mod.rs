// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Exposes environment-driven server, database, auth, and HTTP configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the mentorship server
//!
//! All settings come from environment variables; there is no config file.

/// Environment-based server configuration
pub mod environment;

pub use environment::{
    AuthConfig, DatabaseConfig, DatabaseUrl, Environment, HttpConfig, LogLevel, ServerConfig,
};
