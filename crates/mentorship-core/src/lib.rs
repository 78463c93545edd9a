// ABOUTME: Core domain types for the mentorship training server
// ABOUTME: Foundation crate with entities, error handling, permissions, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Mentorship Core
//!
//! Foundation crate providing the domain model for the mentorship training
//! server. Nothing in here touches storage or HTTP directly; those concerns
//! live in the server crate and reach this one through the optional
//! `http-response` and `database-errors` features.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Limits and user-facing messages shared across layers
//! - **models**: Users, mentors, training requests, and learning processes
//! - **permissions**: Roles and the owner-or-admin access predicate

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Domain limits and error messages
pub mod constants;

/// Core data models (User, Mentor, `TrainingRequest`, `LearningProcess`)
pub mod models;

/// Role-based access checks
pub mod permissions;
