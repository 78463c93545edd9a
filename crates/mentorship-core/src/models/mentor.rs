// ABOUTME: Mentor model with bounded workload counter
// ABOUTME: Capacity checks and validated create/override inputs for admin endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{normalize_optional, require_non_blank, validate_email};
use crate::constants::workload::{MAX_ASSIGNABLE_WORKLOAD, MAX_WORKLOAD};
use crate::errors::{AppError, AppResult};

/// Mentor with a workload counter in `0..=5`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Job title
    pub job_title: String,
    /// Free-text experience summary
    pub experience: Option<String>,
    /// Number of active students
    pub workload: i64,
    /// Contact email
    pub email: String,
    /// Telegram handle
    pub telegram: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Mentor {
    /// Whether another student fits under the cap
    #[must_use]
    pub const fn can_take_student(&self) -> bool {
        self.workload <= MAX_ASSIGNABLE_WORKLOAD
    }

    /// Check a workload value against the bounds
    ///
    /// # Errors
    ///
    /// Returns `INVALID_WORKLOAD` outside `0..=5`
    pub fn validate_workload(workload: i64) -> AppResult<()> {
        if (0..=MAX_WORKLOAD).contains(&workload) {
            Ok(())
        } else {
            Err(AppError::invalid_workload(workload))
        }
    }
}

/// Validated mentor creation input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMentor {
    /// Display name
    pub name: String,
    /// Job title
    pub job_title: String,
    /// Experience summary
    #[serde(default)]
    pub experience: Option<String>,
    /// Contact email
    pub email: String,
    /// Telegram handle
    #[serde(default)]
    pub telegram: Option<String>,
}

impl NewMentor {
    /// Trim, normalize, and check required fields
    ///
    /// # Errors
    ///
    /// Returns an error for a blank name or job title, or a malformed email
    pub fn validated(self) -> AppResult<Self> {
        Ok(Self {
            name: require_non_blank("name", &self.name)?,
            job_title: require_non_blank("jobTitle", &self.job_title)?,
            experience: normalize_optional(self.experience),
            email: validate_email(&self.email)?,
            telegram: normalize_optional(self.telegram),
        })
    }

    /// Materialize with zero workload
    #[must_use]
    pub fn into_mentor(self) -> Mentor {
        let now = Utc::now();
        Mentor {
            id: Uuid::new_v4(),
            name: self.name,
            job_title: self.job_title,
            experience: self.experience,
            workload: 0,
            email: self.email,
            telegram: self.telegram,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full admin override of a mentor, workload included
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorUpdate {
    /// Display name
    pub name: String,
    /// Job title
    pub job_title: String,
    /// Experience summary
    #[serde(default)]
    pub experience: Option<String>,
    /// Workload override
    pub workload: i64,
    /// Contact email
    pub email: String,
    /// Telegram handle
    #[serde(default)]
    pub telegram: Option<String>,
}

impl Mentor {
    /// Overwrite every editable field from an admin update
    ///
    /// # Errors
    ///
    /// Returns an error for blank required fields, malformed email, or out-of-range workload
    pub fn apply_update(&mut self, update: MentorUpdate) -> AppResult<()> {
        Self::validate_workload(update.workload)?;
        self.name = require_non_blank("name", &update.name)?;
        self.job_title = require_non_blank("jobTitle", &update.job_title)?;
        self.email = validate_email(&update.email)?;
        self.experience = normalize_optional(update.experience);
        self.telegram = normalize_optional(update.telegram);
        self.workload = update.workload;
        self.updated_at = Utc::now();
        Ok(())
    }
}
