// ABOUTME: Domain limits and user-facing error messages for the mentorship platform
// ABOUTME: Centralizes workload caps, plan limits, and validation thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Mentor capacity limits
pub mod workload {
    /// Hard cap on concurrent students per mentor
    pub const MAX_WORKLOAD: i64 = 5;

    /// Highest workload at which a mentor can still accept a student
    pub const MAX_ASSIGNABLE_WORKLOAD: i64 = MAX_WORKLOAD - 1;
}

/// Learning plan limits
pub mod plan {
    /// Maximum number of items in a single plan (item ids are 8-bit)
    pub const MAX_PLAN_ITEMS: usize = 255;
}

/// Feedback limits
pub mod feedback {
    /// Lowest accepted rating
    pub const MIN_RATING: i64 = 1;

    /// Highest accepted rating
    pub const MAX_RATING: i64 = 5;
}

/// Credential policy
pub mod credentials {
    /// Minimum password length in characters
    pub const MIN_PASSWORD_LENGTH: usize = 8;
}

/// User-facing domain error messages
pub mod messages {
    /// Registration with an email that already exists
    pub const USER_ALREADY_EXISTS: &str = "user with this email already exists";
    /// Login failure (identical for unknown email and wrong password)
    pub const INVALID_CREDENTIALS: &str = "invalid email or password";
    /// Mentor has no remaining capacity
    pub const MENTOR_NOT_AVAILABLE: &str = "mentor is not available (workload full)";
    /// Request approve on an approved request
    pub const REQUEST_ALREADY_APPROVED: &str = "request is already approved";
    /// Request reject on a rejected request
    pub const REQUEST_ALREADY_REJECTED: &str = "request is already rejected";
    /// Approve on a rejected request
    pub const CANNOT_APPROVE_REJECTED: &str = "cannot approve a rejected request";
    /// Reject on an approved request
    pub const CANNOT_REJECT_APPROVED: &str = "cannot reject an approved request";
    /// Assign on a request that is not approved
    pub const REQUEST_NOT_APPROVED: &str = "request must be approved before assigning mentor";
    /// Second learning process for one request
    pub const LEARNING_ALREADY_EXISTS: &str = "learning process already exists for this request";
    /// Mutation of a completed learning process
    pub const LEARNING_NOT_ACTIVE: &str = "learning process is not active";
    /// Rating outside the accepted range
    pub const INVALID_RATING: &str = "rating must be between 1 and 5";
    /// Plan item lookup miss
    pub const PLAN_ITEM_NOT_FOUND: &str = "plan item not found";
    /// Plan already holds the maximum number of items
    pub const PLAN_LIMIT_REACHED: &str = "learning plan item limit reached (255)";
    /// Password shorter than the policy minimum
    pub const WEAK_PASSWORD: &str = "password must be at least 8 characters";
    /// Malformed email address
    pub const INVALID_EMAIL: &str = "invalid email format";
    /// Workload outside 0..=5
    pub const INVALID_WORKLOAD: &str = "workload must be between 0 and 5";
}
