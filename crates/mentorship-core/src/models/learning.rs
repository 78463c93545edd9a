// ABOUTME: Learning process model: plan items, feedback, and the active -> completed lifecycle
// ABOUTME: All plan and notes mutations are rejected once a process is completed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Learning processes
//!
//! A learning process pairs one mentee with one mentor for an approved
//! training request. It owns an ordered plan of checklist items and, once
//! completed, a single piece of feedback.
//!
//! State machine:
//!
//! ```text
//! active --complete(rating, comment)--> completed
//! ```
//!
//! `end_date` and `feedback` are `Some` exactly when the status is
//! `Completed`. Every mutating method other than the admin override checks
//! [`LearningProcess::ensure_active`] first and leaves the value untouched on
//! error.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{normalize_optional, require_non_blank};
use crate::constants::feedback::{MAX_RATING, MIN_RATING};
use crate::constants::plan::MAX_PLAN_ITEMS;
use crate::errors::{AppError, AppResult};

/// Lifecycle status of a learning process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningStatus {
    /// Plan is being worked on
    #[default]
    Active,
    /// Finished with feedback (terminal)
    Completed,
}

impl LearningStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            _ => Self::Active,
        }
    }
}

/// One checklist entry in a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// Identifier, unique within the parent plan
    pub id: u8,
    /// Task description
    pub text: String,
    /// Done flag
    #[serde(default)]
    pub completed: bool,
}

/// Mentee feedback attached on completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Rating in `1..=5`
    pub rating: i64,
    /// Free-text comment
    pub comment: String,
}

impl Feedback {
    /// Validated feedback
    ///
    /// # Errors
    ///
    /// Returns `INVALID_RATING` outside `1..=5` and `MISSING_REQUIRED_FIELD` for a blank comment
    pub fn new(rating: i64, comment: &str) -> AppResult<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::invalid_rating(rating));
        }
        let comment = require_non_blank("comment", comment)?;
        Ok(Self { rating, comment })
    }
}

/// Check a full plan: every text non-blank, ids unique, size within limit
///
/// # Errors
///
/// Returns the first violation found
pub fn validate_plan(items: &[PlanItem]) -> AppResult<()> {
    if items.len() > MAX_PLAN_ITEMS {
        return Err(AppError::plan_limit_reached());
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.text.trim().is_empty() {
            return Err(AppError::missing_field("plan item text"));
        }
        if !seen.insert(item.id) {
            return Err(AppError::invalid_input(format!(
                "duplicate plan item id {}",
                item.id
            )));
        }
    }
    Ok(())
}

/// Engagement between one mentee and one mentor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProcess {
    /// Unique identifier
    pub id: Uuid,
    /// Originating training request
    pub request_id: Uuid,
    /// Mentee
    pub user_id: Uuid,
    /// Assigned mentor
    pub mentor_id: Uuid,
    /// Lifecycle status
    pub status: LearningStatus,
    /// Assignment time
    pub start_date: DateTime<Utc>,
    /// Completion time
    pub end_date: Option<DateTime<Utc>>,
    /// Ordered checklist
    pub plan: Vec<PlanItem>,
    /// Completion feedback
    pub feedback: Option<Feedback>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl LearningProcess {
    /// Fresh active process with an empty plan
    #[must_use]
    pub fn start(request_id: Uuid, user_id: Uuid, mentor_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            request_id,
            user_id,
            mentor_id,
            status: LearningStatus::Active,
            start_date: now,
            end_date: None,
            plan: Vec::new(),
            feedback: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Still accepting plan and notes changes
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == LearningStatus::Active
    }

    /// Guard for every normal mutation
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` once completed
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(AppError::learning_not_active())
        }
    }

    /// Next free item id: one past the highest, or the lowest gap after wrap-around
    ///
    /// # Errors
    ///
    /// Returns `PLAN_LIMIT_REACHED` when the plan already holds the maximum
    pub fn next_plan_item_id(&self) -> AppResult<u8> {
        if self.plan.len() >= MAX_PLAN_ITEMS {
            return Err(AppError::plan_limit_reached());
        }
        let max_id = self.plan.iter().map(|item| item.id).max().unwrap_or(0);
        if let Some(next) = max_id.checked_add(1) {
            return Ok(next);
        }
        let used: HashSet<u8> = self.plan.iter().map(|item| item.id).collect();
        (1..=u8::MAX)
            .find(|id| !used.contains(id))
            .ok_or_else(AppError::plan_limit_reached)
    }

    /// Append a new incomplete item and return its id
    ///
    /// # Errors
    ///
    /// Fails when not active, the text is blank, or the plan is full
    pub fn add_plan_item(&mut self, text: &str) -> AppResult<u8> {
        self.ensure_active()?;
        let text = require_non_blank("text", text)?;
        let id = self.next_plan_item_id()?;
        self.plan.push(PlanItem {
            id,
            text,
            completed: false,
        });
        self.touch();
        Ok(id)
    }

    fn item_mut(&mut self, item_id: u8) -> AppResult<&mut PlanItem> {
        self.plan
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| AppError::plan_item_not_found(item_id))
    }

    /// Set completion and, when `text` is non-blank, replace the text
    ///
    /// # Errors
    ///
    /// Fails when not active or the item does not exist
    pub fn update_plan_item(
        &mut self,
        item_id: u8,
        text: Option<&str>,
        completed: bool,
    ) -> AppResult<()> {
        self.ensure_active()?;
        let item = self.item_mut(item_id)?;
        if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
            text.clone_into(&mut item.text);
        }
        item.completed = completed;
        self.touch();
        Ok(())
    }

    /// Flip an item's completion flag and return the new value
    ///
    /// # Errors
    ///
    /// Fails when not active or the item does not exist
    pub fn toggle_plan_item(&mut self, item_id: u8) -> AppResult<bool> {
        self.ensure_active()?;
        let item = self.item_mut(item_id)?;
        item.completed = !item.completed;
        let completed = item.completed;
        self.touch();
        Ok(completed)
    }

    /// Delete an item, keeping the order of the rest
    ///
    /// # Errors
    ///
    /// Fails when not active or the item does not exist
    pub fn remove_plan_item(&mut self, item_id: u8) -> AppResult<()> {
        self.ensure_active()?;
        let index = self
            .plan
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| AppError::plan_item_not_found(item_id))?;
        self.plan.remove(index);
        self.touch();
        Ok(())
    }

    /// Replace the whole plan after validating every item
    ///
    /// # Errors
    ///
    /// Fails when not active or any item is invalid
    pub fn replace_plan(&mut self, items: Vec<PlanItem>) -> AppResult<()> {
        self.ensure_active()?;
        validate_plan(&items)?;
        self.plan = items
            .into_iter()
            .map(|item| PlanItem {
                text: item.text.trim().to_owned(),
                ..item
            })
            .collect();
        self.touch();
        Ok(())
    }

    /// Set notes; blank input clears them
    ///
    /// # Errors
    ///
    /// Returns `LEARNING_NOT_ACTIVE` once completed
    pub fn set_notes(&mut self, notes: Option<String>) -> AppResult<()> {
        self.ensure_active()?;
        self.notes = normalize_optional(notes);
        self.touch();
        Ok(())
    }

    /// The single terminal transition
    ///
    /// # Errors
    ///
    /// Fails when not active, on a rating outside `1..=5`, or a blank comment; nothing changes
    /// on error
    pub fn complete(&mut self, rating: i64, comment: &str) -> AppResult<()> {
        self.ensure_active()?;
        let feedback = Feedback::new(rating, comment)?;
        let now = Utc::now();
        self.status = LearningStatus::Completed;
        self.feedback = Some(feedback);
        self.end_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Items marked done
    #[must_use]
    pub fn completed_items_count(&self) -> usize {
        self.plan.iter().filter(|item| item.completed).count()
    }

    /// Percentage of completed items; `0.0` for an empty plan
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.plan.is_empty() {
            return 0.0;
        }
        self.completed_items_count() as f64 / self.plan.len() as f64 * 100.0
    }

    /// Administrative overwrite that skips the transition guards
    ///
    /// Structural invariants still hold afterwards: a valid plan, feedback and
    /// end date present exactly when completed.
    ///
    /// # Errors
    ///
    /// Fails when the override would break a structural invariant
    pub fn apply_override(&mut self, update: LearningOverride) -> AppResult<()> {
        validate_plan(&update.plan)?;
        let feedback = match (update.status, update.feedback) {
            (LearningStatus::Completed, Some(fb)) => Some(Feedback::new(fb.rating, &fb.comment)?),
            (LearningStatus::Completed, None) => {
                return Err(AppError::missing_field("feedback"));
            }
            (LearningStatus::Active, Some(_)) => {
                return Err(AppError::invalid_input(
                    "feedback is only allowed on completed learning processes",
                ));
            }
            (LearningStatus::Active, None) => None,
        };

        let now = Utc::now();
        self.end_date = match update.status {
            LearningStatus::Completed => Some(self.end_date.unwrap_or(now)),
            LearningStatus::Active => None,
        };
        self.status = update.status;
        self.plan = update.plan;
        self.feedback = feedback;
        self.notes = normalize_optional(update.notes);
        self.updated_at = now;
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Admin override payload for a learning process
#[derive(Debug, Clone, Deserialize)]
pub struct LearningOverride {
    /// Target status
    pub status: LearningStatus,
    /// Replacement plan
    #[serde(default)]
    pub plan: Vec<PlanItem>,
    /// Feedback, required when completed
    #[serde(default)]
    pub feedback: Option<Feedback>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request fields shown with a learning process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSummary {
    /// Requested topic
    pub topic: String,
    /// Request description
    pub description: String,
}

/// Mentee fields shown with a learning process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// Mentee name
    pub name: String,
}

/// Mentor fields shown with a learning process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorSummary {
    /// Mentor name
    pub name: String,
    /// Telegram handle
    pub telegram: Option<String>,
    /// Job title
    pub job_title: String,
    /// Experience summary
    pub experience: Option<String>,
}

/// Learning process joined with its request, mentee, and mentor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningDetails {
    /// The process itself
    #[serde(flatten)]
    pub learning: LearningProcess,
    /// Completion percentage
    pub progress: f64,
    /// Originating request
    pub request: RequestSummary,
    /// Mentee
    pub user: UserSummary,
    /// Mentor
    pub mentor: MentorSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn learning() -> LearningProcess {
        LearningProcess::start(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    fn item(id: u8, text: &str, completed: bool) -> PlanItem {
        PlanItem {
            id,
            text: text.to_owned(),
            completed,
        }
    }

    #[test]
    fn test_start_is_active_and_empty() {
        let lp = learning();
        assert!(lp.is_active());
        assert!(lp.plan.is_empty());
        assert!(lp.end_date.is_none());
        assert!(lp.feedback.is_none());
        assert!(lp.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_item_ids_are_max_plus_one() {
        let mut lp = learning();
        assert_eq!(lp.add_plan_item("read the book").unwrap(), 1);
        assert_eq!(lp.add_plan_item("write a CLI").unwrap(), 2);
        assert_eq!(lp.add_plan_item("ship it").unwrap(), 3);
        lp.remove_plan_item(2).unwrap();
        assert_eq!(lp.add_plan_item("review").unwrap(), 4);
        assert_eq!(
            lp.plan.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
    }

    #[test]
    fn test_plan_limit() {
        let mut lp = learning();
        for n in 0..MAX_PLAN_ITEMS {
            lp.add_plan_item(&format!("task {n}")).unwrap();
        }
        let err = lp.add_plan_item("one too many").unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanLimitReached);
        assert_eq!(lp.plan.len(), MAX_PLAN_ITEMS);
    }

    #[test]
    fn test_item_id_reuses_gap_after_wraparound() {
        let mut lp = learning();
        lp.replace_plan(vec![
            item(1, "a", false),
            item(255, "b", false),
        ])
        .unwrap();
        assert_eq!(lp.add_plan_item("c").unwrap(), 2);
    }

    #[test]
    fn test_progress() {
        let mut lp = learning();
        for text in ["a", "b", "c"] {
            lp.add_plan_item(text).unwrap();
        }
        lp.toggle_plan_item(2).unwrap();
        assert!((lp.progress() - 100.0 / 3.0).abs() < 1e-9);

        lp.update_plan_item(1, None, true).unwrap();
        lp.update_plan_item(3, Some("c2"), true).unwrap();
        assert!((lp.progress() - 100.0).abs() < 1e-9);
        assert_eq!(lp.plan[2].text, "c2");
    }

    #[test]
    fn test_update_plan_item_keeps_text_when_blank() {
        let mut lp = learning();
        lp.add_plan_item("original").unwrap();
        lp.update_plan_item(1, Some("   "), true).unwrap();
        assert_eq!(lp.plan[0].text, "original");
        assert!(lp.plan[0].completed);

        let err = lp.update_plan_item(9, None, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanItemNotFound);
    }

    #[test]
    fn test_toggle_pairs_restore_state() {
        let mut lp = learning();
        for n in 0..4 {
            lp.add_plan_item(&format!("task {n}")).unwrap();
        }
        for id in 1..=4 {
            lp.toggle_plan_item(id).unwrap();
        }
        assert_eq!(lp.completed_items_count(), 4);
        for id in 1..=4 {
            lp.toggle_plan_item(id).unwrap();
        }
        assert_eq!(lp.completed_items_count(), 0);
    }

    #[test]
    fn test_notes_blank_means_none() {
        let mut lp = learning();
        lp.set_notes(Some("week 1 done".to_owned())).unwrap();
        assert_eq!(lp.notes.as_deref(), Some("week 1 done"));
        lp.set_notes(Some(String::new())).unwrap();
        assert_eq!(lp.notes, None);
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut lp = learning();
        lp.add_plan_item("a").unwrap();
        lp.complete(5, "great").unwrap();

        assert_eq!(lp.status, LearningStatus::Completed);
        assert!(lp.end_date.is_some());
        assert_eq!(lp.feedback.as_ref().map(|f| f.rating), Some(5));

        let before = lp.plan.clone();
        for err in [
            lp.add_plan_item("b").unwrap_err(),
            lp.toggle_plan_item(1).unwrap_err(),
            lp.update_plan_item(1, Some("x"), true).unwrap_err(),
            lp.remove_plan_item(1).unwrap_err(),
            lp.replace_plan(Vec::new()).unwrap_err(),
            lp.set_notes(Some("late".to_owned())).unwrap_err(),
            lp.complete(4, "again").unwrap_err(),
        ] {
            assert_eq!(err.code, ErrorCode::LearningNotActive);
        }
        assert_eq!(lp.plan, before);
        assert_eq!(lp.notes, None);
    }

    #[test]
    fn test_invalid_rating_mutates_nothing() {
        let mut lp = learning();
        for rating in [0, 6, -1] {
            let err = lp.complete(rating, "meh").unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidRating);
        }
        assert!(lp.is_active());
        assert!(lp.feedback.is_none());
        assert!(lp.end_date.is_none());

        let err = lp.complete(3, "  ").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn test_replace_plan_validation() {
        let mut lp = learning();
        let dup = vec![
            item(1, "a", false),
            item(1, "b", true),
        ];
        assert_eq!(lp.replace_plan(dup).unwrap_err().code, ErrorCode::InvalidInput);

        let blank = vec![item(1, " ", false)];
        assert_eq!(
            lp.replace_plan(blank).unwrap_err().code,
            ErrorCode::MissingRequiredField
        );
        assert!(lp.plan.is_empty());
    }

    #[test]
    fn test_override_keeps_structural_invariants() {
        let mut lp = learning();
        lp.complete(4, "good").unwrap();

        lp.apply_override(LearningOverride {
            status: LearningStatus::Active,
            plan: vec![item(7, "redo", false)],
            feedback: None,
            notes: Some("reopened".to_owned()),
        })
        .unwrap();
        assert!(lp.is_active());
        assert!(lp.end_date.is_none());
        assert!(lp.feedback.is_none());

        let err = lp
            .apply_override(LearningOverride {
                status: LearningStatus::Completed,
                plan: Vec::new(),
                feedback: None,
                notes: None,
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert!(lp.is_active());
    }

    #[test]
    fn test_details_flatten_serialization() {
        let lp = learning();
        let details = LearningDetails {
            progress: lp.progress(),
            learning: lp,
            request: RequestSummary { topic: "Go".to_owned(), description: "basics".to_owned() },
            user: UserSummary { name: "Alice".to_owned() },
            mentor: MentorSummary {
                name: "Maria".to_owned(),
                telegram: None,
                job_title: "Staff".to_owned(),
                experience: None,
            },
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["request"]["topic"], "Go");
        assert_eq!(json["mentor"]["jobTitle"], "Staff");
        assert!(json["requestId"].is_string());
    }
}
