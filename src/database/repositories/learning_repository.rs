// ABOUTME: Learning process repository implementation
// ABOUTME: Assignment, completion, and status overrides run as single transactions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::mentor_repository::{decrement_workload_on, increment_workload_on};
use super::request_repository::transition_from_pending_on;
use super::LearningRepository;
use crate::database::transactions::{retry_transaction, TransactionGuard};
use crate::database::{
    decode_timestamp, decode_uuid, encode_timestamp, is_unique_violation, Database,
};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Feedback, LearningDetails, LearningProcess, LearningStatus, MentorSummary, PlanItem,
    RequestStatus, RequestSummary, UserSummary,
};

/// Attempts for transactions that hit a locked database
const TRANSACTION_RETRIES: u32 = 3;

const LEARNING_COLUMNS: &str = "lp.id AS id, lp.request_id AS request_id, \
     lp.user_id AS user_id, lp.mentor_id AS mentor_id, lp.status AS status, \
     lp.start_date AS start_date, lp.end_date AS end_date, lp.plan AS plan, \
     lp.feedback_rating AS feedback_rating, lp.feedback_comment AS feedback_comment, \
     lp.notes AS notes, lp.created_at AS created_at, lp.updated_at AS updated_at";

const DETAIL_JOINS: &str = "tr.topic AS request_topic, tr.description AS request_description, \
     u.name AS user_name, m.name AS mentor_name, m.telegram AS mentor_telegram, \
     m.job_title AS mentor_job_title, m.experience AS mentor_experience \
     FROM learning_processes lp \
     JOIN training_requests tr ON tr.id = lp.request_id \
     JOIN users u ON u.id = lp.user_id \
     JOIN mentors m ON m.id = lp.mentor_id";

/// `SQLite` implementation of `LearningRepository`
pub struct LearningRepositoryImpl {
    db: Database,
}

impl LearningRepositoryImpl {
    /// Create a new `LearningRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    async fn assign_once(
        &self,
        learning: &LearningProcess,
        approve_request: bool,
    ) -> AppResult<i64> {
        let tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx, "assign_mentor");

        let outcome = Self::assign_steps(guard.executor()?, learning, approve_request).await;
        match outcome {
            Ok(workload) => {
                guard.commit().await?;
                Ok(workload)
            }
            Err(e) => Err(guard.abort(e).await),
        }
    }

    async fn assign_steps(
        conn: &mut SqliteConnection,
        learning: &LearningProcess,
        approve_request: bool,
    ) -> AppResult<i64> {
        if approve_request {
            transition_from_pending_on(&mut *conn, learning.request_id, RequestStatus::Approved)
                .await?;
        }

        sqlx::query(
            r"
            INSERT INTO learning_processes (id, request_id, user_id, mentor_id, status,
                                            start_date, end_date, plan, feedback_rating,
                                            feedback_comment, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, NULL, NULL, $8, $9, $10)
            ",
        )
        .bind(learning.id.to_string())
        .bind(learning.request_id.to_string())
        .bind(learning.user_id.to_string())
        .bind(learning.mentor_id.to_string())
        .bind(learning.status.as_str())
        .bind(encode_timestamp(learning.start_date))
        .bind(serde_json::to_string(&learning.plan)?)
        .bind(&learning.notes)
        .bind(encode_timestamp(learning.created_at))
        .bind(encode_timestamp(learning.updated_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::learning_already_exists()
            } else {
                AppError::database(format!("Failed to create learning process: {e}"))
            }
        })?;

        increment_workload_on(conn, learning.mentor_id)
            .await?
            .ok_or_else(AppError::mentor_not_available)
    }

    async fn complete_once(&self, learning: &LearningProcess) -> AppResult<i64> {
        let tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx, "complete_learning");

        let outcome = Self::complete_steps(guard.executor()?, learning).await;
        match outcome {
            Ok(workload) => {
                guard.commit().await?;
                Ok(workload)
            }
            Err(e) => Err(guard.abort(e).await),
        }
    }

    async fn complete_steps(
        conn: &mut SqliteConnection,
        learning: &LearningProcess,
    ) -> AppResult<i64> {
        let feedback = learning
            .feedback
            .as_ref()
            .ok_or_else(|| AppError::internal("Completed learning process without feedback"))?;
        let end_date = learning
            .end_date
            .ok_or_else(|| AppError::internal("Completed learning process without end date"))?;

        let done = sqlx::query(
            r"
            UPDATE learning_processes
            SET status = 'completed', end_date = $1, feedback_rating = $2,
                feedback_comment = $3, updated_at = $4
            WHERE id = $5 AND status = 'active'
            ",
        )
        .bind(encode_timestamp(end_date))
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(encode_timestamp(learning.updated_at))
        .bind(learning.id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete learning process: {e}")))?;

        if done.rows_affected() == 0 {
            return Err(AppError::learning_not_active());
        }

        decrement_workload_on(conn, learning.mentor_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Mentor").with_resource_id(learning.mentor_id.to_string())
            })
    }

    async fn overwrite_once(
        &self,
        learning: &LearningProcess,
        previous: LearningStatus,
    ) -> AppResult<Option<i64>> {
        let tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx, "overwrite_learning");

        let outcome = Self::overwrite_steps(guard.executor()?, learning, previous).await;
        match outcome {
            Ok(workload) => {
                guard.commit().await?;
                Ok(workload)
            }
            Err(e) => Err(guard.abort(e).await),
        }
    }

    /// Status flips move one workload slot: reopening takes one, closing releases one
    async fn overwrite_steps(
        conn: &mut SqliteConnection,
        learning: &LearningProcess,
        previous: LearningStatus,
    ) -> AppResult<Option<i64>> {
        let done = sqlx::query(
            r"
            UPDATE learning_processes
            SET status = $1, end_date = $2, plan = $3, feedback_rating = $4,
                feedback_comment = $5, notes = $6, updated_at = $7
            WHERE id = $8 AND status = $9
            ",
        )
        .bind(learning.status.as_str())
        .bind(learning.end_date.map(encode_timestamp))
        .bind(serde_json::to_string(&learning.plan)?)
        .bind(learning.feedback.as_ref().map(|f| f.rating))
        .bind(learning.feedback.as_ref().map(|f| f.comment.as_str()))
        .bind(&learning.notes)
        .bind(encode_timestamp(learning.updated_at))
        .bind(learning.id.to_string())
        .bind(previous.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to overwrite learning process: {e}")))?;

        if done.rows_affected() == 0 {
            return Err(AppError::invalid_transition(
                "learning process status changed concurrently",
            ));
        }

        match (previous, learning.status) {
            (LearningStatus::Completed, LearningStatus::Active) => {
                increment_workload_on(conn, learning.mentor_id)
                    .await?
                    .map(Some)
                    .ok_or_else(AppError::mentor_not_available)
            }
            (LearningStatus::Active, LearningStatus::Completed) => {
                decrement_workload_on(conn, learning.mentor_id)
                    .await?
                    .map(Some)
                    .ok_or_else(|| {
                        AppError::not_found("Mentor")
                            .with_resource_id(learning.mentor_id.to_string())
                    })
            }
            _ => Ok(None),
        }
    }

    /// Distinguish "gone" from "no longer active" after a guarded update matched nothing
    async fn not_active_or_missing(&self, id: Uuid) -> AppError {
        match self.get_by_id(id).await {
            Ok(Some(_)) => AppError::learning_not_active(),
            Ok(None) => AppError::not_found("Learning process").with_resource_id(id.to_string()),
            Err(e) => e,
        }
    }

    async fn fetch_details(&self, clause: &str, value: String) -> AppResult<Vec<LearningDetails>> {
        let sql = format!(
            "SELECT {LEARNING_COLUMNS}, {DETAIL_JOINS} WHERE {clause} \
             ORDER BY lp.created_at DESC, lp.rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch learning details: {e}")))?;
        rows.iter().map(row_to_details).collect()
    }

    async fn fetch_one(&self, clause: &str, value: String) -> AppResult<Option<LearningProcess>> {
        let sql = format!("SELECT {LEARNING_COLUMNS} FROM learning_processes lp WHERE {clause}");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch learning process: {e}")))?;
        row.as_ref().map(row_to_learning).transpose()
    }
}

#[async_trait]
impl LearningRepository for LearningRepositoryImpl {
    async fn create_with_assignment(
        &self,
        learning: &LearningProcess,
        approve_request: bool,
    ) -> AppResult<i64> {
        let started = Instant::now();
        let result = retry_transaction(
            move || self.assign_once(learning, approve_request),
            TRANSACTION_RETRIES,
        )
        .await;
        self.db.observe("assign_mentor", started, &result);

        if let Ok(workload) = result {
            let metrics = self.db.metrics();
            if approve_request {
                metrics.record_training_request(RequestStatus::Approved.as_str());
            }
            metrics.learning_started();
            metrics.set_mentor_workload(learning.mentor_id, workload);
        }
        result
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<LearningProcess>> {
        self.fetch_one("lp.id = $1", id.to_string()).await
    }

    async fn get_by_request_id(&self, request_id: Uuid) -> AppResult<Option<LearningProcess>> {
        self.fetch_one("lp.request_id = $1", request_id.to_string())
            .await
    }

    async fn get_details(&self, id: Uuid) -> AppResult<Option<LearningDetails>> {
        Ok(self
            .fetch_details("lp.id = $1", id.to_string())
            .await?
            .into_iter()
            .next())
    }

    async fn list_details_by_user(&self, user_id: Uuid) -> AppResult<Vec<LearningDetails>> {
        self.fetch_details("lp.user_id = $1", user_id.to_string())
            .await
    }

    async fn list_details_by_mentor(&self, mentor_id: Uuid) -> AppResult<Vec<LearningDetails>> {
        self.fetch_details("lp.mentor_id = $1", mentor_id.to_string())
            .await
    }

    async fn update_plan(&self, id: Uuid, plan: &[PlanItem]) -> AppResult<()> {
        let started = Instant::now();
        let plan_json = serde_json::to_string(plan)?;
        let done = sqlx::query(
            r"
            UPDATE learning_processes
            SET plan = $1, updated_at = $2
            WHERE id = $3 AND status = 'active'
            ",
        )
        .bind(plan_json)
        .bind(encode_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update learning plan: {e}")));

        let result = match done {
            Ok(done) if done.rows_affected() == 0 => Err(self.not_active_or_missing(id).await),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        self.db.observe("update_learning_plan", started, &result);
        result
    }

    async fn update_notes(&self, id: Uuid, notes: Option<&str>) -> AppResult<()> {
        let started = Instant::now();
        let done = sqlx::query(
            r"
            UPDATE learning_processes
            SET notes = $1, updated_at = $2
            WHERE id = $3 AND status = 'active'
            ",
        )
        .bind(notes)
        .bind(encode_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update learning notes: {e}")));

        let result = match done {
            Ok(done) if done.rows_affected() == 0 => Err(self.not_active_or_missing(id).await),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        self.db.observe("update_learning_notes", started, &result);
        result
    }

    async fn complete(&self, learning: &LearningProcess) -> AppResult<i64> {
        let started = Instant::now();
        let result =
            retry_transaction(move || self.complete_once(learning), TRANSACTION_RETRIES).await;
        self.db.observe("complete_learning", started, &result);

        if let Ok(workload) = result {
            let metrics = self.db.metrics();
            if let Some(feedback) = &learning.feedback {
                metrics.learning_completed(feedback.rating);
            }
            metrics.set_mentor_workload(learning.mentor_id, workload);
        }
        result
    }

    async fn overwrite(
        &self,
        learning: &LearningProcess,
        previous: LearningStatus,
    ) -> AppResult<Option<i64>> {
        let started = Instant::now();
        let result = retry_transaction(
            move || self.overwrite_once(learning, previous),
            TRANSACTION_RETRIES,
        )
        .await;
        self.db.observe("overwrite_learning", started, &result);

        if let Ok(Some(workload)) = result {
            let metrics = self.db.metrics();
            match (&learning.status, &learning.feedback) {
                (LearningStatus::Active, _) => metrics.learning_started(),
                (LearningStatus::Completed, Some(feedback)) => {
                    metrics.learning_completed(feedback.rating);
                }
                (LearningStatus::Completed, None) => {}
            }
            metrics.set_mentor_workload(learning.mentor_id, workload);
        }
        result
    }
}

fn row_to_learning(row: &SqliteRow) -> AppResult<LearningProcess> {
    let id: String = row.try_get("id")?;
    let request_id: String = row.try_get("request_id")?;
    let user_id: String = row.try_get("user_id")?;
    let mentor_id: String = row.try_get("mentor_id")?;
    let status: String = row.try_get("status")?;
    let start_date: String = row.try_get("start_date")?;
    let end_date: Option<String> = row.try_get("end_date")?;
    let plan_json: String = row.try_get("plan")?;
    let rating: Option<i64> = row.try_get("feedback_rating")?;
    let comment: Option<String> = row.try_get("feedback_comment")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let plan: Vec<PlanItem> = serde_json::from_str(&plan_json)?;
    let feedback = match (rating, comment) {
        (Some(rating), Some(comment)) => Some(Feedback { rating, comment }),
        _ => None,
    };

    Ok(LearningProcess {
        id: decode_uuid(&id)?,
        request_id: decode_uuid(&request_id)?,
        user_id: decode_uuid(&user_id)?,
        mentor_id: decode_uuid(&mentor_id)?,
        status: LearningStatus::parse(&status),
        start_date: decode_timestamp(&start_date)?,
        end_date: end_date.as_deref().map(decode_timestamp).transpose()?,
        plan,
        feedback,
        notes: row.try_get("notes")?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}

fn row_to_details(row: &SqliteRow) -> AppResult<LearningDetails> {
    let learning = row_to_learning(row)?;
    Ok(LearningDetails {
        progress: learning.progress(),
        learning,
        request: RequestSummary {
            topic: row.try_get("request_topic")?,
            description: row.try_get("request_description")?,
        },
        user: UserSummary {
            name: row.try_get("user_name")?,
        },
        mentor: MentorSummary {
            name: row.try_get("mentor_name")?,
            telegram: row.try_get("mentor_telegram")?,
            job_title: row.try_get("mentor_job_title")?,
            experience: row.try_get("mentor_experience")?,
        },
    })
}
