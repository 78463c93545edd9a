// ABOUTME: Training request repository implementation
// ABOUTME: Status changes are guarded on the stored status so concurrent reviews cannot both win
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::RequestRepository;
use crate::database::{decode_timestamp, decode_uuid, encode_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{RequestStatus, TrainingRequest};

const REQUEST_COLUMNS: &str = "id, user_id, topic, description, status, created_at, updated_at";

/// `SQLite` implementation of `RequestRepository`
pub struct RequestRepositoryImpl {
    db: Database,
}

impl RequestRepositoryImpl {
    /// Create a new `RequestRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

/// `pending -> to`, only if the stored row is still pending
///
/// # Errors
///
/// Returns `INVALID_STATE_TRANSITION` when no pending row matched
pub async fn transition_from_pending_on(
    conn: &mut SqliteConnection,
    request_id: Uuid,
    to: RequestStatus,
) -> AppResult<()> {
    let done = sqlx::query(
        r"
        UPDATE training_requests
        SET status = $1, updated_at = $2
        WHERE id = $3 AND status = 'pending'
        ",
    )
    .bind(to.as_str())
    .bind(encode_timestamp(Utc::now()))
    .bind(request_id.to_string())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to update request status: {e}")))?;

    if done.rows_affected() == 0 {
        return Err(AppError::invalid_transition("request is no longer pending")
            .with_resource_id(request_id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl RequestRepository for RequestRepositoryImpl {
    async fn create(&self, request: &TrainingRequest) -> AppResult<()> {
        let started = Instant::now();
        let result = sqlx::query(
            r"
            INSERT INTO training_requests (id, user_id, topic, description, status,
                                           created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(request.id.to_string())
        .bind(request.user_id.to_string())
        .bind(&request.topic)
        .bind(&request.description)
        .bind(request.status.as_str())
        .bind(encode_timestamp(request.created_at))
        .bind(encode_timestamp(request.updated_at))
        .execute(self.db.pool())
        .await
        .map(|_| ())
        .map_err(|e| AppError::database(format!("Failed to create training request: {e}")));
        self.db.observe("create_request", started, &result);
        if result.is_ok() {
            self.db
                .metrics()
                .record_training_request(request.status.as_str());
        }
        result
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<TrainingRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM training_requests WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch training request: {e}")))?;
        row.as_ref().map(row_to_request).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<TrainingRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM training_requests WHERE user_id = $1 \
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list user requests: {e}")))?;
        rows.iter().map(row_to_request).collect()
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<TrainingRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM training_requests WHERE ($1 IS NULL OR status = $1) \
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list requests: {e}")))?;
        rows.iter().map(row_to_request).collect()
    }

    async fn update_content(&self, request: &TrainingRequest) -> AppResult<()> {
        let started = Instant::now();
        let result = sqlx::query(
            r"
            UPDATE training_requests
            SET topic = $1, description = $2, updated_at = $3
            WHERE id = $4
            ",
        )
        .bind(&request.topic)
        .bind(&request.description)
        .bind(encode_timestamp(request.updated_at))
        .bind(request.id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update training request: {e}")))
        .and_then(|done| {
            if done.rows_affected() == 0 {
                Err(AppError::not_found("Training request")
                    .with_resource_id(request.id.to_string()))
            } else {
                Ok(())
            }
        });
        self.db.observe("update_request", started, &result);
        result
    }

    async fn transition_from_pending(&self, id: Uuid, to: RequestStatus) -> AppResult<()> {
        let started = Instant::now();
        let mut conn = self
            .db
            .pool()
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        let result = transition_from_pending_on(&mut conn, id, to).await;
        drop(conn);

        self.db.observe("transition_request", started, &result);
        if result.is_ok() {
            self.db.metrics().record_training_request(to.as_str());
        }
        result
    }
}

fn row_to_request(row: &SqliteRow) -> AppResult<TrainingRequest> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(TrainingRequest {
        id: decode_uuid(&id)?,
        user_id: decode_uuid(&user_id)?,
        topic: row.try_get("topic")?,
        description: row.try_get("description")?,
        status: RequestStatus::parse(&status)
            .map_err(|e| AppError::internal(format!("Corrupt request status: {}", e.message)))?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}
