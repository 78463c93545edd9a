// ABOUTME: Mentor repository implementation with guarded workload counters
// ABOUTME: Increment and decrement are single guarded UPDATE statements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::MentorRepository;
use crate::constants::workload::MAX_ASSIGNABLE_WORKLOAD;
use crate::database::{decode_timestamp, decode_uuid, encode_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::Mentor;

const MENTOR_COLUMNS: &str =
    "id, name, job_title, experience, workload, email, telegram, created_at, updated_at";

/// `SQLite` implementation of `MentorRepository`
pub struct MentorRepositoryImpl {
    db: Database,
}

impl MentorRepositoryImpl {
    /// Create a new `MentorRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

/// `workload + 1` only while under the cap; `None` when the guard rejected it
///
/// # Errors
///
/// Returns a database error if the statement fails
pub async fn increment_workload_on(
    conn: &mut SqliteConnection,
    mentor_id: Uuid,
) -> AppResult<Option<i64>> {
    let row = sqlx::query(
        r"
        UPDATE mentors
        SET workload = workload + 1, updated_at = $1
        WHERE id = $2 AND workload <= $3
        RETURNING workload
        ",
    )
    .bind(encode_timestamp(Utc::now()))
    .bind(mentor_id.to_string())
    .bind(MAX_ASSIGNABLE_WORKLOAD)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to increment mentor workload: {e}")))?;

    row.map(|r| r.try_get::<i64, _>("workload"))
        .transpose()
        .map_err(AppError::from)
}

/// `workload - 1` with a floor of zero; `None` when the mentor does not exist
///
/// # Errors
///
/// Returns a database error if the statement fails
pub async fn decrement_workload_on(
    conn: &mut SqliteConnection,
    mentor_id: Uuid,
) -> AppResult<Option<i64>> {
    let row = sqlx::query(
        r"
        UPDATE mentors
        SET workload = MAX(workload - 1, 0), updated_at = $1
        WHERE id = $2
        RETURNING workload
        ",
    )
    .bind(encode_timestamp(Utc::now()))
    .bind(mentor_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to decrement mentor workload: {e}")))?;

    row.map(|r| r.try_get::<i64, _>("workload"))
        .transpose()
        .map_err(AppError::from)
}

#[async_trait]
impl MentorRepository for MentorRepositoryImpl {
    async fn create(&self, mentor: &Mentor) -> AppResult<()> {
        let started = Instant::now();
        let result = sqlx::query(
            r"
            INSERT INTO mentors (id, name, job_title, experience, workload, email, telegram,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(mentor.id.to_string())
        .bind(&mentor.name)
        .bind(&mentor.job_title)
        .bind(&mentor.experience)
        .bind(mentor.workload)
        .bind(&mentor.email)
        .bind(&mentor.telegram)
        .bind(encode_timestamp(mentor.created_at))
        .bind(encode_timestamp(mentor.updated_at))
        .execute(self.db.pool())
        .await
        .map(|_| ())
        .map_err(|e| AppError::database(format!("Failed to create mentor: {e}")));
        self.db.observe("create_mentor", started, &result);
        if result.is_ok() {
            self.db.metrics().set_mentor_workload(mentor.id, mentor.workload);
        }
        result
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Mentor>> {
        let sql = format!("SELECT {MENTOR_COLUMNS} FROM mentors WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch mentor: {e}")))?;
        row.as_ref().map(row_to_mentor).transpose()
    }

    async fn list(&self, max_workload: Option<i64>) -> AppResult<Vec<Mentor>> {
        let sql = format!(
            "SELECT {MENTOR_COLUMNS} FROM mentors WHERE ($1 IS NULL OR workload <= $1) \
             ORDER BY workload ASC, name ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(max_workload)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list mentors: {e}")))?;
        rows.iter().map(row_to_mentor).collect()
    }

    async fn update(&self, mentor: &Mentor) -> AppResult<()> {
        let started = Instant::now();
        let result = sqlx::query(
            r"
            UPDATE mentors
            SET name = $1, job_title = $2, experience = $3, workload = $4, email = $5,
                telegram = $6, updated_at = $7
            WHERE id = $8
            ",
        )
        .bind(&mentor.name)
        .bind(&mentor.job_title)
        .bind(&mentor.experience)
        .bind(mentor.workload)
        .bind(&mentor.email)
        .bind(&mentor.telegram)
        .bind(encode_timestamp(mentor.updated_at))
        .bind(mentor.id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update mentor: {e}")))
        .and_then(|done| {
            if done.rows_affected() == 0 {
                Err(AppError::not_found("Mentor").with_resource_id(mentor.id.to_string()))
            } else {
                Ok(())
            }
        });
        self.db.observe("update_mentor", started, &result);
        if result.is_ok() {
            self.db.metrics().set_mentor_workload(mentor.id, mentor.workload);
        }
        result
    }

    async fn increment_workload(&self, id: Uuid) -> AppResult<i64> {
        let started = Instant::now();
        let mut conn = self
            .db
            .pool()
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        let updated = increment_workload_on(&mut conn, id).await;
        drop(conn);

        let result = match updated {
            Ok(Some(workload)) => Ok(workload),
            Ok(None) => match self.get_by_id(id).await? {
                Some(_) => Err(AppError::mentor_not_available()),
                None => Err(AppError::not_found("Mentor").with_resource_id(id.to_string())),
            },
            Err(e) => Err(e),
        };
        self.db.observe("increment_mentor_workload", started, &result);
        if let Ok(workload) = result {
            self.db.metrics().set_mentor_workload(id, workload);
        }
        result
    }

    async fn decrement_workload(&self, id: Uuid) -> AppResult<i64> {
        let started = Instant::now();
        let mut conn = self
            .db
            .pool()
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        let updated = decrement_workload_on(&mut conn, id).await;
        drop(conn);

        let result = updated.and_then(|workload| {
            workload.ok_or_else(|| AppError::not_found("Mentor").with_resource_id(id.to_string()))
        });
        self.db.observe("decrement_mentor_workload", started, &result);
        if let Ok(workload) = result {
            self.db.metrics().set_mentor_workload(id, workload);
        }
        result
    }
}

fn row_to_mentor(row: &SqliteRow) -> AppResult<Mentor> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Mentor {
        id: decode_uuid(&id)?,
        name: row.try_get("name")?,
        job_title: row.try_get("job_title")?,
        experience: row.try_get("experience")?,
        workload: row.try_get("workload")?,
        email: row.try_get("email")?,
        telegram: row.try_get("telegram")?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}
