// ABOUTME: User account management repository implementation
// ABOUTME: Handles user creation, retrieval, listing, and profile/role updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Instant;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::UserRepository;
use crate::database::{
    decode_timestamp, decode_uuid, encode_timestamp, is_unique_violation, Database,
};
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::permissions::UserRole;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, department, job_title, \
     telegram, created_at, updated_at";

/// `SQLite` implementation of `UserRepository`
pub struct UserRepositoryImpl {
    db: Database,
}

impl UserRepositoryImpl {
    /// Create a new `UserRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch_one_where(&self, clause: &str, value: String) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch user: {e}")))?;
        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, user: &User) -> AppResult<()> {
        let started = Instant::now();
        let result = sqlx::query(
            r"
            INSERT INTO users (id, name, email, password_hash, role, department, job_title,
                               telegram, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(&user.job_title)
        .bind(&user.telegram)
        .bind(encode_timestamp(user.created_at))
        .bind(encode_timestamp(user.updated_at))
        .execute(self.db.pool())
        .await
        .map(|_| ())
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::user_already_exists()
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        });
        self.db.observe("create_user", started, &result);
        result
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.fetch_one_where("id = $1", id.to_string()).await
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.fetch_one_where("email = $1", email.to_owned()).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;
        rows.iter().map(row_to_user).collect()
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let started = Instant::now();
        let result = sqlx::query(
            r"
            UPDATE users
            SET name = $1, role = $2, department = $3, job_title = $4, telegram = $5,
                updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(&user.job_title)
        .bind(&user.telegram)
        .bind(encode_timestamp(user.updated_at))
        .bind(user.id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update user: {e}")))
        .and_then(|done| {
            if done.rows_affected() == 0 {
                Err(AppError::not_found("User").with_resource_id(user.id.to_string()))
            } else {
                Ok(())
            }
        });
        self.db.observe("update_user", started, &result);
        result
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(User {
        id: decode_uuid(&id)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: UserRole::parse(&role),
        department: row.try_get("department")?,
        job_title: row.try_get("job_title")?,
        telegram: row.try_get("telegram")?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}
