// ABOUTME: Transaction guard with logged rollback and a retry helper for locked-database errors
// ABOUTME: Used by the repository operations that span several tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management
//!
//! Mentor assignment and learning completion each touch two tables. They run
//! inside a [`TransactionGuard`]: every statement goes through
//! [`TransactionGuard::executor`], and anything short of
//! [`TransactionGuard::commit`] rolls the whole unit back.

use std::future::Future;
use std::time::Duration;

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Retry an operation that failed because `SQLite` was busy or locked
///
/// Domain errors and anything else non-transient are returned immediately.
///
/// # Errors
///
/// Returns the last error after `max_retries` attempts, or the first
/// non-retryable error
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_retries: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_retries || !is_retryable_error(&e) {
                    return Err(e);
                }
                // Exponential backoff: 20ms, 40ms, 80ms, ...
                let backoff_ms = 10 * (1_u64 << attempts);
                warn!(
                    attempt = attempts,
                    max_retries = max_retries,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction failed with retryable error, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

fn is_retryable_error(error: &AppError) -> bool {
    if error.code != ErrorCode::DatabaseError {
        return false;
    }
    let message = error.message.to_lowercase();
    message.contains("database is locked") || message.contains("busy")
}

/// RAII guard for a `SQLite` transaction; rolls back unless committed
pub struct TransactionGuard<'c> {
    transaction: Option<Transaction<'c, Sqlite>>,
    operation: &'static str,
}

impl<'c> TransactionGuard<'c> {
    /// Wrap a freshly started transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, Sqlite>, operation: &'static str) -> Self {
        debug!(operation, "Transaction started");
        Self {
            transaction: Some(transaction),
            operation,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed - cannot commit"))?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        debug!(operation = self.operation, "Transaction committed");
        Ok(())
    }

    /// Roll back because of `cause`, log once, and hand the cause back
    pub async fn abort(mut self, cause: AppError) -> AppError {
        if let Some(tx) = self.transaction.take() {
            warn!(
                operation = self.operation,
                code = ?cause.code,
                reason = %cause.message,
                "Rolling back transaction"
            );
            if let Err(e) = tx.rollback().await {
                error!(operation = self.operation, error = %e, "Transaction rollback failed");
            }
        }
        cause
    }

    /// Connection to run statements on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed or rolled back
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            // sqlx rolls back on drop; log it for observability
            warn!(
                operation = self.operation,
                "Transaction dropped without commit - rolled back"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_retry_stops_on_domain_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: AppResult<()> = retry_transaction(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::mentor_not_available())
            },
            3,
        )
        .await;
        assert_eq!(result.unwrap_err().code, ErrorCode::MentorNotAvailable);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_locked_database() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_transaction(
            move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AppError::database("database is locked"))
                } else {
                    Ok(7)
                }
            },
            3,
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
