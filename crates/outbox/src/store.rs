//! Outbox task queries.
//!
//! A task is due iff `status IN ('pending', 'sending')` and
//! `next_attempt_at <= now`. Tasks stuck in `sending` (process died between
//! claim and finalize) satisfy the predicate again on the next poll, which
//! keeps delivery at-least-once.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::payload::NotificationPayload;
use herald_common::types::OutboxTask;

/// Data access for `outbox_tasks`.
pub struct OutboxStore;

impl OutboxStore {
    /// Insert a new pending task inside the caller's transaction.
    ///
    /// The row commits or rolls back together with the business change that
    /// produced it; a business event can never exist without its
    /// notification, nor the other way around.
    pub async fn enqueue(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        payload: &NotificationPayload,
    ) -> Result<i64, AppError> {
        let document = serde_json::to_value(payload)
            .map_err(|e| AppError::Internal(format!("Failed to serialize payload: {e}")))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO outbox_tasks (user_id, type, payload)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(payload.kind())
        .bind(&document)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Fetch up to `limit` due tasks, oldest creation first.
    ///
    /// FIFO-by-creation is the fairness guarantee: no task starves behind
    /// newer ones. `id` breaks creation-time ties deterministically.
    pub async fn fetch_due_batch(
        pool: &PgPool,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboxTask>, AppError> {
        let tasks: Vec<OutboxTask> = sqlx::query_as(
            r#"
            SELECT * FROM outbox_tasks
            WHERE status IN ('pending', 'sending')
              AND next_attempt_at <= $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Atomically claim a due task for sending.
    ///
    /// Flips the row to `sending` only while it is still due, so a row that
    /// another dispatcher instance already finalized or rescheduled comes
    /// back as `None` instead of being sent twice. A row stuck in `sending`
    /// remains claimable on purpose.
    pub async fn claim(
        pool: &PgPool,
        task_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<OutboxTask>, AppError> {
        let task: Option<OutboxTask> = sqlx::query_as(
            r#"
            UPDATE outbox_tasks
            SET status = 'sending', updated_at = $2
            WHERE id = $1
              AND status IN ('pending', 'sending')
              AND next_attempt_at <= $2
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Persist a mutated task (status, retry count, next attempt time).
    ///
    /// Last-writer-wins; the claim above is the only concurrency guard.
    pub async fn save(
        pool: &PgPool,
        task: &OutboxTask,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE outbox_tasks
            SET status = $2, retry_count = $3, next_attempt_at = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(task.status)
        .bind(task.retry_count)
        .bind(task.next_attempt_at)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }
}
