//! In-app notification history queries.
//!
//! History rows are the user-visible record of what was communicated,
//! written once at enqueue time. External delivery failures never touch
//! them; the only mutation is mark-read.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::types::{Notification, NotificationKind};

/// Hard cap on history page size, matching the product API contract.
const MAX_PAGE_SIZE: i64 = 50;

/// Data access for `notifications`.
pub struct HistoryStore;

impl HistoryStore {
    /// Insert a history record inside the caller's transaction.
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: Option<&str>,
        action_url: Option<&str>,
    ) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO notifications (user_id, type, title, message, action_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(message)
        .bind(action_url)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// List a user's notifications, newest first. `size` is clamped to 50.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        page: i64,
        size: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let size = size.clamp(1, MAX_PAGE_SIZE);
        let offset = page.max(0) * size;

        let notifications: Vec<Notification> = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(size)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Count a user's unread notifications.
    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification as read, scoped to the owning user.
    ///
    /// Idempotent: an already-read notification is returned unchanged.
    /// Returns `None` when the id does not exist or belongs to another user.
    pub async fn mark_read(
        pool: &PgPool,
        id: i64,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, AppError> {
        let updated: Option<Notification> = sqlx::query_as(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = $3
            WHERE id = $1 AND user_id = $2 AND is_read = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        if updated.is_some() {
            return Ok(updated);
        }

        let existing: Option<Notification> =
            sqlx::query_as("SELECT * FROM notifications WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        Ok(existing)
    }

    /// Mark all of a user's unread notifications as read.
    ///
    /// Returns the number of rows updated.
    pub async fn mark_all_read(
        pool: &PgPool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true, read_at = $2 WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
