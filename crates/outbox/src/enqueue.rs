//! Producer-facing enqueue façade.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::payload::NotificationPayload;

use crate::history::HistoryStore;
use crate::store::OutboxStore;

/// Record a notification for a user: one in-app history row plus one
/// durable outbox task, both inside the caller's transaction.
///
/// Producers call this from the same unit of work as the business change
/// that triggered the notification. Either write failing propagates and
/// rolls the whole transaction back, so a committed business event always
/// has its notification and vice versa.
///
/// Returns the outbox task id.
pub async fn enqueue_notification(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    payload: &NotificationPayload,
) -> Result<i64, AppError> {
    HistoryStore::record(
        tx,
        user_id,
        payload.kind(),
        &payload.title(),
        Some(&payload.summary()),
        payload.action_url().as_deref(),
    )
    .await?;

    let task_id = OutboxStore::enqueue(tx, user_id, payload).await?;

    tracing::debug!(
        task_id,
        user_id = %user_id,
        kind = %payload.kind(),
        "Enqueued notification"
    );

    Ok(task_id)
}
