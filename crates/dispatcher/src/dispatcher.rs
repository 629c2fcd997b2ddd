//! Poll loop and retry state machine.
//!
//! Task lifecycle per attempt:
//!
//! ```text
//! pending --(claim)--> sending --(send ok)--> sent
//!                      sending --(send err, retry_count+1 <= MAX)--> pending, next_attempt_at += BACKOFF
//!                      sending --(send err, retry_count+1 >  MAX)--> failed
//! ```
//!
//! `sent` and `failed` are terminal. A crash between claim and finalize
//! leaves the row in `sending`, still due, so the next poll re-picks it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::payload::NotificationPayload;
use herald_common::types::{OutboxStatus, OutboxTask};
use herald_outbox::store::OutboxStore;
use herald_telegram::Transport;

use crate::formatter;

/// Delivery attempts beyond the first; the 6th consecutive failure is terminal.
pub const MAX_RETRIES: i32 = 5;

/// Linear backoff: the n-th failure delays the next attempt by n minutes.
pub fn backoff(retry_count: i32) -> chrono::Duration {
    chrono::Duration::seconds(60 * i64::from(retry_count))
}

/// Outcome counts for one poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub sent: u32,
    pub retried: u32,
    pub failed: u32,
    /// Tasks that were due at fetch time but gone by claim time
    /// (finalized or rescheduled by a concurrent instance).
    pub skipped: u32,
}

impl BatchStats {
    pub fn processed(&self) -> u32 {
        self.sent + self.retried + self.failed
    }
}

enum TaskOutcome {
    Sent,
    Retried,
    Failed,
    Skipped,
}

/// Periodic outbox drainer.
pub struct Dispatcher {
    pool: PgPool,
    transport: Arc<dyn Transport>,
    poll_interval: Duration,
    batch_size: i64,
}

impl Dispatcher {
    pub fn new(
        pool: PgPool,
        transport: Arc<dyn Transport>,
        poll_interval_ms: u64,
        batch_size: i64,
    ) -> Self {
        Self {
            pool,
            transport,
            poll_interval: Duration::from_millis(poll_interval_ms),
            batch_size,
        }
    }

    /// Start the poll loop. Runs until the owning task is cancelled.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut tick = tokio::time::interval(self.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            batch_size = self.batch_size,
            "Outbox dispatcher started"
        );

        loop {
            tick.tick().await;
            match self.process_due_batch().await {
                Ok(stats) if stats.processed() > 0 => {
                    tracing::info!(
                        sent = stats.sent,
                        retried = stats.retried,
                        failed = stats.failed,
                        "Outbox batch processed"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    // The batch query itself failed; tasks are untouched and
                    // will be fetched again on the next tick.
                    tracing::error!(error = %e, "Outbox poll failed");
                }
            }
        }
    }

    /// Drain one batch of due tasks, oldest first.
    ///
    /// Tasks are processed independently and sequentially; a failing task
    /// records its backoff state and the loop moves on.
    pub async fn process_due_batch(&self) -> Result<BatchStats, AppError> {
        let now = Utc::now();
        let due = OutboxStore::fetch_due_batch(&self.pool, self.batch_size, now).await?;

        let mut stats = BatchStats::default();
        for task in due {
            match self.process_task(task.id).await {
                Ok(TaskOutcome::Sent) => stats.sent += 1,
                Ok(TaskOutcome::Retried) => stats.retried += 1,
                Ok(TaskOutcome::Failed) => stats.failed += 1,
                Ok(TaskOutcome::Skipped) => stats.skipped += 1,
                Err(e) => {
                    // Could not persist an outcome for this task; it stays
                    // due and will be re-picked on a later poll.
                    tracing::error!(task_id = task.id, error = %e, "Error processing outbox task");
                }
            }
        }

        Ok(stats)
    }

    async fn process_task(&self, task_id: i64) -> Result<TaskOutcome, AppError> {
        let Some(mut task) = OutboxStore::claim(&self.pool, task_id, Utc::now()).await? else {
            return Ok(TaskOutcome::Skipped);
        };

        match self.attempt_send(&task).await {
            Ok(()) => {
                task.status = OutboxStatus::Sent;
                OutboxStore::save(&self.pool, &task, Utc::now()).await?;
                tracing::info!(
                    task_id = task.id,
                    user_id = %task.user_id,
                    kind = %task.kind,
                    "Sent notification"
                );
                Ok(TaskOutcome::Sent)
            }
            Err(e) => {
                tracing::error!(task_id = task.id, error = %e, "Error sending notification");

                let now = Utc::now();
                task.retry_count += 1;
                if task.retry_count > MAX_RETRIES {
                    task.status = OutboxStatus::Failed;
                    OutboxStore::save(&self.pool, &task, now).await?;
                    tracing::warn!(
                        task_id = task.id,
                        attempts = task.retry_count,
                        "Notification failed permanently"
                    );
                    Ok(TaskOutcome::Failed)
                } else {
                    task.status = OutboxStatus::Pending;
                    task.next_attempt_at = now + backoff(task.retry_count);
                    OutboxStore::save(&self.pool, &task, now).await?;
                    Ok(TaskOutcome::Retried)
                }
            }
        }
    }

    /// One delivery attempt: resolve the recipient address, render, send.
    ///
    /// A recipient without a linked Telegram account fails the attempt like
    /// any transport error; the account may be linked before a retry, so it
    /// goes through the same backoff ladder rather than failing fast.
    async fn attempt_send(&self, task: &OutboxTask) -> Result<(), AppError> {
        let chat_id = self
            .resolve_chat_id(task.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Transport(format!(
                    "User {} has no linked Telegram account",
                    task.user_id
                ))
            })?;

        let payload = NotificationPayload::from_value(&task.payload);
        let message = formatter::render(&payload);

        self.transport.send(chat_id, &message).await
    }

    async fn resolve_chat_id(&self, user_id: Uuid) -> Result<Option<i64>, AppError> {
        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT telegram_user_id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(telegram_id,)| telegram_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear_in_retry_count() {
        for n in 1..=MAX_RETRIES {
            assert_eq!(backoff(n).num_seconds(), i64::from(n) * 60);
        }
    }
}
