use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outbox task delivery status.
///
/// `Sent` and `Failed` are terminal; the dispatcher never touches a task
/// again once it reaches either. A task left in `Sending` (process crash
/// mid-send) stays eligible for the next poll, which is what makes delivery
/// at-least-once rather than exactly-once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Sending,
    Sent,
    Failed,
}

impl OutboxStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OutboxStatus::Sent | OutboxStatus::Failed)
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboxStatus::Pending => write!(f, "pending"),
            OutboxStatus::Sending => write!(f, "sending"),
            OutboxStatus::Sent => write!(f, "sent"),
            OutboxStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Notification kinds produced by the delivery marketplace.
///
/// Stored in the `type` column of both `outbox_tasks` and `notifications`,
/// using the same tag strings that appear inside serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    NewRequest,
    RequestAccepted,
    RequestAcceptedTraveler,
    RequestRejected,
    RequestDelivered,
    TripCancelled,
    Generic,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::NewRequest => write!(f, "NEW_REQUEST"),
            NotificationKind::RequestAccepted => write!(f, "REQUEST_ACCEPTED"),
            NotificationKind::RequestAcceptedTraveler => write!(f, "REQUEST_ACCEPTED_TRAVELER"),
            NotificationKind::RequestRejected => write!(f, "REQUEST_REJECTED"),
            NotificationKind::RequestDelivered => write!(f, "REQUEST_DELIVERED"),
            NotificationKind::TripCancelled => write!(f, "TRIP_CANCELLED"),
            NotificationKind::Generic => write!(f, "GENERIC"),
        }
    }
}

/// Text markup the transport should apply when rendering a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    Plain,
    Markdown,
}

/// A single inline button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub url: String,
}

/// A transport-ready message produced by the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub text: String,
    pub markup: Markup,
    pub buttons: Vec<InlineButton>,
}

/// A user known to the notification pipeline.
///
/// `telegram_user_id` is the external delivery address; it is `None` until
/// the user links their Telegram account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub telegram_user_id: Option<i64>,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A durable delivery task in the transactional outbox.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OutboxTask {
    pub id: i64,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub retry_count: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An in-app notification history record.
///
/// Written once when the originating event is enqueued; independent of
/// whether the external delivery ever succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
