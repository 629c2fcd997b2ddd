//! Notification history routes.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use herald_common::error::AppError;
use herald_common::types::Notification;
use herald_outbox::history::HistoryStore;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/unread-count", get(unread_count))
        .route("/api/notifications/{id}/read", patch(mark_read))
        .route("/api/notifications/read-all", patch(mark_all_read))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    20
}

/// GET /api/notifications — List the authenticated user's notifications,
/// newest first. Page size is capped at 50.
async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = HistoryStore::list_by_user(
        &state.pool,
        auth.user_id,
        pagination.page,
        pagination.size,
    )
    .await?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count — Unread count for the authenticated user.
async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = HistoryStore::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "count": count })))
}

/// PATCH /api/notifications/:id/read — Mark a single notification as read.
async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, AppError> {
    let notification = HistoryStore::mark_read(&state.pool, id, auth.user_id, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
    Ok(Json(notification))
}

/// PATCH /api/notifications/read-all — Mark all of the user's notifications as read.
async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = HistoryStore::mark_all_read(&state.pool, auth.user_id, Utc::now()).await?;
    Ok(Json(json!({ "updated": updated })))
}
