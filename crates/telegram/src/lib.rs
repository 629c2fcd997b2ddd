//! Telegram delivery transport.
//!
//! The dispatcher talks to the outside world only through the [`Transport`]
//! trait; [`TelegramClient`] is the production implementation over the
//! Telegram Bot API.

pub mod client;

pub use client::TelegramClient;

use async_trait::async_trait;

use herald_common::error::AppError;
use herald_common::types::RenderedMessage;

/// A one-shot message transport.
///
/// Implementations perform exactly one delivery attempt per call and do not
/// retry internally; the dispatcher owns the retry/backoff policy. Any
/// failure (timeout, HTTP error status, connection error) surfaces as a
/// single [`AppError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a rendered message to the given external recipient id.
    async fn send(&self, chat_id: i64, message: &RenderedMessage) -> Result<(), AppError>;
}
