//! Durable notification storage: the transactional outbox and the in-app
//! notification history.
//!
//! Producers call [`enqueue::enqueue_notification`] inside their own
//! transaction; the dispatcher drains [`store::OutboxStore`] on its poll
//! cycle. The history written by the enqueue path is a read model for the
//! product UI and is never retried or resent.

pub mod enqueue;
pub mod history;
pub mod store;

pub use enqueue::enqueue_notification;
pub use history::HistoryStore;
pub use store::OutboxStore;
