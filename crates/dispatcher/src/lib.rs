//! Outbox delivery dispatcher.
//!
//! Drains the transactional outbox on a fixed tick: claims due tasks,
//! renders each payload into a transport-ready message, sends it, and
//! records the outcome through the linear-backoff retry state machine.

pub mod dispatcher;
pub mod formatter;

pub use dispatcher::{BatchStats, Dispatcher, MAX_RETRIES, backoff};
