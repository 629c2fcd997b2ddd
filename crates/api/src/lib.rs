//! Notification history HTTP API.
//!
//! Read surface over the in-app notification history: list, unread count,
//! and mark-read. Token issuance belongs to the host application; this
//! service only validates bearer JWTs.

pub mod middleware;
pub mod routes;
pub mod state;
