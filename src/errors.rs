//! # Error Types Module
//!
//! Errors reported by the collaborators the conversation core calls into:
//! the menu source, the order sink and the admin notifier.

use thiserror::Error;

/// Failure to read the menu
#[derive(Debug, Error)]
pub enum MenuError {
    /// The backing store could not be reached or rejected the request
    #[error("Menu source unavailable: {0}")]
    Unavailable(String),
    /// The store answered with data that is not a table of rows
    #[error("Malformed menu data: {0}")]
    Malformed(String),
}

/// Failure to persist a completed order
#[derive(Debug, Error)]
pub enum SinkError {
    /// The append request failed
    #[error("Order write failed: {0}")]
    Write(String),
    /// Submission rejected without trying because the circuit breaker is open
    #[error("Order sink temporarily disabled after repeated failures")]
    CircuitOpen,
}

/// Failure to deliver the admin notification
#[derive(Debug, Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);
