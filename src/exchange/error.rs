//! Exchange error types

use thiserror::Error;

use super::QueueId;

/// Binding errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// `X-match` carries something other than `"all"` or `"any"`
    #[error("invalid X-match value: {value}")]
    InvalidMatchMode {
        /// Offending value, rendered for diagnostics
        value: String,
    },
}

/// Failure reported by a destination store for one queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Queue no longer exists or cannot accept messages
    #[error("queue {queue} is unavailable")]
    QueueUnavailable {
        /// Target queue
        queue: QueueId,
    },

    /// Queue refused the message
    #[error("queue {queue} rejected the message: {reason}")]
    Rejected {
        /// Target queue
        queue: QueueId,
        /// Store-provided reason
        reason: String,
    },
}

impl DeliveryError {
    /// Queue the failure refers to.
    #[must_use]
    pub const fn queue(&self) -> &QueueId {
        match self {
            Self::QueueUnavailable { queue } | Self::Rejected { queue, .. } => queue,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
