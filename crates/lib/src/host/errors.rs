//! Host stack error types.

use thiserror::Error;

/// Errors that can occur at the host stack boundary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HostError {
    /// The host rejected a commit.
    #[error("Host rejected commit: {reason}")]
    CommitRejected {
        /// Description of the rejection
        reason: String,
    },

    /// The host rejected a cursor move.
    #[error("Host rejected move of {delta}: {reason}")]
    TravelRejected {
        /// The requested delta
        delta: isize,
        /// Description of the rejection
        reason: String,
    },

    /// The entry record could not be serialized into host state.
    #[error("Entry record could not be encoded for the host")]
    EncodeFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

impl HostError {
    /// Check if this error is a rejected commit.
    pub fn is_commit_rejected(&self) -> bool {
        matches!(self, HostError::CommitRejected { .. })
    }

    /// Check if this error is a rejected cursor move.
    pub fn is_travel_rejected(&self) -> bool {
        matches!(self, HostError::TravelRejected { .. })
    }
}
