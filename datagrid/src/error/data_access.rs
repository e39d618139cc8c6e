//! Data access error types

use std::time::Duration;

/// Errors reported by row and option sources.
///
/// The table recovers from these locally: loading stops, the row window is
/// emptied and the next user action can trigger a fresh fetch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataAccessError {
    /// The source rejected or failed the request.
    #[error("Fetch failed: {message}")]
    Fetch {
        /// Description of the failure.
        message: String,
    },

    /// The source did not answer in time.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// The source answered with data the engine could not read.
    #[error("Response parse error: {0}")]
    Parse(String),
}

impl DataAccessError {
    /// Creates a new fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Timeout(_))
    }
}
