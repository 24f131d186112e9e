//! Errors raised while tracking a package.

use thiserror::Error;

/// Boxed provider error, as produced by a tracker's lookup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Tracking errors.
#[derive(Debug, Error)]
pub enum TrackError {
    /// No tracker accepts the tracking number's format.
    ///
    /// Raised before any I/O and never retried.
    #[error("{tracker} does not support {tracking_number}")]
    Unsupported {
        tracker: String,
        tracking_number: String,
    },

    /// A provider lookup failed (network, HTTP status, unexpected payload).
    #[error("{tracker} failed: {source}")]
    Provider {
        tracker: String,
        #[source]
        source: BoxError,
    },

    /// A dispatched tracker task panicked or was cancelled.
    #[error("tracker task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl TrackError {
    /// Builds a [`TrackError::Unsupported`] for the given tracker name.
    pub fn unsupported(tracker: impl Into<String>, tracking_number: impl Into<String>) -> Self {
        Self::Unsupported {
            tracker: tracker.into(),
            tracking_number: tracking_number.into(),
        }
    }

    /// Wraps a provider-specific failure.
    pub fn provider(tracker: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Provider {
            tracker: tracker.into(),
            source: source.into(),
        }
    }

    /// Returns true for errors that retrying cannot fix.
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
