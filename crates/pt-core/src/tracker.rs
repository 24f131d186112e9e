//! The contract every tracking provider implements.

use async_trait::async_trait;

use crate::TrackError;
use crate::event::PackageEvent;

/// A source of status events for tracking numbers.
///
/// Implementations are shared across concurrent lookups, so they must be
/// stateless or internally synchronized.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Short, stable name used in logs and errors (e.g. `cainiao`).
    fn name(&self) -> &str;

    /// Returns true if this tracker accepts the tracking number's format.
    ///
    /// Must be cheap and must not perform I/O.
    fn supports(&self, tracking_number: &str) -> bool;

    /// Looks up the events for a tracking number.
    ///
    /// Event order is provider-defined. Fails with
    /// [`TrackError::Unsupported`] when [`Tracker::supports`] is false.
    async fn track(&self, tracking_number: &str) -> Result<Vec<PackageEvent>, TrackError>;
}
