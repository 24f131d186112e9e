//! Postal service trackers for the package tracker.
//!
//! Each provider implements [`pt_core::Tracker`] by scraping the provider's
//! public tracking page:
//! - [`AlbanianPostTracker`]: Posta Shqiptare (UPU S10 numbers)
//! - [`CainiaoTracker`]: Cainiao global logistics

use std::sync::Arc;
use std::time::Duration;

use pt_core::{TrackError, Tracker};
use thiserror::Error;

mod albanian_post;
mod cainiao;
mod html;

pub use albanian_post::AlbanianPostTracker;
pub use cainiao::CainiaoTracker;

/// Default request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Names of all available providers, in their default registration order.
pub const PROVIDER_NAMES: [&str; 2] = [AlbanianPostTracker::NAME, CainiaoTracker::NAME];

/// Provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: reqwest::StatusCode },
    /// The tracking page did not have the expected shape.
    #[error("invalid response: {0}")]
    Parse(String),
    /// No provider is registered under the given name.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl ProviderError {
    fn into_track_error(self, tracker: &str) -> TrackError {
        TrackError::provider(tracker, self)
    }
}

/// Builds the HTTP client shared by all providers.
///
/// The client is cheap to clone; clones share one connection pool.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pt/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::ClientBuild)
}

/// Creates the provider registered under `name`.
pub fn provider(name: &str, http: &reqwest::Client) -> Result<Arc<dyn Tracker>, ProviderError> {
    match name {
        AlbanianPostTracker::NAME => Ok(Arc::new(AlbanianPostTracker::new(http.clone()))),
        CainiaoTracker::NAME => Ok(Arc::new(CainiaoTracker::new(http.clone()))),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status { status });
    }
    Ok(response.text().await?)
}
