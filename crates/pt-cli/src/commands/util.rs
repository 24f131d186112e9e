//! Shared utilities for CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use pt_core::{MultiTracker, Tracker};

use crate::Config;

/// Instantiates the enabled providers, in configured order.
pub fn enabled_trackers(config: &Config) -> Result<Vec<Arc<dyn Tracker>>> {
    let http = pt_providers::http_client(config.request_timeout())
        .context("failed to create HTTP client")?;
    config
        .providers
        .iter()
        .map(|name| {
            pt_providers::provider(name, &http)
                .with_context(|| format!("invalid provider in configuration: {name}"))
        })
        .collect()
}

/// Builds the aggregator over the enabled providers.
pub fn aggregator(config: &Config) -> Result<MultiTracker> {
    let trackers = enabled_trackers(config)?;
    let multi = MultiTracker::from_trackers(trackers)
        .context("no providers enabled; set `providers` in the configuration")?;
    Ok(multi.with_retry(config.retry.policy()))
}
