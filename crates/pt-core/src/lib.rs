//! Core domain logic for the package tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: status changes reported for a package, and the fuzzy rule
//!   deciding when two providers report the same occurrence
//! - Trackers: the contract every provider implements
//! - Retry: bounded re-attempts around a fallible async operation
//! - Aggregation: fanning a lookup out to every applicable tracker and
//!   merging the results into one newest-first history

mod error;
pub mod event;
mod multi;
pub mod retry;
mod tracker;

pub use error::{BoxError, TrackError};
pub use event::PackageEvent;
pub use multi::{CanonicalOrder, MultiTracker, merge_unique, sort_newest_first};
pub use retry::Retry;
pub use tracker::Tracker;
