//! Fan-out over several trackers with fuzzy merging of their results.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::TrackError;
use crate::event::PackageEvent;
use crate::retry::Retry;
use crate::tracker::Tracker;

const NAME: &str = "multi";

/// Which tracker's representation survives when two trackers report the
/// same occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CanonicalOrder {
    /// The tracker whose lookup finishes first wins. Results are merged as
    /// they arrive, so the winner depends on network timing and may differ
    /// between runs.
    #[default]
    Completion,
    /// The tracker registered first wins. Results are buffered until every
    /// lookup has finished, then merged in registration order.
    Registration,
}

/// A tracker that queries every registered tracker supporting a tracking
/// number and merges their events into one newest-first history.
///
/// Lookups run concurrently on the tokio runtime, each wrapped in the
/// configured [`Retry`] policy. If any lookup still fails after its retries,
/// the whole call fails and the remaining lookups are aborted.
///
/// `MultiTracker` implements [`Tracker`] itself, so it can be used (and
/// nested) wherever a single tracker is expected.
pub struct MultiTracker {
    trackers: Vec<Arc<dyn Tracker>>,
    retry: Retry,
    canonical: CanonicalOrder,
}

impl std::fmt::Debug for MultiTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.trackers.iter().map(|t| t.name()).collect();
        f.debug_struct("MultiTracker")
            .field("trackers", &names)
            .field("retry", &self.retry)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl MultiTracker {
    /// Creates an aggregator over two trackers. Add more with
    /// [`MultiTracker::with_tracker`].
    pub fn new(first: Arc<dyn Tracker>, second: Arc<dyn Tracker>) -> Self {
        Self {
            trackers: vec![first, second],
            retry: Retry::default(),
            canonical: CanonicalOrder::default(),
        }
    }

    /// Creates an aggregator over any non-empty list of trackers, in
    /// registration order.
    ///
    /// Returns `None` when `trackers` is empty. With a single tracker every
    /// lookup is delegated to it, still under the retry policy.
    pub fn from_trackers(trackers: impl IntoIterator<Item = Arc<dyn Tracker>>) -> Option<Self> {
        let trackers: Vec<_> = trackers.into_iter().collect();
        if trackers.is_empty() {
            return None;
        }
        Some(Self {
            trackers,
            retry: Retry::default(),
            canonical: CanonicalOrder::default(),
        })
    }

    /// Registers another tracker after the existing ones.
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.trackers.push(tracker);
        self
    }

    /// Sets the retry policy applied to each tracker lookup.
    #[must_use]
    pub const fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Sets which tracker's representation survives deduplication.
    #[must_use]
    pub const fn with_canonical_order(mut self, canonical: CanonicalOrder) -> Self {
        self.canonical = canonical;
        self
    }

    /// Names of the trackers that accept `tracking_number`, in registration
    /// order.
    pub fn supporting_names(&self, tracking_number: &str) -> Vec<&str> {
        self.trackers
            .iter()
            .filter(|t| t.supports(tracking_number))
            .map(|t| t.name())
            .collect()
    }

    fn supporting(&self, tracking_number: &str) -> Vec<Arc<dyn Tracker>> {
        self.trackers
            .iter()
            .filter(|t| t.supports(tracking_number))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Tracker for MultiTracker {
    fn name(&self) -> &str {
        NAME
    }

    fn supports(&self, tracking_number: &str) -> bool {
        self.trackers.iter().any(|t| t.supports(tracking_number))
    }

    async fn track(&self, tracking_number: &str) -> Result<Vec<PackageEvent>, TrackError> {
        let supporting = self.supporting(tracking_number);
        if supporting.is_empty() {
            return Err(TrackError::unsupported(NAME, tracking_number));
        }
        tracing::debug!(
            tracking_number,
            trackers = ?supporting.iter().map(|t| t.name()).collect::<Vec<_>>(),
            "dispatching lookups"
        );

        let mut tasks = JoinSet::new();
        for (index, tracker) in supporting.into_iter().enumerate() {
            let retry = self.retry;
            let number = tracking_number.to_owned();
            tasks.spawn(async move {
                let result = {
                    let tracker = &tracker;
                    let number = number.as_str();
                    retry.run(move || tracker.track(number)).await
                };
                (index, tracker.name().to_owned(), result)
            });
        }

        let mut unique: Option<Vec<PackageEvent>> = None;
        let mut buffered: Vec<(usize, Vec<PackageEvent>)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, name, result) = joined?;
            let events = match result {
                Ok(events) => events,
                Err(err) => {
                    tracing::warn!(tracker = %name, tracking_number, error = %err, "lookup failed");
                    return Err(err);
                }
            };
            tracing::debug!(
                tracker = %name,
                tracking_number,
                events = events.len(),
                "lookup finished"
            );

            match self.canonical {
                CanonicalOrder::Completion => match unique.as_mut() {
                    Some(unique) => merge_unique(unique, events),
                    None => unique = Some(events),
                },
                CanonicalOrder::Registration => buffered.push((index, events)),
            }
        }

        if self.canonical == CanonicalOrder::Registration {
            buffered.sort_by_key(|(index, _)| *index);
            for (_, events) in buffered {
                match unique.as_mut() {
                    Some(unique) => merge_unique(unique, events),
                    None => unique = Some(events),
                }
            }
        }

        let mut unique = unique.unwrap_or_default();
        sort_newest_first(&mut unique);
        Ok(unique)
    }
}

/// Appends each incoming event that is not already represented in `unique`.
///
/// Events already in `unique` win over the incoming ones they match.
/// Appended events take part in matching the rest of `incoming`.
pub fn merge_unique(
    unique: &mut Vec<PackageEvent>,
    incoming: impl IntoIterator<Item = PackageEvent>,
) {
    for event in incoming {
        if !unique.iter().any(|u| u.is_same_as(&event)) {
            unique.push(event);
        }
    }
}

/// Sorts events most recent first. Equal timestamps keep their order.
pub fn sort_newest_first(events: &mut [PackageEvent]) {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
