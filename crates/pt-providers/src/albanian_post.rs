//! Posta Shqiptare (Albanian Post) tracking.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use pt_core::{PackageEvent, TrackError, Tracker};
use regex::Regex;

use crate::{ProviderError, fetch_text, html};

const TRACKING_URL: &str = "https://gjurmo.postashqiptare.al/tracking.aspx";

/// ASP.NET page state the tracking form expects alongside the number.
const FORM_STATE: [(&str, &str); 5] = [
    ("__EVENTTARGET", ""),
    ("__EVENTARGUMENT", ""),
    (
        "__VIEWSTATE",
        "/wEPDwUKMTA5MDYxMDcyNmRkLoI0bv4OtYSs+SNHWAurZpro+shddZtGwTEJPz4YTKM=",
    ),
    ("__VIEWSTATEGENERATOR", "414E4794"),
    (
        "__EVENTVALIDATION",
        "/wEdAAVX79ubPRAUo7W5OXia5q+xs/foFj56M4JV9YiCGX9Oya9U1URXbQkTl8PXilbzpbKyuB7QXXlyP7hBJbH/uNLRemgLggfoCsFv2TROt6obiWaWX0R5eBUKjq7BF/x9MQlTdf3GqVq/aFEERDWyRKe2",
    ),
];

const RESULTS_TABLE_ID: &str = "gvTraking";
const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M";
const DELIVERED_MARKER: &str = "Objekti u dorezua";

/// UPU S10 item identifiers, e.g. `RB069131513SG`.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[0-9]{9}[A-Z]{2}$").unwrap());

/// Tracker for packages handled by Posta Shqiptare.
#[derive(Debug, Clone)]
pub struct AlbanianPostTracker {
    http: reqwest::Client,
}

impl AlbanianPostTracker {
    pub const NAME: &'static str = "albanian-post";

    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<String, ProviderError> {
        let mut form: Vec<(&str, &str)> = FORM_STATE.to_vec();
        form.extend([
            ("hBarCodes", tracking_number),
            ("txt_barcode", tracking_number),
            ("btn_track", "Gjurmo/Submit"),
        ]);
        tracing::debug!(tracking_number, url = TRACKING_URL, "querying albanian post");
        fetch_text(self.http.post(TRACKING_URL).form(&form)).await
    }
}

#[async_trait]
impl Tracker for AlbanianPostTracker {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, tracking_number: &str) -> bool {
        NUMBER_RE.is_match(tracking_number)
    }

    async fn track(&self, tracking_number: &str) -> Result<Vec<PackageEvent>, TrackError> {
        if !self.supports(tracking_number) {
            return Err(TrackError::unsupported(Self::NAME, tracking_number));
        }
        let page = self
            .fetch(tracking_number)
            .await
            .map_err(|err| err.into_track_error(Self::NAME))?;
        parse_events(&page).map_err(|err| err.into_track_error(Self::NAME))
    }
}

/// Extracts events from the tracking results page.
///
/// A page without a results table means the number is not known yet and
/// yields no events.
fn parse_events(page: &str) -> Result<Vec<PackageEvent>, ProviderError> {
    let Some(table) = html::inner_by_id(page, RESULTS_TABLE_ID) else {
        return Ok(Vec::new());
    };

    let mut events = Vec::new();
    // First row is the header.
    for row in html::inner_all(table, "tr").into_iter().skip(1) {
        let cells = html::inner_all(row, "font");
        let [when, what, ..] = cells.as_slice() else {
            tracing::trace!(row, "skipping row without date and description");
            continue;
        };
        let description = html::text(what);
        events.push(PackageEvent {
            timestamp: parse_timestamp(&html::text(when))?,
            is_delivery: description.contains(DELIVERED_MARKER),
            description,
        });
    }
    Ok(events)
}

/// Parses `dd-mm-YYYY HH:MM AM`. The hour is already 24-hour, so the
/// meridiem marker carries no information and is dropped.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ProviderError> {
    let value = raw
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .trim_end();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|err| ProviderError::Parse(format!("bad timestamp {raw:?}: {err}")))
}
