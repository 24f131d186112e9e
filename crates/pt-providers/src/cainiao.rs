//! Cainiao global logistics tracking.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use pt_core::{PackageEvent, TrackError, Tracker};
use regex::Regex;
use serde::Deserialize;

use crate::{ProviderError, fetch_text, html};

const TRACKING_URL: &str = "https://global.cainiao.com/detail.htm";
const PAYLOAD_ELEMENT_ID: &str = "waybill_list_val_box";
const DELIVERED_STATUS: &str = "SIGNIN";

/// Formats seen in `detailList[].time`, tried in order.
const TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// UPU S10 identifiers, or one letter followed by 14 digits (e.g. `A12345678901234`).
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z]{2}[0-9]{9}[A-Z]{2}|[A-Z][0-9]{14})$").unwrap());

/// Tracker backed by Cainiao's global tracking page.
#[derive(Debug, Clone)]
pub struct CainiaoTracker {
    http: reqwest::Client,
}

impl CainiaoTracker {
    pub const NAME: &'static str = "cainiao";

    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<String, ProviderError> {
        tracing::debug!(tracking_number, url = TRACKING_URL, "querying cainiao");
        fetch_text(
            self.http
                .get(TRACKING_URL)
                .query(&[("mailNoList", tracking_number)]),
        )
        .await
    }
}

#[async_trait]
impl Tracker for CainiaoTracker {
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

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    data: Vec<Waybill>,
}

#[derive(Debug, Default, Deserialize)]
struct Waybill {
    #[serde(default)]
    section1: Section,
    #[serde(default)]
    section2: Section,
}

#[derive(Debug, Default, Deserialize)]
struct Section {
    #[serde(default, rename = "detailList")]
    detail_list: Vec<Detail>,
}

#[derive(Debug, Deserialize)]
struct Detail {
    time: Option<String>,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    status: String,
}

/// Extracts events from the tracking page's embedded JSON payload.
///
/// Events from the origin section come before those from the destination
/// section, as the page lists them. A page without the payload element
/// yields no events.
fn parse_events(page: &str) -> Result<Vec<PackageEvent>, ProviderError> {
    let Some(raw) = html::inner_by_id(page, PAYLOAD_ELEMENT_ID) else {
        return Ok(Vec::new());
    };
    let json = html::unescape(raw.trim());
    let payload: Payload = serde_json::from_str(&json)
        .map_err(|err| ProviderError::Parse(format!("bad waybill payload: {err}")))?;

    payload
        .data
        .iter()
        .flat_map(|waybill| [&waybill.section1, &waybill.section2])
        .flat_map(|section| &section.detail_list)
        .map(|detail| -> Result<PackageEvent, ProviderError> {
            let time = detail
                .time
                .as_deref()
                .ok_or_else(|| ProviderError::Parse("event without time".to_string()))?;
            Ok(PackageEvent {
                timestamp: parse_timestamp(time)?,
                description: detail.desc.clone(),
                is_delivery: detail.status == DELIVERED_STATUS,
            })
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ProviderError> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| ProviderError::Parse(format!("bad timestamp {raw:?}")))
}
