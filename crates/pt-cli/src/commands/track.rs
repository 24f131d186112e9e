//! Track command: look up packages across all enabled providers.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use pt_core::{PackageEvent, TrackError, Tracker};
use serde::Serialize;

use crate::Config;
use crate::commands::util;

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Tracking numbers to look up.
    #[arg(required = true)]
    pub tracking_numbers: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome of tracking one number.
#[derive(Debug)]
pub struct TrackReport {
    pub tracking_number: String,
    pub result: Result<Vec<PackageEvent>, TrackError>,
}

pub fn run<W: Write>(writer: &mut W, args: &TrackArgs, config: &Config) -> Result<()> {
    let tracker: Arc<dyn Tracker> = Arc::new(util::aggregator(config)?);
    tracing::debug!(providers = ?config.providers, "tracking with configured providers");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")?;
    let reports = runtime.block_on(track_all(tracker, &args.tracking_numbers))?;

    if args.json {
        write_json(writer, &reports)?;
    } else {
        write_text(writer, &reports)?;
    }

    let failed = reports.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        bail!("failed to track {failed} of {} packages", reports.len());
    }
    Ok(())
}

/// Tracks every number concurrently. Reports keep the input order.
pub async fn track_all(
    tracker: Arc<dyn Tracker>,
    tracking_numbers: &[String],
) -> Result<Vec<TrackReport>> {
    let handles: Vec<_> = tracking_numbers
        .iter()
        .map(|number| {
            let tracker = Arc::clone(&tracker);
            let number = number.clone();
            tokio::spawn(async move {
                let result = tracker.track(&number).await;
                TrackReport {
                    tracking_number: number,
                    result,
                }
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("tracking task failed")?);
    }
    Ok(reports)
}

fn write_text<W: Write>(writer: &mut W, reports: &[TrackReport]) -> Result<()> {
    for report in reports {
        writeln!(writer, "[ {} ]", report.tracking_number)?;
        match &report.result {
            Ok(events) if events.is_empty() => writeln!(writer, "no events yet")?,
            Ok(events) => {
                for event in events {
                    if event.is_delivery {
                        writeln!(writer, "{event} (delivered)")?;
                    } else {
                        writeln!(writer, "{event}")?;
                    }
                }
            }
            Err(err) => writeln!(writer, "error: {err}")?,
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tracking_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a [PackageEvent]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn write_json<W: Write>(writer: &mut W, reports: &[TrackReport]) -> Result<()> {
    let output: Vec<JsonReport<'_>> = reports
        .iter()
        .map(|report| match &report.result {
            Ok(events) => JsonReport {
                tracking_number: &report.tracking_number,
                events: Some(events),
                error: None,
            },
            Err(err) => JsonReport {
                tracking_number: &report.tracking_number,
                events: None,
                error: Some(err.to_string()),
            },
        })
        .collect();
    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use insta::assert_snapshot;

    use super::*;

    fn event(ts: &str, description: &str, is_delivery: bool) -> PackageEvent {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        PackageEvent::new(timestamp, description, is_delivery)
    }

    fn reports() -> Vec<TrackReport> {
        vec![
            TrackReport {
                tracking_number: "RB069131513SG".to_string(),
                result: Ok(vec![
                    event("2024-03-02 14:05:00", "Objekti u dorezua", true),
                    event("2024-03-01 09:40:00", "Arrived at office", false),
                ]),
            },
            TrackReport {
                tracking_number: "UA002876183FR".to_string(),
                result: Ok(Vec::new()),
            },
            TrackReport {
                tracking_number: "12345".to_string(),
                result: Err(TrackError::unsupported("multi", "12345")),
            },
        ]
    }

    /// Returns one event per number, echoing the number back.
    struct EchoTracker;

    #[async_trait]
    impl Tracker for EchoTracker {
        fn name(&self) -> &str {
            "echo"
        }

        fn supports(&self, tracking_number: &str) -> bool {
            !tracking_number.is_empty()
        }

        async fn track(&self, tracking_number: &str) -> Result<Vec<PackageEvent>, TrackError> {
            if !self.supports(tracking_number) {
                return Err(TrackError::unsupported("echo", tracking_number));
            }
            Ok(vec![event("2024-01-01 00:00:00", tracking_number, false)])
        }
    }

    #[test]
    fn text_output_groups_events_by_number() {
        let mut output = Vec::new();
        write_text(&mut output, &reports()).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        [ RB069131513SG ]
        2024-03-02 14:05:00  Objekti u dorezua (delivered)
        2024-03-01 09:40:00  Arrived at office

        [ UA002876183FR ]
        no events yet

        [ 12345 ]
        error: multi does not support 12345
        ");
    }

    #[test]
    fn json_output_reports_events_and_errors() {
        let mut output = Vec::new();
        write_json(&mut output, &reports()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(parsed[0]["tracking_number"], "RB069131513SG");
        assert_eq!(parsed[0]["events"][0]["timestamp"], "2024-03-02T14:05:00");
        assert_eq!(parsed[0]["events"][0]["is_delivery"], true);
        assert_eq!(parsed[1]["events"].as_array().unwrap().len(), 0);
        assert_eq!(parsed[2]["error"], "multi does not support 12345");
        assert!(parsed[2].get("events").is_none());
    }

    #[tokio::test]
    async fn track_all_keeps_input_order() {
        let numbers = vec!["B".to_string(), "A".to_string(), String::new()];
        let reports = track_all(Arc::new(EchoTracker), &numbers).await.unwrap();

        let order: Vec<&str> = reports.iter().map(|r| r.tracking_number.as_str()).collect();
        assert_eq!(order, vec!["B", "A", ""]);
        assert_eq!(reports[0].result.as_ref().unwrap()[0].description, "B");
        assert!(reports[2].result.as_ref().unwrap_err().is_unsupported());
    }

    #[test]
    fn run_fails_for_unsupported_numbers_without_network() {
        let mut output = Vec::new();
        let args = TrackArgs {
            tracking_numbers: vec!["12345".to_string()],
            json: false,
        };

        let err = run(&mut output, &args, &Config::default()).unwrap_err();

        assert_eq!(err.to_string(), "failed to track 1 of 1 packages");
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("error: multi does not support 12345"));
    }
}
