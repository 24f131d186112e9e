//! Supports command: show which providers accept a tracking number.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use crate::Config;
use crate::commands::util;

#[derive(Debug, Args)]
pub struct SupportsArgs {
    /// Tracking number to check.
    pub tracking_number: String,
}

pub fn run<W: Write>(writer: &mut W, args: &SupportsArgs, config: &Config) -> Result<()> {
    let multi = util::aggregator(config)?;
    let names = multi.supporting_names(&args.tracking_number);
    if names.is_empty() {
        bail!("no enabled provider supports {}", args.tracking_number);
    }
    for name in names {
        writeln!(writer, "{name}")?;
    }
    Ok(())
}
