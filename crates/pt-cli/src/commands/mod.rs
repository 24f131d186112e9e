//! CLI subcommand implementations.

pub mod supports;
pub mod track;
mod util;
