//! Command-line interface for coopkeeper.
//!
//! This module provides the CLI structure and command handlers for the
//! `coopkeep` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, AlertsCommand, BehaviorArg, ConfigCommand, EggQualityArg, ExportCommand,
    HistoryCommand, LevelArg, LitterArg, OutputFormat, PoultryTypeArg, StatsCommand, TrendCommand,
    TrendMetricArg,
};

/// coopkeep - Poultry farm record keeping
///
/// Log daily husbandry metrics per flock, follow trends, evaluate
/// rule-based alerts, and export records to a spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "coopkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a day's observation for a flock
    Add(AddCommand),

    /// List recorded observations
    History(HistoryCommand),

    /// Show a trend series for one metric
    Trend(TrendCommand),

    /// Evaluate today's alert battery
    Alerts(AlertsCommand),

    /// Export filtered records to a spreadsheet file
    Export(ExportCommand),

    /// Show storage statistics
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Render rows as a padded text table with a header separator.
#[must_use]
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut out = String::new();
    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&format!("{header:width$}", width = widths[i]));
    }
    out.push('\n');
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&"-".repeat(*width));
    }
    out.push('\n');
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&format!("{cell:width$}", width = widths[i]));
        }
        out.push('\n');
    }
    out
}
