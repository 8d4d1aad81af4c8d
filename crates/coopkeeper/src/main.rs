//! `coopkeep` - CLI for coopkeeper
//!
//! This binary provides the command-line interface for recording flock
//! observations and reading back history, trends, alerts, and exports.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;

use coopkeeper::cli::{
    format_table, AddCommand, AlertsCommand, Cli, Command, ConfigCommand, ExportCommand,
    HistoryCommand, OutputFormat, StatsCommand, TrendCommand,
};
use coopkeeper::export::write_csv;
use coopkeeper::trend::TrendMetric;
use coopkeeper::{evaluate, init_logging, Config, FlockRecord, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::History(cmd) => handle_history(&config, &cmd),
        Command::Trend(cmd) => handle_trend(&config, &cmd),
        Command::Alerts(cmd) => handle_alerts(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    Storage::open(config.database_path()).context("could not open record storage")
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let record = cmd.to_record(&config.farm)?;
    let id = storage.insert(&record)?;
    println!(
        "Saved record #{id} for flock {} ({})",
        record.flock_id, record.poultry_type
    );
    Ok(())
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let records = storage.query(&cmd.filter())?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No records found for the selected filters.");
            } else {
                let rows: Vec<Vec<String>> = records.iter().map(history_row).collect();
                print!(
                    "{}",
                    format_table(
                        &["id", "date", "type", "flock", "feed kg", "dead", "eggs"],
                        &rows
                    )
                );
            }
        }
        OutputFormat::Plain => {
            if records.is_empty() {
                println!("No records found for the selected filters.");
            }
            for record in &records {
                print_record(record);
            }
        }
    }
    Ok(())
}

fn history_row(record: &FlockRecord) -> Vec<String> {
    vec![
        record.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        record.recorded_at.format("%Y-%m-%d").to_string(),
        record.poultry_type.to_string(),
        record.flock_id.clone(),
        format!("{:.1}", record.feed_given_kg),
        record.dead_birds.to_string(),
        record
            .eggs_collected
            .map_or_else(|| "-".to_string(), |n| n.to_string()),
    ]
}

fn print_record(record: &FlockRecord) {
    println!(
        "Entry #{} ({}, {})",
        record.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        record.poultry_type,
        record.flock_id
    );
    println!("  Date:       {}", record.recorded_at.format("%Y-%m-%d %H:%M"));
    println!("  Feed Given: {} kg", record.feed_given_kg);
    println!("  Dead Birds: {}", record.dead_birds);
    if let Some(eggs) = record.eggs_collected {
        println!("  Eggs:       {eggs}");
    }
    if let Some(remarks) = &record.remarks {
        println!("  Remarks:    {remarks}");
    }
}

fn handle_trend(config: &Config, cmd: &TrendCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let days = cmd.days.unwrap_or(config.trends.window_days);
    let since = Utc::now().date_naive() - Duration::days(i64::from(days));

    let metric = TrendMetric::from(cmd.metric);
    let points = match metric {
        TrendMetric::Feed => storage.feed_trend(&cmd.flock, since)?,
        TrendMetric::Mortality => {
            storage.mortality_trend(&cmd.flock, since, config.farm.flock_size)?
        }
        TrendMetric::EggProduction => storage.egg_production_trend(&cmd.flock, since)?,
    };

    if cmd.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    if points.is_empty() {
        println!(
            "No {metric} data for flock {} in the last {days} days.",
            cmd.flock
        );
    } else {
        println!("{metric} trend for {} (last {days} days):", cmd.flock);
        for point in &points {
            println!("  {}  {:.2} {}", point.date, point.value, metric.unit());
        }
    }
    Ok(())
}

fn handle_alerts(config: &Config, cmd: &AlertsCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let alerts = evaluate(&storage, Utc::now().date_naive(), &config.alert_context())?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
    } else if alerts.is_empty() {
        println!("No alerts. All checks passed.");
    } else {
        for alert in &alerts {
            println!("[{}] {}", alert.severity, alert.message);
        }
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let records = storage.query(&cmd.filter())?;

    if records.is_empty() {
        println!("No data to export.");
        return Ok(());
    }

    let path = cmd.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!(
            "flock_records_{}.csv",
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    });
    let file =
        File::create(&path).with_context(|| format!("could not create {}", path.display()))?;
    write_csv(&records, BufWriter::new(file))?;

    println!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;
    let flocks = storage.flock_ids()?;

    if cmd.json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "total_records": stats.total_records,
            "oldest_record": stats.oldest_record,
            "newest_record": stats.newest_record,
            "db_size_bytes": stats.db_size_bytes,
            "flocks": flocks,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("coopkeep storage");
        println!("----------------");
        println!("Database: {}", storage.path().display());
        println!("Records:  {}", stats.total_records);
        println!("Flocks:   {}", if flocks.is_empty() { "-".to_string() } else { flocks.join(", ") });
        if let Some(oldest) = stats.oldest_record {
            println!("Oldest:   {}", oldest.format("%Y-%m-%d %H:%M"));
        }
        if let Some(newest) = stats.newest_record {
            println!("Newest:   {}", newest.format("%Y-%m-%d %H:%M"));
        }
        println!("Size:     {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:       {}", config.database_path().display());
                println!();
                println!("[Farm]");
                println!("  Flock size:          {}", config.farm.flock_size);
                println!("  Sheds:               {}", config.farm.sheds.join(", "));
                println!("  Default bird age:    {} days", config.farm.default_bird_age_days);
                println!();
                println!("[Trends]");
                println!("  Window:              {} days", config.trends.window_days);
                println!();
                println!("[Alerts]");
                println!(
                    "  Mortality threshold: {}%",
                    config.alerts.mortality_threshold_pct
                );
                println!(
                    "  Symptom patterns:    {}",
                    config.alerts.symptom_patterns.len()
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
