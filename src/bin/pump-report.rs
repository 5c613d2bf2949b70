//! pump-report - section summary of a cleaned pump telemetry CSV
//!
//! Loads the wide table, selects one section and prints its statistics
//! and relational pairs. Long-form records and statistics can also be
//! written to CSV for other tools.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::info;

use pump_telemetry::aggregation::statistics_to_frame;
use pump_telemetry::{Dashboard, LoadOptions, SectionRegistry, SectionView, WideTable};

#[derive(Parser, Debug)]
#[command(name = "pump-report", version, about = "Summarize one section of pump telemetry")]
struct Args {
    /// Cleaned CSV with a timestamp column and numeric instrument columns
    #[arg(short, long, default_value = "data/clean_pumps.csv", env = "PUMP_DATA")]
    data: PathBuf,

    /// Section to summarize (default: first section of the registry)
    #[arg(short, long)]
    section: Option<String>,

    /// TOML file replacing the built-in section registry
    #[arg(long, env = "PUMP_SECTIONS")]
    sections: Option<PathBuf>,

    /// Name of the timestamp column
    #[arg(long, default_value = "Fecha")]
    timestamp_column: String,

    /// strftime format of the timestamp column
    #[arg(long, default_value = "%Y-%m-%d %H:%M:%S")]
    timestamp_format: String,

    /// List section names and exit
    #[arg(long)]
    list_sections: bool,

    /// Write long-form records to this CSV
    #[arg(long)]
    long_out: Option<PathBuf>,

    /// Write statistics to this CSV
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let registry = match &args.sections {
        Some(path) => SectionRegistry::load(path)
            .with_context(|| format!("loading sections from {}", path.display()))?,
        None => SectionRegistry::builtin(),
    };

    if args.list_sections {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let section_name = match &args.section {
        Some(name) => name.clone(),
        None => registry
            .names()
            .next()
            .context("section registry is empty")?
            .to_string(),
    };

    let options = LoadOptions {
        timestamp_column: args.timestamp_column.clone(),
        timestamp_format: args.timestamp_format.clone(),
    };
    let table = WideTable::load_csv(&args.data, &options)
        .with_context(|| format!("loading {}", args.data.display()))?;

    let dashboard = Dashboard::new(registry, table);
    let view = dashboard
        .view(&section_name)
        .with_context(|| format!("section '{section_name}'"))?;

    print_view(&view);

    if let Some(path) = &args.long_out {
        let mut df = dashboard.records_frame(&view)?;
        write_csv(&mut df, path)?;
        info!(path = %path.display(), rows = df.height(), "wrote long-form records");
    }
    if let Some(path) = &args.stats_out {
        let mut df = statistics_to_frame(&view.statistics)?;
        write_csv(&mut df, path)?;
        info!(path = %path.display(), rows = df.height(), "wrote statistics");
    }

    Ok(())
}

fn print_view(view: &SectionView) {
    println!("== {}", view.section.name());
    println!(
        "{:<16} {:<36} {:>7} {:>12} {:>12} {:>12} {:>12}",
        "tipo", "metric", "count", "mean", "min", "max", "std"
    );
    for row in &view.statistics {
        println!(
            "{:<16} {:<36} {:>7} {:>12} {:>12} {:>12} {:>12}",
            row.metric_type.label(),
            row.instrument,
            row.count,
            fmt_opt(row.mean),
            fmt_opt(row.min),
            fmt_opt(row.max),
            fmt_opt(row.std),
        );
    }

    if view.pairs.is_empty() {
        println!("\nno flow relations in this section");
    } else {
        println!("\nflow relations:");
        for pair in view.pairs.iter() {
            println!("  [{}] {pair}", pair.kind);
        }
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}
