//! Signal Features - command line entry point
//!
//! Reads daily bars from CSV or JSON, computes the feature table and writes
//! it back out as CSV or JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use signal_features::logger::{init_logger, level_from_name, INFO};
use signal_features::setting::{project_path, DEFAULT_SETTING_FILENAME};
use signal_features::{BarSource, FeaturePipeline, FeatureSettings, FeatureTable, JsonBarSource};

#[derive(Parser, Debug)]
#[command(
    name = "signal_features",
    version,
    about = "Compute momentum, trend and volatility features from daily OHLCV bars"
)]
struct Cli {
    /// Input bars: a CSV file with a header row, or a JSON array of bars
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,

    /// Output file; the extension selects CSV or JSON
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    output: PathBuf,

    /// Parameter file (defaults to params.json under the project root)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fast SMA window
    #[arg(long)]
    sma_fast: Option<usize>,

    /// Mid SMA window, also used for the distance feature
    #[arg(long)]
    sma_mid: Option<usize>,

    /// Slow SMA window
    #[arg(long)]
    sma_slow: Option<usize>,

    /// Rolling standard deviation window
    #[arg(long)]
    vol_window: Option<usize>,

    /// Reject SMA windows that are not ordered fast < mid < slow
    #[arg(long, default_value_t = false)]
    strict_window_order: bool,

    /// Run the feature stages one after another instead of in parallel
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Drop warm-up rows where any feature is missing
    #[arg(long, default_value_t = false)]
    drop_missing: bool,

    /// Log level (debug, info, warning, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Format::Csv),
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        _ => bail!("unsupported file type: {}", path.display()),
    }
}

fn load_settings(cli: &Cli) -> Result<FeatureSettings> {
    let mut settings = match &cli.config {
        Some(path) => FeatureSettings::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => FeatureSettings::load_or_default(project_path([DEFAULT_SETTING_FILENAME]))?,
    };

    if let Some(value) = cli.sma_fast {
        settings.sma_fast = value;
    }
    if let Some(value) = cli.sma_mid {
        settings.sma_mid = value;
    }
    if let Some(value) = cli.sma_slow {
        settings.sma_slow = value;
    }
    if let Some(value) = cli.vol_window {
        settings.vol_window = value;
    }
    settings.strict_window_order |= cli.strict_window_order;
    if cli.sequential {
        settings.parallel = false;
    }
    Ok(settings)
}

fn write_json(path: &Path, table: &FeatureTable) -> Result<()> {
    let json = serde_json::to_string_pretty(&table.rows())?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(feature = "frame")]
fn write_csv(path: &Path, table: &FeatureTable) -> Result<()> {
    let mut frame = table.to_frame()?;
    signal_features::frame::write_csv(path, &mut frame)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(not(feature = "frame"))]
fn write_csv(path: &Path, _table: &FeatureTable) -> Result<()> {
    bail!("CSV output requires the `frame` feature: {}", path.display())
}

#[cfg(feature = "frame")]
fn load_bars_csv(path: &Path) -> Result<signal_features::PriceSeries> {
    let frame = signal_features::frame::read_csv(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(signal_features::frame::series_from_frame(&frame)?)
}

#[cfg(not(feature = "frame"))]
fn load_bars_csv(path: &Path) -> Result<signal_features::PriceSeries> {
    bail!("CSV input requires the `frame` feature: {}", path.display())
}

/// CSV to CSV keeps every input column, features are appended after them
#[cfg(feature = "frame")]
fn csv_to_csv(cli: &Cli, pipeline: &FeaturePipeline) -> Result<usize> {
    use signal_features::frame;

    let input = frame::read_csv(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    let mut output = frame::features_frame(&input, pipeline)?;
    if cli.drop_missing {
        output = frame::drop_missing_rows(&output, &pipeline.column_names())?;
    }
    frame::write_csv(&cli.output, &mut output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    Ok(output.height())
}

#[cfg(not(feature = "frame"))]
fn csv_to_csv(cli: &Cli, _pipeline: &FeaturePipeline) -> Result<usize> {
    bail!("CSV input requires the `frame` feature: {}", cli.input.display())
}

fn to_table(cli: &Cli, pipeline: &FeaturePipeline) -> Result<usize> {
    let bars = match format_of(&cli.input)? {
        Format::Csv => load_bars_csv(&cli.input)?,
        Format::Json => JsonBarSource::new(&cli.input)
            .load()
            .with_context(|| format!("Failed to load {}", cli.input.display()))?,
    };

    let mut table = pipeline.run(bars)?;
    if cli.drop_missing {
        table = table.drop_missing();
    }

    match format_of(&cli.output)? {
        Format::Csv => write_csv(&cli.output, &table)?,
        Format::Json => write_json(&cli.output, &table)?,
    }
    Ok(table.len())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = level_from_name(&cli.log_level).unwrap_or(INFO);
    init_logger(level, cli.log_json);

    let settings = load_settings(&cli)?;
    let pipeline = FeaturePipeline::new(settings)?;

    let rows = match (format_of(&cli.input)?, format_of(&cli.output)?) {
        (Format::Csv, Format::Csv) => csv_to_csv(&cli, &pipeline)?,
        _ => to_table(&cli, &pipeline)?,
    };

    info!(rows, output = %cli.output.display(), "features written");
    Ok(())
}
