use std::{io, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use plane_fit::{
    config::{self, DEFAULT_TOLERANCE},
    Columns, EstimatePoint, FitConfig, OutputFormat,
};

/// Fits a least-squares plane `memory = a*height + b*num_entities + c`
/// through a table of benchmark results.
#[derive(Parser)]
#[command(name = "plane-fit", version)]
struct Cli {
    /// CSV file with a header row.
    path: PathBuf,

    /// Header of the height column (x).
    #[arg(long, default_value = "height")]
    height_column: String,

    /// Header of the number of entities column (y).
    #[arg(long, default_value = "num_entities")]
    entities_column: String,

    /// Header of the memory usage column (z).
    #[arg(long, default_value = "memory(MB)")]
    memory_column: String,

    /// Smallest pivot of the equilibrated normal equations not considered singular.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE, value_parser = parse_tolerance)]
    tolerance: f64,

    /// Write a 3D scatter plot of the points to this SVG file.
    #[arg(long)]
    plot: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Estimate memory usage at HEIGHT:NUM_ENTITIES with the fitted plane.
    #[arg(long, value_name = "HEIGHT:NUM_ENTITIES", value_parser = parse_estimate)]
    estimate: Vec<EstimatePoint>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tolerance = s
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("{s:?} is not a number: {e}"))?;
    config::validate_tolerance(tolerance).map_err(|e| e.to_string())
}

fn parse_estimate(s: &str) -> Result<EstimatePoint, String> {
    let (height, num_entities) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HEIGHT:NUM_ENTITIES, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{v:?} is not a finite number"))
    };

    Ok(EstimatePoint {
        height: parse(height)?,
        num_entities: parse(num_entities)?,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let columns = Columns::new(cli.height_column, cli.entities_column, cli.memory_column);
    let mut config = FitConfig::new(columns, cli.tolerance)?
        .with_format(cli.format.into())
        .with_estimates(cli.estimate);
    if let Some(plot) = cli.plot {
        config = config.with_plot(plot);
    }

    info!("fitting plane through {}", cli.path.display());
    plane_fit::run(&cli.path, &config, &mut io::stdout().lock())
        .with_context(|| format!("cannot fit {}", cli.path.display()))?;

    Ok(())
}
