//! Least-squares plane fitting of benchmark memory measurements.
//!
//! Loads a table of `(height, num_entities, memory)` rows, fits
//! `memory ≈ a*height + b*num_entities + c` through the normal equations and
//! reports the coefficients together with the residuals.

pub mod config;
pub mod dataset;
pub mod error;
pub mod fit;
pub mod linalg;
pub mod plot;
pub mod report;
#[cfg(test)]
mod test_utils;

pub use config::{Columns, EstimatePoint, FitConfig, OutputFormat};
pub use dataset::{Dataset, Record};
pub use error::{FitErr, InputErr, Result};
pub use fit::{fit, FitResult, Plane, PlaneFitter};
pub use report::Report;

/// Loads the table at `path`, fits a plane and writes the report to `out`.
///
/// Nothing is written unless both loading and fitting succeed. The plot, if
/// configured, is drawn after the report has been written.
///
/// # Errors
/// Any `FitErr` raised by loading, fitting, writing or plotting.
pub fn run<P, W>(path: P, config: &FitConfig, out: &mut W) -> Result<FitResult>
where
    P: AsRef<std::path::Path>,
    W: std::io::Write,
{
    let dataset = Dataset::from_path(path, config.columns())?;
    let result = PlaneFitter::new(config.tolerance())?.fit(&dataset)?;

    let rendered = {
        let report = Report::new(&result, config.estimates());
        match config.format() {
            OutputFormat::Text => report.to_string(),
            OutputFormat::Json => report.to_json()?,
        }
    };
    writeln!(out, "{rendered}")?;
    out.flush()?;

    if let Some(plot) = config.plot() {
        plot::scatter_3d(&dataset, plot)?;
    }

    Ok(result)
}
