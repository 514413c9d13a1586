use std::path::{Path, PathBuf};

use crate::error::{FitErr, Result};

/// Default tolerance on the pivots of the equilibrated normal equations.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Checks that `tolerance` can separate singular from regular systems.
///
/// # Errors
/// Returns `FitErr::InvalidTolerance` unless `tolerance` is finite and
/// greater than 0.
pub fn validate_tolerance(tolerance: f64) -> Result<f64> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(tolerance)
    } else {
        Err(FitErr::InvalidTolerance(tolerance))
    }
}

/// Header names of the three required CSV columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    height: String,
    num_entities: String,
    memory: String,
}

impl Columns {
    /// Creates a new `Columns`.
    ///
    /// # Args
    /// * `height` - Header of the tree height column (x).
    /// * `num_entities` - Header of the entity count column (y).
    /// * `memory` - Header of the memory usage column (z).
    pub fn new(
        height: impl Into<String>,
        num_entities: impl Into<String>,
        memory: impl Into<String>,
    ) -> Self {
        Self {
            height: height.into(),
            num_entities: num_entities.into(),
            memory: memory.into(),
        }
    }

    pub fn height(&self) -> &str {
        &self.height
    }

    pub fn num_entities(&self) -> &str {
        &self.num_entities
    }

    pub fn memory(&self) -> &str {
        &self.memory
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self::new("height", "num_entities", "memory(MB)")
    }
}

/// How the fit is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A (height, number of entities) pair to estimate memory usage for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatePoint {
    pub height: f64,
    pub num_entities: f64,
}

/// Immutable settings of a single run.
#[derive(Debug, Clone)]
pub struct FitConfig {
    columns: Columns,
    tolerance: f64,
    plot: Option<PathBuf>,
    format: OutputFormat,
    estimates: Vec<EstimatePoint>,
}

impl FitConfig {
    /// Creates a new fit configuration with text output and no plot.
    ///
    /// # Args
    /// * `columns` - The CSV headers to read.
    /// * `tolerance` - Singularity tolerance of the solver.
    ///
    /// # Returns
    /// A `FitConfig` instance.
    ///
    /// # Errors
    /// Returns `FitErr::InvalidTolerance` if `tolerance` is not finite or
    /// not greater than 0.
    pub fn new(columns: Columns, tolerance: f64) -> Result<Self> {
        Ok(Self {
            columns,
            tolerance: validate_tolerance(tolerance)?,
            plot: None,
            format: OutputFormat::default(),
            estimates: Vec::new(),
        })
    }

    /// Sets the SVG file the scatter plot is written to.
    pub fn with_plot(mut self, path: impl Into<PathBuf>) -> Self {
        self.plot = Some(path.into());
        self
    }

    /// Sets how the report is written to stdout.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the points whose memory usage is estimated with the fitted plane.
    pub fn with_estimates(mut self, estimates: Vec<EstimatePoint>) -> Self {
        self.estimates = estimates;
        self
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn plot(&self) -> Option<&Path> {
        self.plot.as_deref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn estimates(&self) -> &[EstimatePoint] {
        &self.estimates
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            columns: Columns::default(),
            tolerance: DEFAULT_TOLERANCE,
            plot: None,
            format: OutputFormat::default(),
            estimates: Vec::new(),
        }
    }
}
