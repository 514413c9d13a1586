use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, FitErr>;

/// Failures while reading the input table, raised before any matrix is built.
#[derive(Debug)]
pub enum InputErr {
    /// The input file could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// The CSV reader rejected the input.
    Csv(csv::Error),
    /// A required header is absent.
    MissingColumn { column: String },
    /// A cell of a required column is not a finite number. `row` is 1-based.
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },
    /// The table has a header but no data rows.
    Empty,
}

/// The crate's error type.
#[derive(Debug)]
pub enum FitErr {
    /// The input table could not be loaded.
    Input(InputErr),
    /// The singularity tolerance is not a finite number greater than zero.
    InvalidTolerance(f64),
    /// The normal-equations matrix is singular.
    DegenerateFit { points: usize, pivot: f64 },
    /// The report could not be serialized.
    Serialize(serde_json::Error),
    /// The report could not be written out.
    Output(io::Error),
    /// The scatter plot could not be drawn.
    Plot(String),
}

impl Display for InputErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputErr::Open { path, source } => {
                write!(f, "cannot open {}: {source}", path.display())
            }
            InputErr::Csv(e) => write!(f, "malformed csv: {e}"),
            InputErr::MissingColumn { column } => {
                write!(f, "required column {column:?} is missing")
            }
            InputErr::NonNumeric { row, column, value } => write!(
                f,
                "row {row}, column {column:?}: {value:?} is not a finite number"
            ),
            InputErr::Empty => write!(f, "the table has no data rows"),
        }
    }
}

impl Display for FitErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitErr::Input(e) => write!(f, "invalid input: {e}"),
            FitErr::InvalidTolerance(t) => {
                write!(f, "tolerance must be a finite number greater than 0, got {t}")
            }
            FitErr::DegenerateFit { points, pivot } => write!(
                f,
                "degenerate fit: the normal equations of {points} point(s) are singular \
                 (pivot {pivot:e}), need at least 3 points not all collinear in the x-y plane"
            ),
            FitErr::Serialize(e) => write!(f, "cannot serialize report: {e}"),
            FitErr::Output(e) => write!(f, "cannot write report: {e}"),
            FitErr::Plot(msg) => write!(f, "plot failed: {msg}"),
        }
    }
}

impl Error for InputErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InputErr::Open { source, .. } => Some(source),
            InputErr::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl Error for FitErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FitErr::Input(e) => Some(e),
            FitErr::Serialize(e) => Some(e),
            FitErr::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InputErr> for FitErr {
    fn from(value: InputErr) -> Self {
        Self::Input(value)
    }
}

impl From<serde_json::Error> for FitErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<io::Error> for FitErr {
    fn from(value: io::Error) -> Self {
        Self::Output(value)
    }
}

impl From<csv::Error> for FitErr {
    fn from(value: csv::Error) -> Self {
        Self::Input(InputErr::Csv(value))
    }
}
