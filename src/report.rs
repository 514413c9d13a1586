use std::fmt;

use serde::Serialize;

use crate::{config::EstimatePoint, fit::FitResult};

/// A memory usage estimate made with the fitted plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub height: f64,
    pub num_entities: f64,
    pub memory_mb: f64,
}

/// Everything printed after a successful fit.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    #[serde(flatten)]
    fit: &'a FitResult,
    estimates: Vec<Estimate>,
}

impl<'a> Report<'a> {
    /// Creates a new `Report`, evaluating the fitted plane at each point of
    /// `estimates`.
    pub fn new(fit: &'a FitResult, estimates: &[EstimatePoint]) -> Self {
        let plane = fit.plane();
        let estimates = estimates
            .iter()
            .map(|p| Estimate {
                height: p.height,
                num_entities: p.num_entities,
                memory_mb: plane.predict(p.height, p.num_entities),
            })
            .collect();

        Self { fit, estimates }
    }

    pub fn estimates(&self) -> &[Estimate] {
        &self.estimates
    }

    /// Renders the report as a single JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The plain text report:
///
/// ```text
/// solution: 2.000000 x + 3.000000 y + 0.000000 = z
/// errors:
/// [[0.000000]
///  [-0.000000]]
/// residual: 0
/// ```
impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plane = self.fit.plane();
        writeln!(
            f,
            "solution: {:.6} x + {:.6} y + {:.6} = z",
            plane.a, plane.b, plane.c
        )?;

        writeln!(f, "errors:")?;
        let errors = self.fit.errors();
        for (i, e) in errors.iter().enumerate() {
            let open = if i == 0 { "[[" } else { " [" };
            let close = if i + 1 == errors.len() { "]]" } else { "]" };
            writeln!(f, "{open}{e:.6}{close}")?;
        }

        write!(f, "residual: {}", self.fit.residual())?;

        for e in &self.estimates {
            write!(
                f,
                "\nestimate: height={} num_entities={} memory_mb={:.6}",
                e.height, e.num_entities, e.memory_mb
            )?;
        }

        Ok(())
    }
}
