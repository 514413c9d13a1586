use ndarray::Array1;
use serde::Serialize;

use crate::{
    config::{self, DEFAULT_TOLERANCE},
    dataset::Dataset,
    error::{FitErr, Result},
    linalg,
};

/// The plane `z = a*x + b*y + c`, with `x` the height and `y` the number of
/// entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Plane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Plane {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Evaluates the plane, i.e. estimates the memory usage in MB.
    pub fn predict(&self, height: f64, num_entities: f64) -> f64 {
        self.a * height + self.b * num_entities + self.c
    }
}

/// The least-squares plane of a dataset together with its residuals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    #[serde(flatten)]
    plane: Plane,
    errors: Vec<f64>,
    residual: f64,
}

impl FitResult {
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Signed residuals `actual - predicted`, in dataset order.
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Euclidean norm of `errors`.
    pub fn residual(&self) -> f64 {
        self.residual
    }
}

/// Fits planes through benchmark tables using the normal equations.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFitter {
    tolerance: f64,
}

impl PlaneFitter {
    /// Creates a new `PlaneFitter`.
    ///
    /// # Arguments
    /// * `tolerance` - Smallest pivot magnitude of the equilibrated normal
    ///   equations that is not considered singular.
    ///
    /// # Errors
    /// Returns `FitErr::InvalidTolerance` if `tolerance` is not finite or not
    /// greater than 0, since such a tolerance accepts singular systems.
    pub fn new(tolerance: f64) -> Result<Self> {
        Ok(Self {
            tolerance: config::validate_tolerance(tolerance)?,
        })
    }

    /// Fits `memory_mb ≈ a*height + b*num_entities + c` in the least-squares sense.
    ///
    /// # Errors
    /// Returns `FitErr::DegenerateFit` if `AᵗA` is singular: fewer than 3
    /// distinct points, or all of them collinear in the height/entities plane.
    pub fn fit(&self, dataset: &Dataset) -> Result<FitResult> {
        let points = dataset.len();
        if points < 3 {
            log::warn!("fitting a plane through {points} point(s), at least 3 are needed");
        }

        let a = dataset.design_matrix();
        let b = dataset.targets();

        let coef = linalg::least_squares(a.view(), b.view(), self.tolerance).map_err(|s| {
            FitErr::DegenerateFit {
                points,
                pivot: s.pivot,
            }
        })?;
        let plane = Plane::new(coef[0], coef[1], coef[2]);

        let errors: Array1<f64> = &b - &a.dot(&coef);
        let residual = linalg::norm(errors.view());
        log::info!(
            "fitted {} point(s): a = {}, b = {}, c = {}, residual = {residual}",
            points,
            plane.a,
            plane.b,
            plane.c
        );

        Ok(FitResult {
            plane,
            errors: errors.to_vec(),
            residual,
        })
    }
}

impl Default for PlaneFitter {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Fits a plane with the default tolerance.
pub fn fit(dataset: &Dataset) -> Result<FitResult> {
    PlaneFitter::default().fit(dataset)
}
