use ndarray::{linalg, prelude::*};

/// Outcome of solving a linear system that turned out to be singular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Singular {
    /// The offending pivot of the equilibrated system (0 for an empty column).
    pub pivot: f64,
}

/// The normal equations `AᵗA·x = Aᵗb` of a least-squares problem.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    ata: Array2<f64>,
    atb: Array1<f64>,
}

impl NormalEquations {
    /// Forms `AᵗA` and `Aᵗb`.
    ///
    /// # Arguments
    /// * `a` - The `N×k` design matrix.
    /// * `b` - The `N` target values.
    ///
    /// # Panics
    /// If `b.len() != a.nrows()`.
    pub fn new(a: ArrayView2<f64>, b: ArrayView1<f64>) -> Self {
        let k = a.ncols();
        let mut ata = Array2::zeros((k, k));
        linalg::general_mat_mul(1.0, &a.t(), &a, 0.0, &mut ata);
        let atb = a.t().dot(&b);

        Self { ata, atb }
    }

    pub fn lhs(&self) -> ArrayView2<'_, f64> {
        self.ata.view()
    }

    pub fn rhs(&self) -> ArrayView1<'_, f64> {
        self.atb.view()
    }

    /// Solves the system, i.e. computes `(AᵗA)⁻¹Aᵗb`.
    ///
    /// The system is first equilibrated with `D = diag(1/√(AᵗA)ᵢᵢ)` so that
    /// `D·AᵗA·D` has a unit diagonal, then solved by Gaussian elimination
    /// with partial pivoting. `tolerance` bounds the magnitude of the pivots
    /// of the equilibrated matrix, which keeps it independent of the scale
    /// of each column.
    ///
    /// # Errors
    /// Returns `Singular` if a diagonal entry is zero or a pivot falls below
    /// `tolerance`.
    pub fn solve(&self, tolerance: f64) -> Result<Array1<f64>, Singular> {
        let n = self.atb.len();

        let mut d = Array1::<f64>::zeros(n);
        for (di, &m) in d.iter_mut().zip(self.ata.diag()) {
            if m <= 0.0 {
                return Err(Singular { pivot: 0.0 });
            }
            *di = m.sqrt().recip();
        }

        // Augmented matrix [D·AᵗA·D | D·Aᵗb].
        let mut aug = Array2::<f64>::zeros((n, n + 1));
        for i in 0..n {
            for j in 0..n {
                aug[[i, j]] = d[i] * self.ata[[i, j]] * d[j];
            }
            aug[[i, n]] = d[i] * self.atb[i];
        }
        log::debug!("equilibrated normal equations:\n{aug:.6}");

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&r, &s| aug[[r, col]].abs().total_cmp(&aug[[s, col]].abs()))
                .unwrap_or(col);
            let pivot = aug[[pivot_row, col]];
            log::debug!("pivot {col}: {pivot:e}");
            if pivot.is_nan() || pivot.abs() < tolerance {
                return Err(Singular { pivot });
            }

            if pivot_row != col {
                for j in 0..=n {
                    aug.swap([col, j], [pivot_row, j]);
                }
            }

            for row in col + 1..n {
                let factor = aug[[row, col]] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in col..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }

        let mut u = Array1::<f64>::zeros(n);
        for row in (0..n).rev() {
            let tail = aug
                .slice(s![row, row + 1..n])
                .dot(&u.slice(s![row + 1..n]));
            u[row] = (aug[[row, n]] - tail) / aug[[row, row]];
        }

        Ok(u * &d)
    }
}

/// Solves `min ‖A·x − b‖₂` through the normal equations.
///
/// Every column of `a` and the vector `b` are divided by their largest
/// magnitude before `AᵗA` is formed, so the products stay within `f64`
/// range for very large or very small inputs. The solution is scaled back
/// before it is returned.
///
/// # Errors
/// Returns `Singular` if the scaled normal equations are singular.
pub fn least_squares(
    a: ArrayView2<f64>,
    b: ArrayView1<f64>,
    tolerance: f64,
) -> Result<Array1<f64>, Singular> {
    let col_scale = a.map_axis(Axis(0), scale_of);
    let b_scale = scale_of(b);

    let a_scaled = &a / &col_scale;
    let b_scaled = &b / b_scale;

    let normal = NormalEquations::new(a_scaled.view(), b_scaled.view());
    log::debug!("scaled AᵗA:\n{}\nscaled Aᵗb: {}", normal.lhs(), normal.rhs());

    let u = normal.solve(tolerance)?;
    Ok(u / &col_scale * b_scale)
}

/// Largest magnitude of `v`, or 1 when `v` is all zeros.
fn scale_of(v: ArrayView1<f64>) -> f64 {
    let max = v.fold(0.0_f64, |m, x| m.max(x.abs()));
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

/// Euclidean norm of a vector, computed without overflow or underflow of
/// the squares.
pub fn norm(v: ArrayView1<f64>) -> f64 {
    let max = v.fold(0.0_f64, |m, x| m.max(x.abs()));
    if max == 0.0 || !max.is_finite() {
        return max;
    }

    let scaled = &v / max;
    scaled.dot(&scaled).sqrt() * max
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    use super::*;

    #[test]
    fn forms_normal_equations() {
        let a = array![[1., 2.], [3., 4.], [5., 6.]];
        let b = array![1., 0., 1.];

        let ne = NormalEquations::new(a.view(), b.view());
        assert_eq!(ne.lhs(), array![[35., 44.], [44., 56.]]);
        assert_eq!(ne.rhs(), array![6., 8.]);
    }

    #[test]
    fn solves_square_system() {
        // x = 1, y = -2, z = 3
        let a = array![[2., 1., -1.], [-3., -1., 2.], [-2., 1., 2.]];
        let x = array![1., -2., 3.];
        let b = a.dot(&x);

        let got = NormalEquations::new(a.view(), b.view())
            .solve(1e-10)
            .unwrap();
        for (g, e) in got.iter().zip(&x) {
            assert_abs_diff_eq!(g, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn columns_of_very_different_scale_are_not_singular() {
        let a = array![
            [16., 1e3, 1.],
            [20., 5e5, 1.],
            [24., 2e4, 1.],
            [32., 8e6, 1.],
        ];
        let x = array![1.25, 7.5e-4, -20.];
        let b = a.dot(&x);

        let got = NormalEquations::new(a.view(), b.view())
            .solve(1e-10)
            .unwrap();
        assert_abs_diff_eq!(got[0], x[0], epsilon = 1e-8);
        assert_abs_diff_eq!(got[1], x[1], epsilon = 1e-10);
        assert_abs_diff_eq!(got[2], x[2], epsilon = 1e-6);
    }

    #[test]
    fn dependent_columns_are_singular() {
        let a = array![[1., 2., 1.], [2., 4., 1.], [3., 6., 1.]];
        let b = array![1., 2., 3.];

        let err = NormalEquations::new(a.view(), b.view())
            .solve(1e-10)
            .unwrap_err();
        assert!(err.pivot.abs() < 1e-10);
    }

    #[test]
    fn zero_column_is_singular() {
        let a = array![[0., 1., 1.], [0., 2., 1.], [0., 3., 1.]];
        let b = array![1., 2., 3.];

        let err = NormalEquations::new(a.view(), b.view())
            .solve(1e-10)
            .unwrap_err();
        assert_eq!(err, Singular { pivot: 0.0 });
    }

    #[test]
    fn norm_is_euclidean() {
        assert_abs_diff_eq!(norm(array![3., -4.].view()), 5.0);
        assert_abs_diff_eq!(norm(array![0., 0.].view()), 0.0);
    }

    #[test]
    fn norm_of_extreme_magnitudes() {
        let huge = norm(array![3e200, -4e200].view());
        assert_relative_eq!(huge, 5e200, max_relative = 1e-12);

        let tiny = norm(array![3e-200, 4e-200].view());
        assert_relative_eq!(tiny, 5e-200, max_relative = 1e-12);
    }

    #[test]
    fn least_squares_survives_extreme_magnitudes() {
        for scale in [1e160, 1e-170] {
            let a = array![
                [0., 0., 1.],
                [scale, 0., 1.],
                [0., scale, 1.],
                [scale, scale, 1.],
            ];
            let b = array![1., 2., 3., 4.] * scale;
            let x = least_squares(a.view(), b.view(), 1e-10).unwrap();

            // b = x + 2y + scale
            assert_relative_eq!(x[0], 1., max_relative = 1e-12);
            assert_relative_eq!(x[1], 2., max_relative = 1e-12);
            assert_relative_eq!(x[2], scale, max_relative = 1e-12);
        }
    }

    #[test]
    fn least_squares_keeps_zero_columns_singular() {
        let a = array![[0., 1., 1.], [0., 2., 1.], [0., 3., 1.]];
        let b = array![0., 0., 0.];

        assert_eq!(
            least_squares(a.view(), b.view(), 1e-10),
            Err(Singular { pivot: 0.0 })
        );
    }
}
