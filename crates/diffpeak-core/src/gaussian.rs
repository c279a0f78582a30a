//! Elliptical 2D Gaussian model and Levenberg-Marquardt least-squares fit.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView2};
use thiserror::Error;

use crate::consts::{
    DEFAULT_GAUSSIAN_MAX_ITERATIONS, DEFAULT_GAUSSIAN_TOLERANCE, LM_INITIAL_LAMBDA, LM_MAX_LAMBDA,
};

/// `A * exp(-(a dx² + 2 b dx dy + c dy²)) + background`, with `a, b, c`
/// derived from the two widths and the rotation angle.
///
/// `x` runs along columns and `y` along rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gaussian2D {
    pub amplitude: f64,
    pub x0: f64,
    pub y0: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    /// Rotation of the x width axis, radians.
    pub theta: f64,
    pub background: f64,
}

impl Gaussian2D {
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let (cos, sin) = (self.theta.cos(), self.theta.sin());
        let sx2 = self.sigma_x * self.sigma_x;
        let sy2 = self.sigma_y * self.sigma_y;
        let a = cos * cos / (2.0 * sx2) + sin * sin / (2.0 * sy2);
        let b = (2.0 * self.theta).sin() * (1.0 / (4.0 * sy2) - 1.0 / (4.0 * sx2));
        let c = sin * sin / (2.0 * sx2) + cos * cos / (2.0 * sy2);
        let dx = x - self.x0;
        let dy = y - self.y0;
        self.amplitude * (-(a * dx * dx + 2.0 * b * dx * dy + c * dy * dy)).exp() + self.background
    }

    /// Sample the model on an `h x w` pixel grid.
    pub fn render(&self, h: usize, w: usize) -> Array2<f32> {
        Array2::from_shape_fn((h, w), |(row, col)| self.evaluate(col as f64, row as f64) as f32)
    }

    /// Starting point for a fit on `data`: centered on the window pixel
    /// `(w / 2, h / 2)`, amplitude and background from the intensity range,
    /// widths a quarter of the window.
    pub fn initial_guess(data: &ArrayView2<f32>) -> Self {
        let (h, w) = data.dim();
        let (min, max) = data.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v as f64), hi.max(v as f64))
        });
        let (min, max) = if min.is_finite() { (min, max) } else { (0.0, 0.0) };
        Self {
            amplitude: max - min,
            x0: (w / 2) as f64,
            y0: (h / 2) as f64,
            sigma_x: (w as f64 / 4.0).max(0.5),
            sigma_y: (h as f64 / 4.0).max(0.5),
            theta: 0.0,
            background: min,
        }
    }

    fn to_params(self, fit_rotation: bool) -> DVector<f64> {
        let mut p = vec![
            self.amplitude,
            self.x0,
            self.y0,
            self.sigma_x,
            self.sigma_y,
            self.background,
        ];
        if fit_rotation {
            p.push(self.theta);
        }
        DVector::from_vec(p)
    }

    fn from_params(p: &DVector<f64>, theta: f64) -> Self {
        Self {
            amplitude: p[0],
            x0: p[1],
            y0: p[2],
            sigma_x: p[3],
            sigma_y: p[4],
            background: p[5],
            theta: if p.len() > 6 { p[6] } else { theta },
        }
    }
}

/// Knobs of the least-squares solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    /// Fit the rotation angle as a seventh parameter.
    pub fit_rotation: bool,
    pub max_iterations: usize,
    /// Relative parameter step below which the fit is converged.
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            fit_rotation: false,
            max_iterations: DEFAULT_GAUSSIAN_MAX_ITERATIONS,
            tolerance: DEFAULT_GAUSSIAN_TOLERANCE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GaussianFit {
    pub gaussian: Gaussian2D,
    pub iterations: usize,
    /// Final sum of squared residuals.
    pub cost: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("{points} samples cannot constrain {params} parameters")]
    TooFewPoints { points: usize, params: usize },

    #[error("no convergence after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("damping diverged without reducing the residual")]
    Stalled,

    #[error("non-finite parameters or residuals")]
    NonFinite,

    #[error("degenerate fit: {0}")]
    Degenerate(String),
}

/// Fit an elliptical Gaussian to `data` with Levenberg-Marquardt, starting
/// from `initial`. The Jacobian is taken by central differences.
pub fn fit_gaussian_2d(
    data: &ArrayView2<f32>,
    initial: Gaussian2D,
    options: &FitOptions,
) -> Result<GaussianFit, FitError> {
    let (h, w) = data.dim();
    let samples: Vec<(f64, f64, f64)> = data
        .indexed_iter()
        .map(|((row, col), &v)| (col as f64, row as f64, v as f64))
        .collect();

    let mut params = initial.to_params(options.fit_rotation);
    let n_params = params.len();
    if samples.len() <= n_params {
        return Err(FitError::TooFewPoints {
            points: samples.len(),
            params: n_params,
        });
    }

    let residuals = |p: &DVector<f64>| -> DVector<f64> {
        let model = Gaussian2D::from_params(p, initial.theta);
        DVector::from_iterator(
            samples.len(),
            samples.iter().map(|&(x, y, v)| model.evaluate(x, y) - v),
        )
    };

    let mut r = residuals(&params);
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(FitError::NonFinite);
    }

    // The center must stay on the window; steps leaving it are rejected.
    let inside = |v: f64, n: usize| v >= -0.5 && v <= n as f64 - 0.5;
    let on_window = |p: &DVector<f64>| inside(p[1], w) && inside(p[2], h);

    let mut lambda = LM_INITIAL_LAMBDA;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations && !converged {
        iterations += 1;
        let jac = jacobian(&params, &residuals, samples.len());
        let jtj = jac.transpose() * &jac;
        let gradient = jac.transpose() * &r;

        let rhs = -gradient;
        let max_diag = jtj.diagonal().iter().copied().fold(0.0, f64::max);
        let floor = (max_diag * 1e-9).max(f64::MIN_POSITIVE);

        loop {
            let mut damped = jtj.clone();
            for i in 0..n_params {
                damped[(i, i)] += lambda * jtj[(i, i)].max(floor);
            }

            let Some(chol) = damped.cholesky() else {
                lambda *= 10.0;
                if lambda > LM_MAX_LAMBDA {
                    return Err(FitError::Stalled);
                }
                continue;
            };
            let step = chol.solve(&rhs);
            let small_step = step.norm() <= options.tolerance * (params.norm() + options.tolerance);

            let candidate = &params + &step;
            let r_new = residuals(&candidate);
            let cost_new = r_new.norm_squared();

            if on_window(&candidate) && cost_new.is_finite() && cost_new < cost {
                let reduction = (cost - cost_new) / cost.max(f64::MIN_POSITIVE);
                params = candidate;
                r = r_new;
                cost = cost_new;
                lambda = (lambda / 10.0).max(f64::EPSILON);
                converged = small_step || reduction < options.tolerance * options.tolerance;
                break;
            }

            if small_step {
                // No descent left at machine precision: already at the minimum.
                converged = true;
                break;
            }

            lambda *= 10.0;
            if lambda > LM_MAX_LAMBDA {
                return Err(FitError::Stalled);
            }
        }
    }

    if !converged {
        return Err(FitError::NotConverged { iterations });
    }

    let mut gaussian = Gaussian2D::from_params(&params, initial.theta);
    if params.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    if gaussian.amplitude <= 0.0 {
        return Err(FitError::Degenerate("no peak above background".into()));
    }
    if gaussian.sigma_x == 0.0 || gaussian.sigma_y == 0.0 {
        return Err(FitError::Degenerate("zero width".into()));
    }
    gaussian.sigma_x = gaussian.sigma_x.abs();
    gaussian.sigma_y = gaussian.sigma_y.abs();

    if !inside(gaussian.x0, w) || !inside(gaussian.y0, h) {
        return Err(FitError::Degenerate(format!(
            "center ({:.2}, {:.2}) outside {}x{} window",
            gaussian.x0, gaussian.y0, w, h
        )));
    }

    Ok(GaussianFit {
        gaussian,
        iterations,
        cost,
    })
}

/// Central-difference Jacobian of `residuals` at `params`.
fn jacobian<F>(params: &DVector<f64>, residuals: &F, n_samples: usize) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut jac = DMatrix::<f64>::zeros(n_samples, params.len());
    for k in 0..params.len() {
        let step = 1e-6 * params[k].abs().max(1.0);
        let mut forward = params.clone();
        let mut backward = params.clone();
        forward[k] += step;
        backward[k] -= step;
        let column = (residuals(&forward) - residuals(&backward)) / (2.0 * step);
        jac.set_column(k, &column);
    }
    jac
}
