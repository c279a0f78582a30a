//! Per-peak estimators. Each takes the candidate in pixel coordinates
//! `[x, y]` and returns the refined pixel position.

use ndarray::{Array2, ArrayView2};

use crate::centroid::weighted_centroid;
use crate::consts::MIN_GAUSSIAN_WINDOW;
use crate::coords::PixelFrame;
use crate::error::{RefinementWarning, Result};
use crate::gaussian::{fit_gaussian_2d, FitOptions, Gaussian2D};
use crate::register::register_translation;
use crate::window::{crop_clipped, crop_padded};

use super::PeakOutcome;

/// Register the reference disc against a zero-padded window centered on the
/// nearest pixel. The registration gives the observed disc's displacement
/// from the template center, which is where the candidate sits in the window.
pub(super) fn cross_correlate(
    frame: &ArrayView2<f32>,
    geometry: &PixelFrame,
    pixel: [f64; 2],
    template: &Array2<f32>,
    upsample_factor: usize,
) -> Result<[f64; 2]> {
    let (row, col) = geometry.nearest_pixel(pixel);
    let window = crop_padded(frame, (row, col), template.nrows());
    let shift = register_translation(&window.data.view(), &template.view(), upsample_factor)?;
    Ok([col as f64 + shift.dx, row as f64 + shift.dy])
}

/// Intensity-weighted centroid of the edge-clipped window, in frame pixels.
/// An all-zero window leaves the candidate unchanged.
pub(super) fn center_of_mass(
    frame: &ArrayView2<f32>,
    geometry: &PixelFrame,
    pixel: [f64; 2],
    square_size: usize,
) -> [f64; 2] {
    let window = crop_clipped(frame, geometry.nearest_pixel(pixel), square_size);
    match weighted_centroid(&window.data.view()) {
        Some((row, col)) => window.to_frame(row, col),
        None => pixel,
    }
}

/// Center of a Gaussian fitted to the edge-clipped window. Falls back to the
/// candidate when the window is too small or the fit fails.
pub(super) fn local_gaussian(
    frame: &ArrayView2<f32>,
    geometry: &PixelFrame,
    pixel: [f64; 2],
    square_size: usize,
    options: &FitOptions,
) -> PeakOutcome {
    if square_size < MIN_GAUSSIAN_WINDOW {
        return PeakOutcome::unrefined(
            pixel,
            RefinementWarning::WindowTooSmall {
                size: square_size,
                minimum: MIN_GAUSSIAN_WINDOW,
            },
        );
    }

    let window = crop_clipped(frame, geometry.nearest_pixel(pixel), square_size);
    let clipped = window.height().min(window.width());
    if clipped < MIN_GAUSSIAN_WINDOW {
        return PeakOutcome::unrefined(
            pixel,
            RefinementWarning::WindowTooSmall {
                size: clipped,
                minimum: MIN_GAUSSIAN_WINDOW,
            },
        );
    }

    let data = window.data.view();
    match fit_gaussian_2d(&data, Gaussian2D::initial_guess(&data), options) {
        Ok(fit) => PeakOutcome::refined(window.to_frame(fit.gaussian.y0, fit.gaussian.x0)),
        Err(e) => PeakOutcome::unrefined(
            pixel,
            RefinementWarning::FitFailure {
                reason: e.to_string(),
            },
        ),
    }
}
