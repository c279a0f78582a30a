//! Intensity-weighted centroid (center of mass) of a window.
//!
//! Single pass over the window marginals; naturally sub-pixel and exact for
//! symmetric spots fully contained in the window.

use ndarray::{ArrayView2, Axis};

use crate::consts::EPSILON;

/// Intensity-weighted centroid `(row, col)` in window coordinates:
/// `Σ I·coord / Σ I` per axis.
///
/// Returns `None` when the total intensity is (numerically) zero, leaving the caller to
/// decide the fallback.
pub fn weighted_centroid(data: &ArrayView2<f32>) -> Option<(f64, f64)> {
    let total: f64 = data.iter().map(|&v| v as f64).sum();
    if total.abs() < EPSILON || !total.is_finite() {
        return None;
    }

    let row_profile = data.map(|&v| v as f64).sum_axis(Axis(1));
    let col_profile = data.map(|&v| v as f64).sum_axis(Axis(0));

    let row = moment(row_profile.iter().copied()) / total;
    let col = moment(col_profile.iter().copied()) / total;
    Some((row, col))
}

/// First moment `Σ i·p[i]` of a 1D profile.
fn moment(profile: impl Iterator<Item = f64>) -> f64 {
    profile.enumerate().map(|(i, p)| i as f64 * p).sum()
}
