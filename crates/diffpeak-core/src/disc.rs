//! Synthetic reference disc for cross-correlation.

use ndarray::Array2;

use crate::consts::DISC_SUPERSAMPLE;

/// Square `size x size` image holding a filled disc of `radius` pixels
/// centered on pixel `(size / 2, size / 2)`.
///
/// Edge pixels take the fraction of their area covered by the disc
/// (estimated on a `DISC_SUPERSAMPLE x DISC_SUPERSAMPLE` sub-grid), so the
/// disc rim is antialiased rather than stair-stepped.
pub fn simulated_disc(size: usize, radius: f64) -> Array2<f32> {
    let center = (size / 2) as f64;
    let n = DISC_SUPERSAMPLE;
    let step = 1.0 / n as f64;
    let r2 = radius * radius;
    let samples = (n * n) as f32;

    Array2::from_shape_fn((size, size), |(row, col)| {
        let dy0 = row as f64 - center;
        let dx0 = col as f64 - center;

        // Pixels well inside or outside the rim need no sub-sampling.
        let dist = (dy0 * dy0 + dx0 * dx0).sqrt();
        if dist + std::f64::consts::SQRT_2 < radius {
            return 1.0;
        }
        if dist - std::f64::consts::SQRT_2 > radius {
            return 0.0;
        }

        let mut inside = 0usize;
        for i in 0..n {
            let dy = dy0 - 0.5 + (i as f64 + 0.5) * step;
            for j in 0..n {
                let dx = dx0 - 0.5 + (j as f64 + 0.5) * step;
                if dy * dy + dx * dx < r2 {
                    inside += 1;
                }
            }
        }
        inside as f32 / samples
    })
}
