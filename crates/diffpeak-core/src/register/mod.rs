//! Translation registration by cross-correlation in the frequency domain.
//!
//! Two stages:
//! 1. **Coarse**: the cross-correlation surface `IFFT(F(reference) * conj(F(moving)))`
//!    gives the integer-pixel displacement at its maximum.
//! 2. **Fine**: when `upsample_factor > 1`, the correlation is re-evaluated
//!    with a matrix-multiply DFT on a small grid of spacing `1/upsample_factor`
//!    around the coarse peak (Guizar-Sicairos et al., Optics Letters 33(2), 2008).

pub mod fft;

use ndarray::{Array2, ArrayView2};
use num_complex::Complex;

use crate::consts::UPSAMPLED_REGION_PIXELS;
use crate::error::{DiffpeakError, Result};

pub use fft::{fft2d, fft_frequencies, ifft2d};

/// Displacement of the reference image content relative to the moving image,
/// in pixels. Adding it to a position in `moving` gives the matching position
/// in `reference`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

/// Register `moving` against `reference` to ~`1/upsample_factor` pixel.
pub fn register_translation(
    reference: &ArrayView2<f32>,
    moving: &ArrayView2<f32>,
    upsample_factor: usize,
) -> Result<Translation> {
    let (h, w) = reference.dim();
    let (mh, mw) = moving.dim();
    if h != mh || w != mw {
        return Err(DiffpeakError::InvalidParameter(format!(
            "Array size mismatch: {}x{} vs {}x{}",
            w, h, mw, mh
        )));
    }
    if upsample_factor == 0 {
        return Err(DiffpeakError::InvalidParameter(
            "upsample_factor must be >= 1".into(),
        ));
    }
    if h == 0 || w == 0 {
        return Ok(Translation::default());
    }

    let product = cross_power(&fft2d(reference), &fft2d(moving));
    let correlation = ifft2d(&product);
    let (peak_row, peak_col) = find_peak(&correlation);

    let coarse = Translation {
        dx: signed_shift(peak_col, w),
        dy: signed_shift(peak_row, h),
    };

    if upsample_factor == 1 {
        return Ok(coarse);
    }

    let upsample = upsample_factor as f64;
    let region = (UPSAMPLED_REGION_PIXELS * upsample).ceil() as usize;
    let dft_shift = (region / 2) as f64;

    // Grid positions (in pixels) at which the correlation is re-evaluated.
    let rows: Vec<f64> = (0..region)
        .map(|j| coarse.dy + (j as f64 - dft_shift) / upsample)
        .collect();
    let cols: Vec<f64> = (0..region)
        .map(|j| coarse.dx + (j as f64 - dft_shift) / upsample)
        .collect();

    let upsampled = upsampled_correlation(&product, &rows, &cols);
    let (best_row, best_col) = find_peak(&upsampled);

    Ok(Translation {
        dx: cols[best_col],
        dy: rows[best_row],
    })
}

/// Unnormalized cross-power spectrum `a * conj(b)`.
fn cross_power(a: &Array2<Complex<f64>>, b: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let mut result = a.clone();
    result.zip_mut_with(b, |x, y| *x *= y.conj());
    result
}

/// `(row, col)` of the largest magnitude.
fn find_peak(data: &Array2<Complex<f64>>) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_val = f64::NEG_INFINITY;
    for ((row, col), v) in data.indexed_iter() {
        let mag = v.norm();
        if mag > best_val {
            best_val = mag;
            best = (row, col);
        }
    }
    best
}

/// Map an FFT index to a signed shift: indices past the midpoint wrap to
/// negative displacements.
fn signed_shift(index: usize, n: usize) -> f64 {
    if index > n / 2 {
        index as f64 - n as f64
    } else {
        index as f64
    }
}

/// Evaluate the inverse DFT of `spectrum` at arbitrary (fractional) row and
/// column positions: `K_rows * spectrum * K_cols`, where
/// `K_rows[j, k] = exp(+2πi f_k y_j)` and `K_cols[l, j] = exp(+2πi f_l x_j)`.
///
/// The result is unnormalized; only the location of its maximum is used.
fn upsampled_correlation(
    spectrum: &Array2<Complex<f64>>,
    rows: &[f64],
    cols: &[f64],
) -> Array2<Complex<f64>> {
    let (h, w) = spectrum.dim();
    let row_freqs = fft_frequencies(h);
    let col_freqs = fft_frequencies(w);

    let row_kernel = Array2::from_shape_fn((rows.len(), h), |(j, k)| {
        Complex::from_polar(1.0, std::f64::consts::TAU * row_freqs[k] * rows[j])
    });
    let col_kernel = Array2::from_shape_fn((w, cols.len()), |(l, j)| {
        Complex::from_polar(1.0, std::f64::consts::TAU * col_freqs[l] * cols[j])
    });

    row_kernel.dot(spectrum).dot(&col_kernel)
}
