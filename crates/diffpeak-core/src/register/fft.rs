use ndarray::{Array2, ArrayView2, Axis};
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// 2D FFT of a real image: row-wise FFT, then column-wise FFT.
pub fn fft2d(data: &ArrayView2<f32>) -> Array2<Complex<f64>> {
    let mut result = data.mapv(|v| Complex::new(v as f64, 0.0));
    let (h, w) = result.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    transform_lanes(&mut result, Axis(0), &fft_row);
    transform_lanes(&mut result, Axis(1), &fft_col);
    result
}

/// Inverse 2D FFT, normalized by `1 / (h * w)`.
pub fn ifft2d(data: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let mut result = data.clone();
    let (h, w) = result.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    transform_lanes(&mut result, Axis(1), &ifft_col);
    transform_lanes(&mut result, Axis(0), &ifft_row);

    let scale = 1.0 / (h * w) as f64;
    result.mapv_inplace(|v| v * scale);
    result
}

/// Run `fft` over every lane obtained by iterating `data` along `axis`:
/// `Axis(0)` transforms rows, `Axis(1)` transforms columns.
fn transform_lanes(data: &mut Array2<Complex<f64>>, axis: Axis, fft: &Arc<dyn Fft<f64>>) {
    let (h, w) = data.dim();
    let process = |mut lane: ndarray::ArrayViewMut1<Complex<f64>>| {
        match lane.as_slice_mut() {
            Some(slice) => fft.process(slice),
            None => {
                let mut buf = lane.to_vec();
                fft.process(&mut buf);
                lane.iter_mut().zip(buf).for_each(|(dst, src)| *dst = src);
            }
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        data.axis_iter_mut(axis).into_par_iter().for_each(process);
    } else {
        data.axis_iter_mut(axis).for_each(process);
    }
}

/// Signed DFT sample frequencies in cycles per sample, in FFT order:
/// `[0, 1, ..., ceil(n/2) - 1, -floor(n/2), ..., -1] / n`.
pub fn fft_frequencies(n: usize) -> Vec<f64> {
    (0..n)
        .map(|k| {
            let k_signed = if k < n.div_ceil(2) {
                k as f64
            } else {
                k as f64 - n as f64
            };
            k_signed / n as f64
        })
        .collect()
}
