#![allow(dead_code)]

use diffpeak_core::disc::simulated_disc;
use diffpeak_core::{DiffractionStack, DiffractionVectors};
use ndarray::{s, Array2, Array4};

/// Set every pixel strictly inside the circle of `radius` around
/// `(row, col)` to `value`.
pub fn fill_circle(frame: &mut Array2<f32>, row: f64, col: f64, radius: f64, value: f32) {
    let (h, w) = frame.dim();
    for r in 0..h {
        for c in 0..w {
            let dy = r as f64 - row;
            let dx = c as f64 - col;
            if dy * dy + dx * dx < radius * radius {
                frame[[r, c]] = value;
            }
        }
    }
}

/// Terraced spot: concentric discs of radius 4, 3, 2 with value `1/r`.
pub fn draw_spot(frame: &mut Array2<f32>, row: f64, col: f64) {
    for radius in [4.0, 3.0, 2.0] {
        fill_circle(frame, row, col, radius, 1.0 / radius as f32);
    }
}

/// 2x2 scan of 128x128 frames. Every frame has a spot at (row 30, col 90);
/// the second scan row also has one at (row 60, col 100).
pub fn create_spot() -> DiffractionStack {
    let mut z1 = Array2::<f32>::zeros((128, 128));
    draw_spot(&mut z1, 30.0, 90.0);
    let mut z2 = z1.clone();
    draw_spot(&mut z2, 60.0, 100.0);

    let mut data = Array4::<f32>::zeros((2, 2, 128, 128));
    for j in 0..2 {
        data.slice_mut(s![0, j, .., ..]).assign(&z1);
        data.slice_mut(s![1, j, .., ..]).assign(&z2);
    }
    DiffractionStack::from_grid(data).unwrap()
}

/// Vectors matching [`create_spot`], one list per scan position.
pub fn create_vectors() -> DiffractionVectors {
    let v1 = vec![[90.0 - 64.0, 30.0 - 64.0]];
    let v2 = vec![[90.0 - 64.0, 30.0 - 64.0], [100.0 - 64.0, 60.0 - 64.0]];
    DiffractionVectors::new(vec![2, 2], vec![v1.clone(), v1, v2.clone(), v2]).unwrap()
}

/// 2x2 scan of 128x128 frames holding `exp(-((x-5.1)² + (y-5.3)²) / 4)` in
/// rows 20..30, columns 50..60, i.e. centered at (x 55.1, y 25.3).
pub fn create_spot_gaussian() -> DiffractionStack {
    let mut z1 = Array2::<f32>::zeros((128, 128));
    for y in 0..10 {
        for x in 0..10 {
            let dx = x as f64 - 5.1;
            let dy = y as f64 - 5.3;
            z1[[20 + y, 50 + x]] = (-(dx * dx + dy * dy) / 4.0).exp() as f32;
        }
    }
    let frames = vec![z1.clone(), z1.clone(), z1.clone(), z1];
    DiffractionStack::from_frames(vec![2, 2], &frames).unwrap()
}

/// Simulated 100x100 disc of radius 20, moved up by 4 rows.
pub fn shifted_disc() -> DiffractionStack {
    let disc = simulated_disc(100, 20.0);
    let mut shifted = Array2::<f32>::zeros((100, 100));
    shifted
        .slice_mut(s![..96, ..])
        .assign(&disc.slice(s![4.., ..]));
    DiffractionStack::single(shifted)
}

/// Distance between two `[x, y]` vectors.
pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}
