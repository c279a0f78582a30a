//! Conversions between calibrated, center-relative vectors and pixel
//! coordinates.
//!
//! Vectors are `[x, y]` with `x` along columns and `y` along rows (rows grow
//! downward). The frame center is `(width / 2, height / 2)` in pixels.

/// Frame geometry shared by every conversion in a refinement call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelFrame {
    /// Length per pixel.
    pub calibration: f64,
    /// `[cx, cy]` in pixels.
    pub center: [f64; 2],
    pub width: usize,
    pub height: usize,
}

impl PixelFrame {
    pub fn new(width: usize, height: usize, calibration: f64) -> Self {
        Self {
            calibration,
            center: [width as f64 / 2.0, height as f64 / 2.0],
            width,
            height,
        }
    }

    /// `pixel = vector / calibration + center`
    pub fn to_pixel(&self, vector: [f64; 2]) -> [f64; 2] {
        [
            vector[0] / self.calibration + self.center[0],
            vector[1] / self.calibration + self.center[1],
        ]
    }

    /// `vector = (pixel - center) * calibration`
    pub fn to_calibrated(&self, pixel: [f64; 2]) -> [f64; 2] {
        [
            (pixel[0] - self.center[0]) * self.calibration,
            (pixel[1] - self.center[1]) * self.calibration,
        ]
    }

    /// Whether a pixel coordinate lies in `[0, width) x [0, height)`.
    pub fn contains(&self, pixel: [f64; 2]) -> bool {
        pixel[0] >= 0.0
            && pixel[0] < self.width as f64
            && pixel[1] >= 0.0
            && pixel[1] < self.height as f64
    }

    /// Nearest integer pixel `(row, col)`, clamped into the frame.
    pub fn nearest_pixel(&self, pixel: [f64; 2]) -> (usize, usize) {
        let col = pixel[0].round().clamp(0.0, self.width.saturating_sub(1) as f64);
        let row = pixel[1].round().clamp(0.0, self.height.saturating_sub(1) as f64);
        (row as usize, col as usize)
    }
}
