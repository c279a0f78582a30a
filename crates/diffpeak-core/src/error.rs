use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffpeakError {
    #[error("Navigation shape mismatch: image stack {stack:?} vs peak list {peaks:?}")]
    Shape {
        stack: Vec<usize>,
        peaks: Vec<usize>,
    },

    #[error("Inconsistent frame shape: expected {expected:?}, got {found:?}")]
    FrameShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error(
        "Peak {peak_index} at navigation index {nav_index} maps to pixel ({x:.2}, {y:.2}), \
         outside {width}x{height} frame"
    )]
    Bounds {
        nav_index: usize,
        peak_index: usize,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    },

    #[error("Navigation index {index} out of range (total: {total})")]
    NavigationIndexOutOfRange { index: usize, total: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty image stack")]
    EmptyStack,
}

pub type Result<T> = std::result::Result<T, DiffpeakError>;

/// Non-fatal, per-peak (or per-call) conditions. The affected value falls
/// back to its unrefined input and processing continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefinementWarning {
    #[error("Gaussian fit failed: {reason}")]
    FitFailure { reason: String },

    #[error("Window of {size} px is too small to fit (minimum {minimum} px)")]
    WindowTooSmall { size: usize, minimum: usize },

    #[error("s_max index {requested} exceeds profile length {available}; using full profile")]
    SCutoffClamped { requested: usize, available: usize },
}
