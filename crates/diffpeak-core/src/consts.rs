/// Minimum number of (navigation, peak) jobs to refine on the Rayon pool.
pub const PARALLEL_PEAK_THRESHOLD: usize = 16;

/// Minimum pixel count (h*w) of a correlation window to use row-level
/// parallelism in the 2D FFT.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-12;

/// Size of the region (in original pixels) evaluated by the upsampled DFT
/// around the coarse cross-correlation peak.
pub const UPSAMPLED_REGION_PIXELS: f64 = 1.5;

/// Supersampling factor per axis used to antialias the simulated disc edge.
pub const DISC_SUPERSAMPLE: usize = 4;

/// Smallest window side that still admits an elliptical Gaussian fit.
pub const MIN_GAUSSIAN_WINDOW: usize = 5;

/// Default iteration cap for the Levenberg-Marquardt Gaussian fit.
pub const DEFAULT_GAUSSIAN_MAX_ITERATIONS: usize = 200;

/// Default relative step tolerance declaring the Gaussian fit converged.
pub const DEFAULT_GAUSSIAN_TOLERANCE: f64 = 1e-8;

/// Initial Levenberg-Marquardt damping.
pub const LM_INITIAL_LAMBDA: f64 = 1e-3;

/// Damping above which the fit is abandoned as stuck.
pub const LM_MAX_LAMBDA: f64 = 1e12;

/// Default correlation window side (pixels).
pub const DEFAULT_SQUARE_SIZE: usize = 12;

/// Default reference disc radius (pixels).
pub const DEFAULT_DISC_RADIUS: f64 = 4.0;

/// Default upsampling factor for the cross-correlation refinement.
/// 10 gives ~0.1 px resolution; 100 gives ~0.01 px.
pub const DEFAULT_UPSAMPLE_FACTOR: usize = 10;

/// Default radial range of the PDF, in Angstrom.
pub const DEFAULT_PDF_R_CUTOFF: [f64; 2] = [0.0, 20.0];

/// Default radial step of the PDF, in Angstrom.
pub const DEFAULT_PDF_R_INCREMENT: f64 = 0.01;
