use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DISC_RADIUS, DEFAULT_GAUSSIAN_MAX_ITERATIONS, DEFAULT_GAUSSIAN_TOLERANCE,
    DEFAULT_PDF_R_CUTOFF, DEFAULT_PDF_R_INCREMENT, DEFAULT_SQUARE_SIZE, DEFAULT_UPSAMPLE_FACTOR,
};
use crate::gaussian::FitOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XcConfig {
    /// Side of the correlation window, pixels.
    pub square_size: usize,
    /// Radius of the reference disc, pixels.
    pub disc_radius: f64,
    /// Sub-pixel resolution is `1 / upsample_factor`.
    pub upsample_factor: usize,
}

impl Default for XcConfig {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            disc_radius: DEFAULT_DISC_RADIUS,
            upsample_factor: DEFAULT_UPSAMPLE_FACTOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterOfMassConfig {
    pub square_size: usize,
}

impl Default for CenterOfMassConfig {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianFitConfig {
    pub square_size: usize,
    /// Fit a rotated ellipse instead of an axis-aligned one.
    #[serde(default)]
    pub fit_rotation: bool,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_max_iterations() -> usize {
    DEFAULT_GAUSSIAN_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    DEFAULT_GAUSSIAN_TOLERANCE
}

impl GaussianFitConfig {
    pub fn with_square_size(square_size: usize) -> Self {
        Self {
            square_size,
            ..Default::default()
        }
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            fit_rotation: self.fit_rotation,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }
}

impl Default for GaussianFitConfig {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            fit_rotation: false,
            max_iterations: DEFAULT_GAUSSIAN_MAX_ITERATIONS,
            tolerance: DEFAULT_GAUSSIAN_TOLERANCE,
        }
    }
}

/// Sub-pixel refinement method with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RefinementMethod {
    ConventionalXc(XcConfig),
    CenterOfMass(CenterOfMassConfig),
    LocalGaussian(GaussianFitConfig),
}

impl Default for RefinementMethod {
    fn default() -> Self {
        RefinementMethod::ConventionalXc(XcConfig::default())
    }
}

impl fmt::Display for RefinementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefinementMethod::ConventionalXc(c) => write!(
                f,
                "Cross-Correlation ({}px, r={}, {}x)",
                c.square_size, c.disc_radius, c.upsample_factor
            ),
            RefinementMethod::CenterOfMass(c) => write!(f, "Center of Mass ({}px)", c.square_size),
            RefinementMethod::LocalGaussian(c) => {
                write!(f, "Local Gaussian ({}px", c.square_size)?;
                if c.fit_rotation {
                    write!(f, ", rotated")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Parameters of the reduced pair distribution function transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PdfConfig {
    /// `[s_min, s_max]` integration limits, in 1/Angstrom (s = 2 sin θ / λ).
    pub s_cutoff: [f64; 2],
    /// `[r_min, r_max]` extent of the real-space axis, in Angstrom.
    #[serde(default = "default_r_cutoff")]
    pub r_cutoff: [f64; 2],
    /// Real-space step, in Angstrom.
    #[serde(default = "default_r_increment")]
    pub r_increment: f64,
}

fn default_r_cutoff() -> [f64; 2] {
    DEFAULT_PDF_R_CUTOFF
}

fn default_r_increment() -> f64 {
    DEFAULT_PDF_R_INCREMENT
}

impl PdfConfig {
    pub fn new(s_cutoff: [f64; 2]) -> Self {
        Self {
            s_cutoff,
            r_cutoff: DEFAULT_PDF_R_CUTOFF,
            r_increment: DEFAULT_PDF_R_INCREMENT,
        }
    }
}
