//! Reduced pair distribution function G(r) from a reduced-intensity profile.
//!
//! `G(r) = 8π Δs Σ_s φ(s) sin(2π s r)`, with `s = 2 sin θ / λ = 1/d` and the
//! sum running over the profile samples inside the `s` cutoffs.

use std::f64::consts::{PI, TAU};

use ndarray::{s, Array1, Array2, Axis};
use tracing::{info, warn};

use crate::config::PdfConfig;
use crate::error::{DiffpeakError, RefinementWarning, Result};

/// Reduced intensity φ(s): one 1D profile per navigation position.
#[derive(Clone, Debug)]
pub struct ReducedIntensity {
    navigation_shape: Vec<usize>,
    /// Shape = (nav_size, n_samples)
    data: Array2<f64>,
    /// Scattering-vector step between samples, 1/Angstrom.
    scale: f64,
}

impl ReducedIntensity {
    /// A single profile.
    pub fn single(profile: Array1<f64>, scale: f64) -> Result<Self> {
        Self::new(Vec::new(), profile.insert_axis(Axis(0)), scale)
    }

    /// Profiles stacked along axis 0 in row-major navigation order.
    pub fn new(navigation_shape: Vec<usize>, data: Array2<f64>, scale: f64) -> Result<Self> {
        let expected: usize = navigation_shape.iter().product();
        if data.nrows() != expected {
            return Err(DiffpeakError::InvalidParameter(format!(
                "navigation shape {:?} needs {} profiles, got {}",
                navigation_shape,
                expected,
                data.nrows()
            )));
        }
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(DiffpeakError::InvalidParameter(format!(
                "s scale must be positive, got {scale}"
            )));
        }
        Ok(Self {
            navigation_shape,
            data,
            scale,
        })
    }

    pub fn navigation_shape(&self) -> &[usize] {
        &self.navigation_shape
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of `s` samples per profile.
    pub fn len(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.data.ncols() == 0
    }
}

/// G(r) sampled at `r_offset + i * r_increment`.
#[derive(Clone, Debug)]
pub struct PdfProfile {
    pub navigation_shape: Vec<usize>,
    /// Shape = (nav_size, n_r)
    pub data: Array2<f64>,
    pub r_offset: f64,
    pub r_increment: f64,
}

impl PdfProfile {
    /// Radial axis values.
    pub fn r_values(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.data.ncols(), |i| {
            self.r_offset + i as f64 * self.r_increment
        })
    }
}

#[derive(Clone, Debug)]
pub struct PdfOutput {
    pub pdf: PdfProfile,
    pub diagnostics: Vec<RefinementWarning>,
}

pub struct PdfGenerator<'a> {
    signal: &'a ReducedIntensity,
}

impl<'a> PdfGenerator<'a> {
    pub fn new(signal: &'a ReducedIntensity) -> Self {
        Self { signal }
    }

    /// Sine-transform every profile of the reduced intensity.
    ///
    /// An `s_max` beyond the end of the profile is clamped to the profile
    /// length and reported in the diagnostics.
    pub fn get_pdf(&self, config: &PdfConfig) -> Result<PdfOutput> {
        let [s_min, s_max] = config.s_cutoff;
        let [r_min, r_max] = config.r_cutoff;
        let r_increment = config.r_increment;

        if !(s_min >= 0.0 && s_min < s_max && s_max.is_finite()) {
            return Err(DiffpeakError::InvalidParameter(format!(
                "s_cutoff must satisfy 0 <= s_min < s_max, got [{s_min}, {s_max}]"
            )));
        }
        if !(r_min < r_max && r_min.is_finite() && r_max.is_finite()) {
            return Err(DiffpeakError::InvalidParameter(format!(
                "r_cutoff must be finite with r_min < r_max, got [{r_min}, {r_max}]"
            )));
        }
        if !(r_increment > 0.0 && r_increment.is_finite()) {
            return Err(DiffpeakError::InvalidParameter(format!(
                "r_increment must be positive, got {r_increment}"
            )));
        }

        let s_scale = self.signal.scale;
        let available = self.signal.len();
        let s_lo = (s_min / s_scale) as usize;
        let mut s_hi = (s_max / s_scale) as usize;
        let mut diagnostics = Vec::new();

        if s_hi > available {
            let warning = RefinementWarning::SCutoffClamped {
                requested: s_hi,
                available,
            };
            warn!("{warning}");
            diagnostics.push(warning);
            s_hi = available;
        }
        if s_lo >= s_hi {
            return Err(DiffpeakError::InvalidParameter(format!(
                "s_cutoff selects no samples (indices {s_lo}..{s_hi} of {available})"
            )));
        }

        let n_r = ((r_max - r_min) / r_increment).ceil() as usize;
        let sine = Array2::from_shape_fn((s_hi - s_lo, n_r), |(i, j)| {
            let s_value = (s_lo + i) as f64 * s_scale;
            let r_value = r_min + j as f64 * r_increment;
            (TAU * s_value * r_value).sin()
        });

        let limited = self.signal.data.slice(s![.., s_lo..s_hi]);
        let data = limited.dot(&sine) * (8.0 * PI * s_scale);

        info!(
            profiles = data.nrows(),
            samples = s_hi - s_lo,
            r_points = n_r,
            "PDF computed"
        );

        Ok(PdfOutput {
            pdf: PdfProfile {
                navigation_shape: self.signal.navigation_shape.clone(),
                data,
                r_offset: r_min,
                r_increment,
            },
            diagnostics,
        })
    }
}
