//! Sub-pixel refinement of diffraction vectors.
//!
//! A [`SubpixelRefiner`] borrows a diffraction stack and approximate peak
//! positions, validates them once, and then answers any number of refinement
//! queries. Each query returns new vectors in the input convention
//! (calibrated, relative to the frame center) together with the warnings of
//! peaks that fell back to their unrefined position.

mod dispatch;
mod methods;

use ndarray::ArrayView2;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::consts::{MIN_GAUSSIAN_WINDOW, PARALLEL_PEAK_THRESHOLD};
use crate::coords::PixelFrame;
use crate::disc::simulated_disc;
use crate::error::{DiffpeakError, RefinementWarning, Result};
use crate::gaussian::FitOptions;
use crate::signal::{ImageStack, PeakList, RefinedVectors};

/// A warning raised while refining one peak.
#[derive(Clone, Debug, PartialEq)]
pub struct PeakDiagnostic {
    pub nav_index: usize,
    pub peak_index: usize,
    pub warning: RefinementWarning,
}

/// Output of one refinement call.
#[derive(Clone, Debug)]
pub struct Refinement {
    pub vectors: RefinedVectors,
    pub diagnostics: Vec<PeakDiagnostic>,
}

impl Refinement {
    pub fn into_vectors(self) -> RefinedVectors {
        self.vectors
    }

    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Refined pixel position of one peak plus an optional fallback reason.
#[derive(Clone, Debug)]
struct PeakOutcome {
    pixel: [f64; 2],
    warning: Option<RefinementWarning>,
}

impl PeakOutcome {
    fn refined(pixel: [f64; 2]) -> Self {
        Self {
            pixel,
            warning: None,
        }
    }

    fn unrefined(pixel: [f64; 2], warning: RefinementWarning) -> Self {
        Self {
            pixel,
            warning: Some(warning),
        }
    }
}

/// One peak to refine, with its candidate already in pixel coordinates.
#[derive(Clone, Copy, Debug)]
struct PeakJob {
    nav_index: usize,
    peak_index: usize,
    pixel: [f64; 2],
}

pub struct SubpixelRefiner<'a, S: ?Sized, P: ?Sized> {
    stack: &'a S,
    peaks: &'a P,
    geometry: PixelFrame,
    /// The peak list has no navigation axes and applies to every frame.
    broadcast: bool,
}

impl<'a, S, P> SubpixelRefiner<'a, S, P>
where
    S: ImageStack + Sync + ?Sized,
    P: PeakList + Sync + ?Sized,
{
    /// Validate navigation shapes and peak bounds.
    ///
    /// A peak list without navigation axes is applied to every frame;
    /// otherwise its navigation shape must equal the stack's.
    pub fn new(stack: &'a S, peaks: &'a P) -> Result<Self> {
        let calibration = stack.calibration();
        if !calibration.is_finite() || calibration == 0.0 {
            return Err(DiffpeakError::InvalidParameter(format!(
                "calibration must be finite and non-zero, got {calibration}"
            )));
        }

        let stack_nav = stack.navigation_shape();
        let peak_nav = peaks.navigation_shape();
        if stack_nav.len() > 2 || peak_nav.len() > 2 {
            return Err(DiffpeakError::Shape {
                stack: stack_nav.to_vec(),
                peaks: peak_nav.to_vec(),
            });
        }
        let broadcast = peak_nav.is_empty();
        if !broadcast && peak_nav != stack_nav {
            return Err(DiffpeakError::Shape {
                stack: stack_nav.to_vec(),
                peaks: peak_nav.to_vec(),
            });
        }

        let (height, width) = stack.frame_shape();
        let refiner = Self {
            stack,
            peaks,
            geometry: PixelFrame::new(width, height, calibration),
            broadcast,
        };

        for nav_index in 0..refiner.peak_positions() {
            for (peak_index, &vector) in peaks.peaks(nav_index).iter().enumerate() {
                let [x, y] = refiner.geometry.to_pixel(vector);
                if !refiner.geometry.contains([x, y]) {
                    return Err(DiffpeakError::Bounds {
                        nav_index,
                        peak_index,
                        x,
                        y,
                        width,
                        height,
                    });
                }
            }
        }

        debug!(
            navigation = ?stack_nav,
            broadcast,
            calibration,
            "Subpixel refiner ready"
        );
        Ok(refiner)
    }

    /// Length per pixel of the image stack.
    pub fn calibration(&self) -> f64 {
        self.geometry.calibration
    }

    /// Frame center `[cx, cy]` in pixels.
    pub fn center(&self) -> [f64; 2] {
        self.geometry.center
    }

    /// Refine each peak by cross-correlating a `square_size` window around
    /// it with a synthetic disc of `disc_radius` pixels, to a resolution of
    /// `1 / upsample_factor` pixel.
    ///
    /// Windows reaching past the frame edge are zero-padded.
    pub fn conventional_xc(
        &self,
        square_size: usize,
        disc_radius: f64,
        upsample_factor: usize,
    ) -> Result<Refinement> {
        require_window(square_size)?;
        if !(disc_radius > 0.0 && disc_radius.is_finite()) {
            return Err(DiffpeakError::InvalidParameter(format!(
                "disc_radius must be positive, got {disc_radius}"
            )));
        }
        if upsample_factor == 0 {
            return Err(DiffpeakError::InvalidParameter(
                "upsample_factor must be >= 1".into(),
            ));
        }

        let template = simulated_disc(square_size, disc_radius);
        self.run("conventional_xc", |frame, pixel| {
            methods::cross_correlate(frame, &self.geometry, pixel, &template, upsample_factor)
                .map(PeakOutcome::refined)
        })
    }

    /// Refine each peak to the intensity-weighted centroid of the
    /// `square_size` window around it (clipped at the frame edge).
    pub fn center_of_mass_method(&self, square_size: usize) -> Result<Refinement> {
        require_window(square_size)?;
        self.run("center_of_mass", |frame, pixel| {
            Ok(PeakOutcome::refined(methods::center_of_mass(
                frame,
                &self.geometry,
                pixel,
                square_size,
            )))
        })
    }

    /// Refine each peak to the center of an elliptical Gaussian fitted to
    /// the `square_size` window around it.
    ///
    /// Peaks whose window is too small or whose fit fails keep their input
    /// position; each such peak is reported in the returned diagnostics.
    pub fn local_gaussian_method(&self, square_size: usize) -> Result<Refinement> {
        self.local_gaussian_with(square_size, &FitOptions::default())
    }

    /// [`Self::local_gaussian_method`] with explicit solver options.
    pub fn local_gaussian_with(
        &self,
        square_size: usize,
        options: &FitOptions,
    ) -> Result<Refinement> {
        if square_size < MIN_GAUSSIAN_WINDOW {
            warn!(
                square_size,
                minimum = MIN_GAUSSIAN_WINDOW,
                "Window too small for a Gaussian fit, peaks left unrefined"
            );
        }
        self.run("local_gaussian", |frame, pixel| {
            Ok(methods::local_gaussian(
                frame,
                &self.geometry,
                pixel,
                square_size,
                options,
            ))
        })
    }

    /// Number of distinct peak lists held by the peak provider.
    fn peak_positions(&self) -> usize {
        if self.broadcast {
            1
        } else {
            self.stack.navigation_size()
        }
    }

    fn peaks_at(&self, nav_index: usize) -> &[[f64; 2]] {
        if self.broadcast {
            self.peaks.peaks(0)
        } else {
            self.peaks.peaks(nav_index)
        }
    }

    /// Apply `refine_peak` to every peak of every frame and assemble the
    /// result in input order.
    fn run<F>(&self, method: &str, refine_peak: F) -> Result<Refinement>
    where
        F: Fn(&ArrayView2<f32>, [f64; 2]) -> Result<PeakOutcome> + Sync,
    {
        let nav_size = self.stack.navigation_size();
        let jobs: Vec<PeakJob> = (0..nav_size)
            .flat_map(|nav_index| {
                self.peaks_at(nav_index)
                    .iter()
                    .enumerate()
                    .map(move |(peak_index, &vector)| PeakJob {
                        nav_index,
                        peak_index,
                        pixel: self.geometry.to_pixel(vector),
                    })
            })
            .collect();

        info!(
            method,
            frames = nav_size,
            peaks = jobs.len(),
            "Refining diffraction vectors"
        );

        let evaluate = |job: &PeakJob| {
            let frame = self.stack.frame(job.nav_index);
            refine_peak(&frame, job.pixel)
        };
        let results: Vec<Result<PeakOutcome>> = if jobs.len() >= PARALLEL_PEAK_THRESHOLD {
            jobs.par_iter().map(evaluate).collect()
        } else {
            jobs.iter().map(evaluate).collect()
        };
        let outcomes: Vec<PeakOutcome> = results.into_iter().collect::<Result<_>>()?;

        let mut lists: Vec<Vec<[f64; 2]>> = (0..nav_size)
            .map(|nav_index| Vec::with_capacity(self.peaks_at(nav_index).len()))
            .collect();
        let mut diagnostics = Vec::new();

        for (job, outcome) in jobs.iter().zip(outcomes) {
            lists[job.nav_index].push(self.geometry.to_calibrated(outcome.pixel));
            if let Some(warning) = outcome.warning {
                warn!(
                    method,
                    nav_index = job.nav_index,
                    peak_index = job.peak_index,
                    "{warning}"
                );
                diagnostics.push(PeakDiagnostic {
                    nav_index: job.nav_index,
                    peak_index: job.peak_index,
                    warning,
                });
            }
        }

        info!(
            method,
            degraded = diagnostics.len(),
            "Refinement complete"
        );

        Ok(Refinement {
            vectors: RefinedVectors::new(self.stack.navigation_shape().to_vec(), lists)?,
            diagnostics,
        })
    }
}

fn require_window(square_size: usize) -> Result<()> {
    if square_size == 0 {
        return Err(DiffpeakError::InvalidParameter(
            "square_size must be > 0".into(),
        ));
    }
    Ok(())
}
