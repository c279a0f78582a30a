use ndarray::{s, Array2, Array3, Array4, ArrayView2, Axis};
use num_traits::ToPrimitive;

use crate::error::{DiffpeakError, Result};

/// Read access to a stack of diffraction frames.
///
/// Frames are addressed by a flat, row-major navigation index. A stack with
/// no navigation axes holds exactly one frame.
pub trait ImageStack {
    /// `(height, width)` of every frame.
    fn frame_shape(&self) -> (usize, usize);

    /// Length per pixel, shared by both signal axes.
    fn calibration(&self) -> f64;

    /// Navigation shape; empty for a single frame.
    fn navigation_shape(&self) -> &[usize];

    /// Frame at the given flat navigation index.
    fn frame(&self, nav_index: usize) -> ArrayView2<'_, f32>;

    fn navigation_size(&self) -> usize {
        self.navigation_shape().iter().product()
    }
}

/// Read access to per-navigation-position lists of `[x, y]` coordinates,
/// in calibrated units relative to the frame center.
pub trait PeakList {
    fn navigation_shape(&self) -> &[usize];

    fn peaks(&self, nav_index: usize) -> &[[f64; 2]];

    fn navigation_size(&self) -> usize {
        self.navigation_shape().iter().product()
    }
}

/// In-memory diffraction data with up to two navigation axes.
#[derive(Clone, Debug)]
pub struct DiffractionStack {
    /// Frames flattened over navigation, shape = (nav_size, height, width)
    data: Array3<f32>,
    navigation_shape: Vec<usize>,
    calibration: f64,
}

impl DiffractionStack {
    /// A single frame with unit calibration.
    pub fn single(frame: Array2<f32>) -> Self {
        let data = frame.insert_axis(Axis(0));
        Self {
            data,
            navigation_shape: Vec::new(),
            calibration: 1.0,
        }
    }

    /// A line scan: axis 0 is navigation.
    pub fn from_line(data: Array3<f32>) -> Self {
        let navigation_shape = vec![data.dim().0];
        Self {
            data,
            navigation_shape,
            calibration: 1.0,
        }
    }

    /// A 2D scan: axes 0 and 1 are navigation (row-major).
    pub fn from_grid(data: Array4<f32>) -> Result<Self> {
        let (ny, nx, h, w) = data.dim();
        let data = data
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((ny * nx, h, w))
            .map_err(|e| DiffpeakError::InvalidParameter(format!("grid reshape failed: {e}")))?;
        Ok(Self {
            data,
            navigation_shape: vec![ny, nx],
            calibration: 1.0,
        })
    }

    /// Build a stack from individual frames of any numeric pixel type, e.g.
    /// raw `u16` detector counts. `frames` are in row-major navigation order.
    pub fn from_frames<T>(navigation_shape: Vec<usize>, frames: &[Array2<T>]) -> Result<Self>
    where
        T: ToPrimitive + Copy,
    {
        if navigation_shape.len() > 2 {
            return Err(DiffpeakError::InvalidParameter(format!(
                "at most 2 navigation axes are supported, got {}",
                navigation_shape.len()
            )));
        }
        let expected: usize = navigation_shape.iter().product();
        if frames.len() != expected {
            return Err(DiffpeakError::InvalidParameter(format!(
                "navigation shape {:?} needs {} frames, got {}",
                navigation_shape,
                expected,
                frames.len()
            )));
        }
        let first = frames.first().ok_or(DiffpeakError::EmptyStack)?;
        let (h, w) = first.dim();

        let mut data = Array3::<f32>::zeros((frames.len(), h, w));
        for (i, frame) in frames.iter().enumerate() {
            if frame.dim() != (h, w) {
                return Err(DiffpeakError::FrameShape {
                    expected: (h, w),
                    found: frame.dim(),
                });
            }
            data.slice_mut(s![i, .., ..])
                .zip_mut_with(frame, |dst, src| *dst = src.to_f32().unwrap_or(0.0));
        }

        Ok(Self {
            data,
            navigation_shape,
            calibration: 1.0,
        })
    }

    /// Set the pixel size (length per pixel) of both signal axes.
    pub fn with_calibration(mut self, calibration: f64) -> Self {
        self.calibration = calibration;
        self
    }

    /// Frame at `nav_index`, or an error when out of range.
    pub fn get(&self, nav_index: usize) -> Result<ArrayView2<'_, f32>> {
        let total = self.data.dim().0;
        if nav_index >= total {
            return Err(DiffpeakError::NavigationIndexOutOfRange {
                index: nav_index,
                total,
            });
        }
        Ok(self.data.slice(s![nav_index, .., ..]))
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }
}

impl ImageStack for DiffractionStack {
    fn frame_shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    fn calibration(&self) -> f64 {
        self.calibration
    }

    fn navigation_shape(&self) -> &[usize] {
        &self.navigation_shape
    }

    fn frame(&self, nav_index: usize) -> ArrayView2<'_, f32> {
        self.data.slice(s![nav_index, .., ..])
    }
}

/// Per-position lists of diffraction vectors `[x, y]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffractionVectors {
    navigation_shape: Vec<usize>,
    peaks: Vec<Vec<[f64; 2]>>,
}

/// Refined vectors share the layout and coordinate convention of the input.
pub type RefinedVectors = DiffractionVectors;

impl DiffractionVectors {
    /// One list with no navigation axes; it applies to every frame of a stack.
    pub fn single(peaks: Vec<[f64; 2]>) -> Self {
        Self {
            navigation_shape: Vec::new(),
            peaks: vec![peaks],
        }
    }

    /// `peaks` holds one list per navigation position in row-major order.
    pub fn new(navigation_shape: Vec<usize>, peaks: Vec<Vec<[f64; 2]>>) -> Result<Self> {
        let expected: usize = navigation_shape.iter().product();
        if peaks.len() != expected {
            return Err(DiffpeakError::InvalidParameter(format!(
                "navigation shape {:?} needs {} peak lists, got {}",
                navigation_shape,
                expected,
                peaks.len()
            )));
        }
        Ok(Self {
            navigation_shape,
            peaks,
        })
    }

    /// Iterate over the per-position lists in navigation order.
    pub fn iter(&self) -> impl Iterator<Item = &[[f64; 2]]> {
        self.peaks.iter().map(Vec::as_slice)
    }

    /// Total number of vectors across all positions.
    pub fn total_peaks(&self) -> usize {
        self.peaks.iter().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> (Vec<usize>, Vec<Vec<[f64; 2]>>) {
        (self.navigation_shape, self.peaks)
    }
}

impl PeakList for DiffractionVectors {
    fn navigation_shape(&self) -> &[usize] {
        &self.navigation_shape
    }

    fn peaks(&self, nav_index: usize) -> &[[f64; 2]] {
        &self.peaks[nav_index]
    }
}
