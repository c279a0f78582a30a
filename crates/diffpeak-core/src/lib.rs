pub mod centroid;
pub mod config;
pub mod consts;
pub mod coords;
pub mod disc;
pub mod error;
pub mod gaussian;
pub mod pdf;
pub mod refine;
pub mod register;
pub mod signal;
pub mod window;

pub use error::{DiffpeakError, RefinementWarning, Result};
pub use refine::{PeakDiagnostic, Refinement, SubpixelRefiner};
pub use signal::{DiffractionStack, DiffractionVectors, ImageStack, PeakList, RefinedVectors};
