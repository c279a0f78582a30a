use crate::config::RefinementMethod;
use crate::error::Result;
use crate::signal::{ImageStack, PeakList};

use super::{Refinement, SubpixelRefiner};

impl<S, P> SubpixelRefiner<'_, S, P>
where
    S: ImageStack + Sync + ?Sized,
    P: PeakList + Sync + ?Sized,
{
    /// Refine with the configured method.
    pub fn refine(&self, method: &RefinementMethod) -> Result<Refinement> {
        match method {
            RefinementMethod::ConventionalXc(params) => {
                self.conventional_xc(params.square_size, params.disc_radius, params.upsample_factor)
            }
            RefinementMethod::CenterOfMass(params) => self.center_of_mass_method(params.square_size),
            RefinementMethod::LocalGaussian(params) => {
                self.local_gaussian_with(params.square_size, &params.fit_options())
            }
        }
    }
}
