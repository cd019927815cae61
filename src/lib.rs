//! Fresnel diffraction profiles for trans-Neptunian object occultations
//!
//! When a small outer solar-system body occults a star, the light curve is
//! shaped by Fresnel diffraction around the occulter's disk rather than by a
//! sharp geometric shadow. This crate evaluates the diffracted intensity
//! profile of Roques & Moncuquet (2000), a truncated Lommel-function series,
//! tabulates it over a regular (r, rho) grid, and builds a Clough-Tocher
//! interpolant so the profile can be queried cheaply without re-summing the
//! series.
//!
//! Distances `r` (from the shadow center) and radii `rho` (of the occulter)
//! are in Fresnel units throughout.

pub mod error;
pub mod intensity;
pub mod interp;
pub mod lommel;
pub mod lut;

pub use error::Error;
pub use intensity::{fresnel_scale, occultation_intensity, ShadowZone};
pub use interp::CloughTocher2d;
pub use lommel::{lommel_u, lommel_u_with_terms, DEFAULT_TERMS};
pub use lut::{GridSpec, IntensitySample, LookupTable};
