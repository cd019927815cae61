//! Occultation intensity profile
//!
//! Diffracted starlight intensity at distance `r` from the shadow center of
//! a circular occulter of radius `rho`, both in Fresnel units, per Eqs. 9
//! and 10 in Roques & Moncuquet (2000). Intensity 1 is the unocculted star.

use std::f64::consts::FRAC_PI_2;

use crate::lommel::{lommel_u, LommelError};

type Result<T> = std::result::Result<T, LommelError>;

/// Side of the geometric shadow boundary an observer sits on.
///
/// The boundary `r == rho` is the edge of the occulter's projected disk;
/// each variant selects the intensity formula valid on its side, and the
/// two formulas agree on the boundary itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowZone {
    /// `r >= rho`: observer outside the projected disk (Eq. 9)
    Outside,
    /// `r < rho`: observer inside the projected disk (Eq. 10)
    Inside,
}
impl ShadowZone {
    /// Classifies an observer position relative to the geometric shadow.
    pub fn of(r: f64, rho: f64) -> Self {
        if r >= rho {
            ShadowZone::Outside
        } else {
            ShadowZone::Inside
        }
    }
    /// Evaluates this zone's intensity formula at `(r, rho)`.
    ///
    /// Both formulas order the Lommel arguments so that `x <= y` holds on
    /// their own side of the boundary; evaluating a zone on the wrong side
    /// surfaces the evaluator's domain error.
    pub fn intensity(&self, r: f64, rho: f64) -> Result<f64> {
        match self {
            ShadowZone::Outside => {
                let u1 = lommel_u(1, rho, r)?;
                let u2 = lommel_u(2, rho, r)?;
                let phase = FRAC_PI_2 * (r * r + rho * rho);
                // Sum-of-squares form of 1 + u1^2 + u2^2 - 2 u1 sin + 2 u2 cos;
                // keeps the intensity non-negative in floating point.
                let a = u1 - phase.sin();
                let b = u2 + phase.cos();
                Ok(a * a + b * b)
            }
            ShadowZone::Inside => {
                let u0 = lommel_u(0, r, rho)?;
                let u1 = lommel_u(1, r, rho)?;
                Ok(u0 * u0 + u1 * u1)
            }
        }
    }
}

/// Intensity of the diffraction profile at distance `r` from the shadow
/// center for an occulter of radius `rho > 0`, both in Fresnel units.
pub fn occultation_intensity(r: f64, rho: f64) -> Result<f64> {
    ShadowZone::of(r, rho).intensity(r, rho)
}

/// Fresnel scale sqrt(lambda D / 2) [m] for wavelength `lambda` [m] and
/// occulter distance `d` [m]; divides metric lengths into Fresnel units.
pub fn fresnel_scale(lambda: f64, d: f64) -> f64 {
    (lambda * d / 2f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_classification() {
        assert_eq!(ShadowZone::of(1f64, 1f64), ShadowZone::Outside);
        assert_eq!(ShadowZone::of(0.99, 1f64), ShadowZone::Inside);
        assert_eq!(ShadowZone::of(0f64, 20f64), ShadowZone::Inside);
    }

    #[test]
    fn continuous_across_shadow_edge() {
        // Both formulas evaluated exactly on the boundary.
        for rho in [0.5, 1.2, 2f64] {
            let inside = ShadowZone::Inside.intensity(rho, rho).unwrap();
            let outside = ShadowZone::Outside.intensity(rho, rho).unwrap();
            assert!(
                (inside - outside).abs() < 1e-6,
                "rho = {}: {} vs {}",
                rho,
                inside,
                outside
            );
        }
        // And straddling it.
        let eps = 1e-4;
        for rho in [0.5, 1.2, 2f64] {
            let inside = occultation_intensity(rho - eps, rho).unwrap();
            let outside = occultation_intensity(rho + eps, rho).unwrap();
            assert!((inside - outside).abs() < 1e-3);
        }
    }

    #[test]
    fn non_negative() {
        for i in 0..20 {
            for j in 1..20 {
                let r = i as f64 * 0.25;
                let rho = j as f64 * 0.25;
                let intensity = occultation_intensity(r, rho).unwrap();
                assert!(intensity >= 0f64, "I({}, {}) = {}", r, rho, intensity);
            }
        }
    }

    #[test]
    fn far_field_is_unocculted() {
        // Large distance, negligibly small occulter.
        let intensity = occultation_intensity(20f64, 0.01).unwrap();
        assert!((intensity - 1f64).abs() < 1e-2, "I = {}", intensity);
    }

    #[test]
    fn on_axis_bright_spot() {
        // At the exact shadow center only the zeroth-order k=0 series term
        // survives: the Poisson/Arago spot at full stellar intensity.
        let intensity = occultation_intensity(0f64, 20f64).unwrap();
        assert!((intensity - 1f64).abs() < 1e-12);
    }

    #[test]
    fn fresnel_scale_visible_light() {
        // 550 nm star observed through an occulter 43 au away.
        let au = 1.495978707e11;
        let fs = fresnel_scale(550e-9, 43f64 * au);
        assert!((fs - 1.33e3).abs() / 1.33e3 < 1e-2, "fs = {}", fs);
    }

    #[test]
    fn deep_shadow_off_axis() {
        // Large occulter, observer well inside the shadow but off the axis
        // (the axis itself carries the bright spot).
        for (r, rho) in [(0.5, 8f64), (1f64, 6f64), (1.5, 5f64)] {
            let intensity = occultation_intensity(r, rho).unwrap();
            assert!(intensity < 0.05, "I({}, {}) = {}", r, rho, intensity);
        }
    }
}
