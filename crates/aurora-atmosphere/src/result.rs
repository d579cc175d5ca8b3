//! The unit of output passed from the scattering stages to compositing.

use glam::Vec3;

/// In-scattered radiance plus path transmittance for one ray.
///
/// Invariants: `radiance` is finite and non-negative; `transmittance` lies
/// in [0, 1] and is non-increasing as the traveled distance grows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatteringResult {
    /// RGB in-scattered radiance accumulated along the ray.
    pub radiance: Vec3,
    /// Fraction of background light surviving the path.
    pub transmittance: f32,
}

impl ScatteringResult {
    /// The inert result: nothing scattered in, background fully visible.
    ///
    /// Returned for degenerate geometry (no atmosphere intersection,
    /// zero-length interval) so rendering degrades gracefully.
    pub fn empty() -> Self {
        Self {
            radiance: Vec3::ZERO,
            transmittance: 1.0,
        }
    }

    /// Composite this result over a background radiance.
    pub fn apply_to(&self, background: Vec3) -> Vec3 {
        background * self.transmittance + self.radiance
    }

    /// Clamp to the output contract: finite, radiance ≥ 0, transmittance
    /// in [0, 1]. NaNs collapse to the inert values.
    pub fn sanitized(&self) -> Self {
        let radiance = Vec3::new(
            sanitize(self.radiance.x),
            sanitize(self.radiance.y),
            sanitize(self.radiance.z),
        );
        let transmittance = if self.transmittance.is_finite() {
            self.transmittance.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            radiance,
            transmittance,
        }
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl Default for ScatteringResult {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_inert_under_compositing() {
        let background = Vec3::new(0.2, 0.4, 0.8);
        assert_eq!(ScatteringResult::empty().apply_to(background), background);
    }

    #[test]
    fn test_apply_attenuates_and_adds() {
        let result = ScatteringResult {
            radiance: Vec3::splat(0.1),
            transmittance: 0.5,
        };
        let out = result.apply_to(Vec3::ONE);
        assert_eq!(out, Vec3::splat(0.6));
    }

    #[test]
    fn test_sanitize_collapses_nan_and_clamps() {
        let bad = ScatteringResult {
            radiance: Vec3::new(f32::NAN, -1.0, f32::INFINITY),
            transmittance: 1.5,
        };
        let clean = bad.sanitized();
        assert_eq!(clean.radiance, Vec3::ZERO);
        assert_eq!(clean.transmittance, 1.0);

        let negative_t = ScatteringResult {
            radiance: Vec3::ONE,
            transmittance: -0.1,
        };
        assert_eq!(negative_t.sanitized().transmittance, 0.0);
    }
}
