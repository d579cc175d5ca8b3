//! Scattering phase functions.
//!
//! Angular distributions describing how much light scatters toward the
//! viewer relative to the incoming direction. Both integrate to 1 over the
//! sphere.

use core::f32::consts::PI;

/// Rayleigh phase function: 3/(16π)·(1 + cos²θ).
pub fn rayleigh_phase(cos_theta: f32) -> f32 {
    let mu = cos_theta.clamp(-1.0, 1.0);
    3.0 / (16.0 * PI) * (1.0 + mu * mu)
}

/// Henyey–Greenstein phase function for asymmetry parameter `g`.
///
/// `g` is clamped just inside (-1, 1) so the denominator can never reach
/// zero; validated parameters never hit the clamp.
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g = g.clamp(-0.9999, 0.9999);
    let mu = cos_theta.clamp(-1.0, 1.0);
    let gg = g * g;
    let denom = (1.0 + gg - 2.0 * g * mu).max(1e-6);
    (1.0 - gg) / (4.0 * PI * denom * denom.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Numerically integrate a phase function over the unit sphere.
    fn sphere_integral(phase: impl Fn(f32) -> f32) -> f32 {
        let n = 4096;
        let mut total = 0.0;
        for i in 0..n {
            // Midpoint rule over cos(theta) in [-1, 1]; the azimuthal
            // integral contributes 2π.
            let mu = -1.0 + (i as f32 + 0.5) * 2.0 / n as f32;
            total += phase(mu) * 2.0 * PI * (2.0 / n as f32);
        }
        total
    }

    #[test]
    fn test_rayleigh_normalizes() {
        let integral = sphere_integral(rayleigh_phase);
        assert!(
            (integral - 1.0).abs() < 1e-3,
            "rayleigh integral = {integral}"
        );
    }

    #[test]
    fn test_henyey_greenstein_normalizes() {
        // Strongly peaked g (≳0.9) needs adaptive quadrature the midpoint
        // rule doesn't provide; the fitted range in practice stays below.
        for g in [-0.5, 0.0, 0.3, 0.76] {
            let integral = sphere_integral(|mu| henyey_greenstein(mu, g));
            assert!(
                (integral - 1.0).abs() < 1e-2,
                "hg integral at g={g} is {integral}"
            );
        }
    }

    #[test]
    fn test_henyey_greenstein_isotropic_at_zero_g() {
        let value = henyey_greenstein(0.3, 0.0);
        assert!(
            (value - 1.0 / (4.0 * PI)).abs() < 1e-6,
            "g=0 must be isotropic"
        );
    }

    #[test]
    fn test_henyey_greenstein_forward_peak() {
        let forward = henyey_greenstein(1.0, 0.758);
        let backward = henyey_greenstein(-1.0, 0.758);
        assert!(
            forward > 100.0 * backward,
            "positive g must scatter strongly forward"
        );
    }

    #[test]
    fn test_phase_finite_at_singular_inputs() {
        // Near-unity g and aligned directions is the singular corner.
        for mu in [-1.0, 0.0, 1.0] {
            for g in [-0.9999, 0.9999, 1.0, -1.0] {
                let value = henyey_greenstein(mu, g);
                assert!(value.is_finite(), "hg({mu}, {g}) = {value}");
                assert!(value >= 0.0);
            }
            assert!(rayleigh_phase(mu).is_finite());
        }
    }
}
