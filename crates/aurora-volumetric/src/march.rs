//! Ray marching through the participating medium.

use glam::Vec3;

use aurora_atmosphere::{ScatteringResult, henyey_greenstein};
use aurora_math::Ray;

use crate::light::LightSource;
use crate::medium::MediumSampler;

/// Exponent floor mirroring the atmosphere integrator's underflow guard.
const MIN_EXPONENT: f32 = -80.0;

/// Quality/performance trade-offs for the volumetric pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumetricSettings {
    /// Samples along the view ray. 32–64 is the practical range.
    pub steps: u32,
    /// Samples of the secondary march toward each light for the soft
    /// self-shadow term. 0 disables self-shadowing.
    pub shadow_steps: u32,
    /// Crude isotropic ambient fill added to the in-scattered light, the
    /// stand-in for multiple scattering.
    pub ambient: Vec3,
}

impl Default for VolumetricSettings {
    fn default() -> Self {
        Self {
            steps: 48,
            shadow_steps: 4,
            ambient: Vec3::new(0.004, 0.005, 0.007),
        }
    }
}

/// March the medium along a camera ray.
///
/// The march covers the intersection of the medium bounds with
/// `[0, max_depth]`. Transmittance decays as
/// `exp(-density · extinction · dt)` per step and the in-scattered sum
/// weights each light by its Henyey–Greenstein phase, attenuation, and
/// self-shadow term. Degenerate intervals return
/// [`ScatteringResult::empty`].
pub fn march_volume(
    camera: Vec3,
    view_dir: Vec3,
    max_depth: f32,
    sampler: &MediumSampler,
    lights: &[LightSource],
    settings: &VolumetricSettings,
) -> ScatteringResult {
    let ray = Ray::new(camera, view_dir);
    let Some((t_enter, t_exit)) = sampler.clip_ray(&ray) else {
        return ScatteringResult::empty();
    };
    let t_far = t_exit.min(max_depth);
    if t_far <= t_enter {
        return ScatteringResult::empty();
    }

    let medium = sampler.medium();
    let steps = settings.steps.max(1);
    let dt = (t_far - t_enter) / steps as f32;

    let mut transmittance = 1.0f32;
    let mut radiance = Vec3::ZERO;

    for i in 0..steps {
        let t = t_enter + (i as f32 + 0.5) * dt;
        let pos = ray.point_at(t);
        let density = sampler.density(pos);
        if density <= 0.0 {
            continue;
        }

        let sigma_t = density * medium.extinction;
        let sigma_s = sigma_t * medium.albedo;

        let mut in_scattered = settings.ambient;
        for light in lights {
            let (dir_to_light, atten) = light.illumination_at(pos);
            if atten <= 0.0 {
                continue;
            }
            let phase = henyey_greenstein(ray.direction().dot(dir_to_light), medium.asymmetry);
            let shadow = self_shadow(pos, dir_to_light, sampler, settings.shadow_steps);
            in_scattered += light.color * (light.intensity * atten * phase * shadow);
        }

        radiance += in_scattered * (transmittance * sigma_s * dt);
        transmittance *= (-(sigma_t * dt).min(-MIN_EXPONENT)).exp();
    }

    ScatteringResult {
        radiance,
        transmittance,
    }
    .sanitized()
}

/// Soft self-shadow: transmittance of a short march from a sample toward
/// a light, through the medium itself.
fn self_shadow(from: Vec3, dir_to_light: Vec3, sampler: &MediumSampler, steps: u32) -> f32 {
    if steps == 0 {
        return 1.0;
    }
    let ray = Ray::new(from, dir_to_light);
    let Some((_, t_exit)) = sampler.clip_ray(&ray) else {
        return 1.0;
    };
    if t_exit <= 0.0 {
        return 1.0;
    }

    let ds = t_exit / steps as f32;
    let extinction = sampler.medium().extinction;
    let mut optical_depth = 0.0;
    for i in 0..steps {
        let pos = ray.point_at((i as f32 + 0.5) * ds);
        optical_depth += sampler.density(pos) * extinction * ds;
    }
    (-optical_depth.min(-MIN_EXPONENT)).exp()
}
