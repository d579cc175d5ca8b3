//! Numerical Rayleigh+Mie single-scattering along a view ray.
//!
//! Double integration: a fixed-step march along the view ray, each sample
//! casting a shorter fixed-step march toward the sun to accumulate the
//! optical depth of the sun path. Used for distant-sky shading (ray length
//! to the shell exit) and aerial perspective (ray length to scene depth).

use glam::Vec3;

use aurora_ephemeris::SolarState;
use aurora_math::{Ray, Sphere, luminance};

use crate::parameters::AtmosphereParameters;
use crate::phase::{henyey_greenstein, rayleigh_phase};
use crate::result::ScatteringResult;

/// Exponent floor so `exp` can never underflow to a hard zero. Keeps the
/// sun-path transmittance strictly positive even through the planet.
const MIN_EXPONENT: f32 = -80.0;

/// Step counts for the nested integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatteringSettings {
    /// Samples along the view ray. Fixed step size: interval / count.
    pub view_steps: u32,
    /// Samples along each secondary ray toward the sun.
    pub sun_steps: u32,
}

impl Default for ScatteringSettings {
    fn default() -> Self {
        Self {
            view_steps: 16,
            sun_steps: 8,
        }
    }
}

/// Integrate in-scattered sun light along a view ray.
///
/// `camera` is in world space (origin at sea level, +Y up); `max_length`
/// bounds the march for aerial perspective (`f32::INFINITY` for sky
/// pixels). Degenerate geometry (no shell intersection, zero-length
/// interval) returns [`ScatteringResult::empty`] exactly.
pub fn integrate_scattering(
    camera: Vec3,
    view_dir: Vec3,
    max_length: f32,
    params: &AtmosphereParameters,
    solar: &SolarState,
    settings: &ScatteringSettings,
) -> ScatteringResult {
    let origin = params.planet_position(camera);
    let shell = Sphere::new(Vec3::ZERO, params.atmosphere_radius);
    let ground = Sphere::new(Vec3::ZERO, params.planet_radius);

    let ray = Ray::new(origin, view_dir);
    let Some((t_enter, t_exit)) = ray.intersect_sphere(&shell) else {
        return ScatteringResult::empty();
    };

    // The ground occludes the far part of the interval; scene depth caps
    // it further for aerial perspective.
    let mut t_far = t_exit.min(max_length);
    if let Some((t_ground, _)) = ray.intersect_sphere(&ground) {
        if t_ground > 0.0 {
            t_far = t_far.min(t_ground);
        }
    }
    if t_far <= t_enter {
        return ScatteringResult::empty();
    }

    let steps = settings.view_steps.max(1);
    let step_size = (t_far - t_enter) / steps as f32;
    let sun_dir = solar.direction;
    let cos_theta = view_dir.normalize().dot(sun_dir);
    let phase_r = rayleigh_phase(cos_theta);
    let phase_m = henyey_greenstein(cos_theta, params.mie_asymmetry);

    let mut view_od_r = 0.0f32;
    let mut view_od_m = 0.0f32;
    let mut sum_r = Vec3::ZERO;
    let mut sum_m = Vec3::ZERO;

    for i in 0..steps {
        let t = t_enter + (i as f32 + 0.5) * step_size;
        let pos = ray.point_at(t);
        let altitude = params.altitude(pos);

        let density_r = falloff(altitude, params.rayleigh_scale_height);
        let density_m = falloff(altitude, params.mie_scale_height);
        let od_step_r = density_r * step_size;
        let od_step_m = density_m * step_size;
        view_od_r += od_step_r;
        view_od_m += od_step_m;

        let (sun_od_r, sun_od_m) = sun_optical_depth(pos, sun_dir, params, settings.sun_steps);

        // Combined transmittance: view path to the sample plus sample to
        // the sun, per channel.
        let od = params.rayleigh_scattering * (view_od_r + sun_od_r)
            + Vec3::splat(params.mie_scattering * (view_od_m + sun_od_m));
        let attenuation = clamped_exp(-od);

        sum_r += attenuation * od_step_r;
        sum_m += attenuation * od_step_m;
    }

    let radiance = solar.irradiance
        * (params.rayleigh_scattering * phase_r * sum_r
            + Vec3::splat(params.mie_scattering) * phase_m * sum_m);

    let view_transmittance = clamped_exp(
        -(params.rayleigh_scattering * view_od_r + Vec3::splat(params.mie_scattering * view_od_m)),
    );

    ScatteringResult {
        radiance: radiance.max(Vec3::ZERO),
        transmittance: luminance(view_transmittance).clamp(0.0, 1.0),
    }
    .sanitized()
}

/// Optical depth (Rayleigh, Mie) from a planet-centric point toward the
/// sun, out to the atmosphere shell.
fn sun_optical_depth(
    from: Vec3,
    sun_dir: Vec3,
    params: &AtmosphereParameters,
    steps: u32,
) -> (f32, f32) {
    let shell = Sphere::new(Vec3::ZERO, params.atmosphere_radius);
    let ray = Ray::new(from, sun_dir);
    let Some((_, t_exit)) = ray.intersect_sphere(&shell) else {
        return (0.0, 0.0);
    };

    let steps = steps.max(1);
    let step_size = t_exit / steps as f32;
    let mut od_r = 0.0;
    let mut od_m = 0.0;
    for i in 0..steps {
        let pos = ray.point_at((i as f32 + 0.5) * step_size);
        let altitude = params.altitude(pos);
        od_r += falloff(altitude, params.rayleigh_scale_height) * step_size;
        od_m += falloff(altitude, params.mie_scale_height) * step_size;
    }
    (od_r, od_m)
}

/// Scale-height density falloff. Altitude below sea level saturates
/// instead of exploding so sun rays through the planet stay finite.
fn falloff(altitude: f32, scale_height: f32) -> f32 {
    (-altitude / scale_height).min(-MIN_EXPONENT).exp()
}

/// Component-wise `exp` with the exponent clamped away from underflow.
fn clamped_exp(exponent: Vec3) -> Vec3 {
    Vec3::new(
        exponent.x.max(MIN_EXPONENT).exp(),
        exponent.y.max(MIN_EXPONENT).exp(),
        exponent.z.max(MIN_EXPONENT).exp(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_ephemeris::{Observer, SolarState};

    fn noon_sun() -> SolarState {
        let obs = Observer::new(20.0, 0.0, 2023, 6, 21, 12, 0, 0, 0.0);
        SolarState::compute(&obs, AtmosphereParameters::earth().sun_irradiance)
    }

    fn night_sun() -> SolarState {
        let obs = Observer::new(40.0, 0.0, 2023, 6, 21, 0, 30, 0, 0.0);
        SolarState::compute(&obs, AtmosphereParameters::earth().sun_irradiance)
    }

    #[test]
    fn test_miss_returns_exact_empty() {
        let params = AtmosphereParameters::earth();
        // Far outside the shell, looking away from the planet.
        let camera = Vec3::new(0.0, 2.0 * params.atmosphere_radius, 0.0);
        let result = integrate_scattering(
            camera,
            Vec3::Y,
            f32::INFINITY,
            &params,
            &noon_sun(),
            &ScatteringSettings::default(),
        );
        assert_eq!(result.radiance, Vec3::ZERO);
        assert_eq!(result.transmittance, 1.0);
    }

    #[test]
    fn test_zero_length_interval_returns_exact_empty() {
        let params = AtmosphereParameters::earth();
        let result = integrate_scattering(
            Vec3::ZERO,
            Vec3::Y,
            0.0,
            &params,
            &noon_sun(),
            &ScatteringSettings::default(),
        );
        assert_eq!(result.radiance, Vec3::ZERO);
        assert_eq!(result.transmittance, 1.0);
    }

    #[test]
    fn test_zenith_sky_is_blue_dominant() {
        let params = AtmosphereParameters::earth();
        let result = integrate_scattering(
            Vec3::ZERO,
            Vec3::Y,
            f32::INFINITY,
            &params,
            &noon_sun(),
            &ScatteringSettings::default(),
        );
        assert!(result.radiance.z > result.radiance.x, "sky must skew blue");
        assert!(result.radiance.min_element() >= 0.0);
        assert!(result.radiance.is_finite());
    }

    #[test]
    fn test_transmittance_non_increasing_with_distance() {
        let params = AtmosphereParameters::earth();
        let solar = noon_sun();
        let settings = ScatteringSettings::default();
        let view = Vec3::new(1.0, 0.05, 0.0).normalize();

        let mut prev = 1.0f32;
        for distance in [100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0] {
            let result =
                integrate_scattering(Vec3::ZERO, view, distance, &params, &solar, &settings);
            assert!(
                result.transmittance <= prev + 1e-6,
                "transmittance rose from {prev} to {} at {distance} m",
                result.transmittance
            );
            assert!((0.0..=1.0).contains(&result.transmittance));
            prev = result.transmittance;
        }
    }

    #[test]
    fn test_aerial_perspective_shorter_than_sky() {
        let params = AtmosphereParameters::earth();
        let solar = noon_sun();
        let settings = ScatteringSettings::default();
        let view = Vec3::new(1.0, 0.1, 0.0).normalize();

        let near = integrate_scattering(Vec3::ZERO, view, 5_000.0, &params, &solar, &settings);
        let sky = integrate_scattering(Vec3::ZERO, view, f32::INFINITY, &params, &solar, &settings);
        let near_lum = luminance(near.radiance);
        let sky_lum = luminance(sky.radiance);
        assert!(
            near_lum < sky_lum,
            "a 5 km path ({near_lum}) must in-scatter less than the full sky path ({sky_lum})"
        );
        assert!(near.transmittance > sky.transmittance);
    }

    #[test]
    fn test_night_energy_is_small_but_never_exactly_zero_path() {
        let params = AtmosphereParameters::earth();
        let solar = night_sun();
        let result = integrate_scattering(
            Vec3::ZERO,
            Vec3::Y,
            f32::INFINITY,
            &params,
            &solar,
            &ScatteringSettings::default(),
        );
        assert!(result.radiance.is_finite());
        assert!(result.radiance.min_element() >= 0.0);
        // The twilight irradiance floor keeps the energy term alive.
        assert!(solar.irradiance > 0.0);
        assert!((0.0..=1.0).contains(&result.transmittance));
        let day = integrate_scattering(
            Vec3::ZERO,
            Vec3::Y,
            f32::INFINITY,
            &params,
            &noon_sun(),
            &ScatteringSettings::default(),
        );
        assert!(luminance(result.radiance) < luminance(day.radiance) * 1e-2);
    }

    #[test]
    fn test_step_count_refinement_is_stable() {
        let params = AtmosphereParameters::earth();
        let solar = noon_sun();
        let coarse = integrate_scattering(
            Vec3::ZERO,
            Vec3::Y,
            f32::INFINITY,
            &params,
            &solar,
            &ScatteringSettings {
                view_steps: 16,
                sun_steps: 8,
            },
        );
        let fine = integrate_scattering(
            Vec3::ZERO,
            Vec3::Y,
            f32::INFINITY,
            &params,
            &solar,
            &ScatteringSettings {
                view_steps: 32,
                sun_steps: 8,
            },
        );
        let c = luminance(coarse.radiance);
        let f = luminance(fine.radiance);
        assert!(
            (c - f).abs() < 0.5 * f.max(1e-6),
            "16 vs 32 steps diverged: {c} vs {f}"
        );
    }
}
