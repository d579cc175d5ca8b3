//! Analytic closed-form sky radiance.
//!
//! Perez five-coefficient luminance/chromaticity distribution (Preetham's
//! daylight fit), parameterized by turbidity and the solar zenith angle,
//! evaluated in Yxy and converted to linear sRGB. No marching; this is the
//! cheap path used when a view ray escapes to the sky. An explicit
//! solar-disk term is added when the view direction falls within the sun's
//! angular radius.

use core::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

use aurora_ephemeris::SolarState;
use aurora_math::smoothstep;

use crate::parameters::AtmosphereParameters;

/// Angular radius of the solar disk in radians (~0.268°).
pub const SUN_ANGULAR_RADIUS: f32 = 4.675e-3;

/// Maps the model's absolute zenith luminance (kcd/m²) into engine
/// radiance units comparable with the scattering integrator's output.
const LUMINANCE_SCALE: f32 = 0.04;

/// HDR multiplier for the solar disk relative to sun irradiance. The disk
/// must dominate every diffuse-sky value in the frame.
const SUN_DISK_RADIANCE_SCALE: f32 = 400.0;

/// Warm-white disk tint, linear RGB.
const SUN_DISK_TINT: Vec3 = Vec3::new(1.0, 0.96, 0.90);

/// Sky radiance for a view direction.
///
/// Finite and non-negative for every direction: below-horizon views
/// degrade to a dim ground radiance tinted by the ground albedo, and a
/// sun below the horizon dims the whole dome through the twilight
/// irradiance ratio instead of extrapolating the daylight fit.
pub fn sky_radiance(view: Vec3, solar: &SolarState, params: &AtmosphereParameters) -> Vec3 {
    let view = view.normalize_or(Vec3::Y);

    // Evaluate the fit no lower than the horizon; the sun's zenith angle
    // saturates there and twilight dimming takes over below.
    let sun_zenith = (FRAC_PI_2 - solar.elevation).clamp(0.0, FRAC_PI_2);
    let dimming = twilight_dimming(solar, params);

    // Below-horizon views sample the fit at the horizon, then fade to the
    // albedo-tinted ground value.
    let view_zenith = view.y.clamp(-1.0, 1.0).acos();
    let eval_zenith = view_zenith.min(FRAC_PI_2 * 0.9999);
    let gamma = view.dot(solar.direction).clamp(-1.0, 1.0).acos();

    let mut rgb = perez_rgb(params.turbidity, sun_zenith, eval_zenith, gamma);
    rgb *= LUMINANCE_SCALE * dimming;

    if view.y < 0.0 {
        // Dim ground radiance: horizon color scaled by the surface
        // reflectance, blended over a narrow band to avoid a hard line.
        let ground = rgb * (0.25 * params.ground_albedo);
        let blend = smoothstep((view.y + 0.05) / 0.05);
        rgb = ground.lerp(rgb, blend);
    } else if solar.elevation > 0.0 {
        rgb += sun_disk(gamma, solar);
    }

    sanitize(rgb)
}

/// Perez distribution evaluated per RGB channel via Yxy.
fn perez_rgb(turbidity: f32, sun_zenith: f32, view_zenith: f32, gamma: f32) -> Vec3 {
    let t = turbidity;

    let y_lum = zenith_luminance(t, sun_zenith)
        * perez_ratio(view_zenith, gamma, sun_zenith, luminance_coeffs(t));
    let x = zenith_chroma_x(t, sun_zenith)
        * perez_ratio(view_zenith, gamma, sun_zenith, chroma_x_coeffs(t));
    let y = zenith_chroma_y(t, sun_zenith)
        * perez_ratio(view_zenith, gamma, sun_zenith, chroma_y_coeffs(t));

    yxy_to_linear_srgb(y_lum.max(0.0), x, y)
}

/// F(θ,γ)/F(0,θs) for one channel's five coefficients.
fn perez_ratio(view_zenith: f32, gamma: f32, sun_zenith: f32, coeffs: [f32; 5]) -> f32 {
    let denom = perez(0.0, sun_zenith, coeffs);
    if denom.abs() < 1e-6 {
        return 0.0;
    }
    (perez(view_zenith, gamma, coeffs) / denom).max(0.0)
}

/// Perez luminance distribution function.
fn perez(theta: f32, gamma: f32, [a, b, c, d, e]: [f32; 5]) -> f32 {
    // Near-90° zenith angles drive cos(θ) → 0; the exponent is clamped
    // rather than letting the gradient term blow up.
    let cos_theta = theta.cos().max(0.01);
    let cos_gamma = gamma.cos();
    let value =
        (1.0 + a * (b / cos_theta).exp()) * (1.0 + c * (d * gamma).exp() + e * cos_gamma * cos_gamma);
    if value.is_finite() { value } else { 0.0 }
}

fn luminance_coeffs(t: f32) -> [f32; 5] {
    [
        0.1787 * t - 1.4630,
        -0.3554 * t + 0.4275,
        -0.0227 * t + 5.3251,
        0.1206 * t - 2.5771,
        -0.0670 * t + 0.3703,
    ]
}

fn chroma_x_coeffs(t: f32) -> [f32; 5] {
    [
        -0.0193 * t - 0.2592,
        -0.0665 * t + 0.0008,
        -0.0004 * t + 0.2125,
        -0.0641 * t - 0.8989,
        -0.0033 * t + 0.0452,
    ]
}

fn chroma_y_coeffs(t: f32) -> [f32; 5] {
    [
        -0.0167 * t - 0.2608,
        -0.0950 * t + 0.0092,
        -0.0079 * t + 0.2102,
        -0.0441 * t - 1.6537,
        -0.0109 * t + 0.0529,
    ]
}

/// Zenith luminance in kcd/m².
fn zenith_luminance(t: f32, sun_zenith: f32) -> f32 {
    let chi = (4.0 / 9.0 - t / 120.0) * (PI - 2.0 * sun_zenith);
    (4.0453 * t - 4.9710) * chi.tan() - 0.2155 * t + 2.4192
}

fn zenith_chroma_x(t: f32, sun_zenith: f32) -> f32 {
    let ts = sun_zenith;
    let ts2 = ts * ts;
    let ts3 = ts2 * ts;
    (0.00165 * ts3 - 0.00375 * ts2 + 0.00209 * ts) * t * t
        + (-0.02903 * ts3 + 0.06377 * ts2 - 0.03202 * ts + 0.00394) * t
        + (0.11693 * ts3 - 0.21196 * ts2 + 0.06052 * ts + 0.25886)
}

fn zenith_chroma_y(t: f32, sun_zenith: f32) -> f32 {
    let ts = sun_zenith;
    let ts2 = ts * ts;
    let ts3 = ts2 * ts;
    (0.00275 * ts3 - 0.00610 * ts2 + 0.00317 * ts) * t * t
        + (-0.04214 * ts3 + 0.08970 * ts2 - 0.04153 * ts + 0.00516) * t
        + (0.15346 * ts3 - 0.26756 * ts2 + 0.06670 * ts + 0.26688)
}

/// Yxy → XYZ → linear sRGB, clamped non-negative.
fn yxy_to_linear_srgb(y_lum: f32, x: f32, y: f32) -> Vec3 {
    if y.abs() < 1e-6 {
        return Vec3::ZERO;
    }
    let big_x = x * (y_lum / y);
    let big_z = (1.0 - x - y) * (y_lum / y);

    let r = 3.2406 * big_x - 1.5372 * y_lum - 0.4986 * big_z;
    let g = -0.9689 * big_x + 1.8758 * y_lum + 0.0415 * big_z;
    let b = 0.0557 * big_x - 0.2040 * y_lum + 1.0570 * big_z;
    Vec3::new(r, g, b).max(Vec3::ZERO)
}

/// Solar-disk radiance with a softened limb.
fn sun_disk(gamma: f32, solar: &SolarState) -> Vec3 {
    if gamma >= SUN_ANGULAR_RADIUS {
        return Vec3::ZERO;
    }
    let limb = smoothstep((SUN_ANGULAR_RADIUS - gamma) / (SUN_ANGULAR_RADIUS * 0.2));
    SUN_DISK_TINT * solar.irradiance * SUN_DISK_RADIANCE_SCALE * limb
}

/// Ratio of current (twilight-dimmed) irradiance to the configured full
/// sun intensity. Strictly positive, so the night sky stays dim rather
/// than black.
fn twilight_dimming(solar: &SolarState, params: &AtmosphereParameters) -> f32 {
    if params.sun_irradiance > 0.0 {
        (solar.irradiance / params.sun_irradiance).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sanitize(rgb: Vec3) -> Vec3 {
    Vec3::new(
        if rgb.x.is_finite() { rgb.x.max(0.0) } else { 0.0 },
        if rgb.y.is_finite() { rgb.y.max(0.0) } else { 0.0 },
        if rgb.z.is_finite() { rgb.z.max(0.0) } else { 0.0 },
    )
}
