//! Screen-space light-shaft (god-ray) estimation.
//!
//! For each pixel, samples along the screen-space segment toward a
//! light's projected position, testing the depth buffer for occlusion and
//! accumulating with per-step exponential decay. Cheaper and noisier than
//! the full volumetric march; used for strong sources flagged with
//! `shafts`.

use glam::{Vec2, Vec3};

use aurora_math::smoothstep;

/// Tuning for the shaft estimator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaftSettings {
    /// Samples along the pixel→light segment.
    pub samples: u32,
    /// Per-step decay of the accumulated weight, in (0, 1].
    pub decay: f32,
    /// Overall intensity of the additive contribution.
    pub intensity: f32,
    /// Screen-edge fade margin in UV units; the effect fades out as the
    /// light's projection approaches the viewport border.
    pub edge_fade_margin: f32,
}

impl Default for ShaftSettings {
    fn default() -> Self {
        Self {
            samples: 24,
            decay: 0.92,
            intensity: 0.25,
            edge_fade_margin: 0.2,
        }
    }
}

/// Additive RGB shaft contribution for one pixel.
///
/// `occluded` reports whether the depth buffer blocks a UV sample (depth
/// values at/near the far plane are sky and count as unoccluded). The caller
/// is responsible for skipping lights that project behind the camera.
pub fn shaft_contribution(
    uv: Vec2,
    light_uv: Vec2,
    light_color: Vec3,
    occluded: &dyn Fn(Vec2) -> bool,
    settings: &ShaftSettings,
) -> Vec3 {
    let samples = settings.samples.max(1);
    let fade = edge_fade(light_uv, settings.edge_fade_margin);
    if fade <= 0.0 {
        return Vec3::ZERO;
    }

    let delta = (light_uv - uv) / samples as f32;
    let mut weight = 1.0f32;
    let mut accum = 0.0f32;
    let mut sample_uv = uv;
    for _ in 0..samples {
        sample_uv += delta;
        if in_viewport(sample_uv) && !occluded(sample_uv) {
            accum += weight;
        }
        weight *= settings.decay.clamp(0.0, 1.0);
    }

    light_color * (settings.intensity * fade * accum / samples as f32)
}

/// Fade factor for a light projection near or beyond the viewport edge.
fn edge_fade(light_uv: Vec2, margin: f32) -> f32 {
    if margin <= 0.0 {
        return if in_viewport(light_uv) { 1.0 } else { 0.0 };
    }
    let dx = light_uv.x.min(1.0 - light_uv.x);
    let dy = light_uv.y.min(1.0 - light_uv.y);
    smoothstep(dx / margin) * smoothstep(dy / margin)
}

fn in_viewport(uv: Vec2) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}
