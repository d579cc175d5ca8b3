//! Scene light sources feeding the volumetric marcher.

use glam::Vec3;

use aurora_math::smoothstep;

/// The geometric kind of a light source.
///
/// A tagged variant rather than trait objects: the marcher matches on the
/// kind in its inner loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Infinitely distant light. `direction` points from the light toward
    /// the scene.
    Directional { direction: Vec3 },
    /// Localized omnidirectional light with a finite range.
    Point { position: Vec3, range: f32 },
    /// Cone-restricted point light. `direction` points out of the cone
    /// apex; `cos_inner`/`cos_outer` bound the soft cone edge.
    Spot {
        position: Vec3,
        direction: Vec3,
        range: f32,
        cos_inner: f32,
        cos_outer: f32,
    },
}

/// A light source active in the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub kind: LightKind,
    /// Linear RGB color (not premultiplied by intensity).
    pub color: Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
    /// Whether this light participates in screen-space shaft estimation.
    pub shafts: bool,
}

impl LightSource {
    /// A sun-style directional light.
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional {
                direction: direction.normalize(),
            },
            color,
            intensity,
            shafts: false,
        }
    }

    /// A point light with a finite range.
    pub fn point(position: Vec3, range: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point { position, range },
            color,
            intensity,
            shafts: false,
        }
    }

    /// Enable shaft estimation for this light.
    pub fn with_shafts(mut self) -> Self {
        self.shafts = true;
        self
    }

    /// Direction toward the light and attenuation factor at a world
    /// position. The attenuation is zero outside a light's range or cone.
    pub fn illumination_at(&self, p: Vec3) -> (Vec3, f32) {
        match self.kind {
            LightKind::Directional { direction } => (-direction, 1.0),
            LightKind::Point { position, range } => {
                let to_light = position - p;
                let distance = to_light.length();
                if distance < 1e-6 {
                    return (Vec3::Y, attenuation(0.0, range));
                }
                (to_light / distance, attenuation(distance, range))
            }
            LightKind::Spot {
                position,
                direction,
                range,
                cos_inner,
                cos_outer,
            } => {
                let to_light = position - p;
                let distance = to_light.length();
                if distance < 1e-6 {
                    return (Vec3::Y, attenuation(0.0, range));
                }
                let dir_to_light = to_light / distance;
                // Cone falloff: smooth between the outer and inner cosines.
                let cos_angle = direction.normalize().dot(-dir_to_light);
                let cone = if cos_inner > cos_outer {
                    smoothstep((cos_angle - cos_outer) / (cos_inner - cos_outer))
                } else if cos_angle >= cos_outer {
                    1.0
                } else {
                    0.0
                };
                (dir_to_light, attenuation(distance, range) * cone)
            }
        }
    }

    /// World position for screen projection, if the light has one.
    pub fn position(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { .. } => None,
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => Some(position),
        }
    }
}

/// Attenuation at a given distance from a localized light.
///
/// Inverse-square falloff with a smooth windowing term that reaches
/// exactly zero at the cutoff range. Returns a value in [0, 1].
pub fn attenuation(distance: f32, range: f32) -> f32 {
    if distance >= range || range <= 0.0 {
        return 0.0;
    }
    // The +1 term prevents the singularity at distance 0.
    let inv_sq = 1.0 / (distance * distance + 1.0);
    let ratio = distance / range;
    let t = (1.0 - ratio * ratio).max(0.0);
    inv_sq * t * t
}
