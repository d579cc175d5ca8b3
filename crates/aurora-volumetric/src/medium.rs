//! The fog/haze density field and its bounding volume.

use glam::Vec3;
use noise::{NoiseFn, Simplex};

use aurora_math::{Aabb, Ray, Sphere};

/// Errors raised when a medium descriptor is validated at scene-load time.
#[derive(Debug, thiserror::Error)]
pub enum MediumError {
    /// A scalar field is NaN or infinite.
    #[error("medium field `{0}` is not finite")]
    NotFinite(&'static str),

    /// Base density or extinction is negative.
    #[error("medium field `{0}` must be >= 0, got {1}")]
    Negative(&'static str, f32),

    /// Scale height must be strictly positive.
    #[error("scale height must be > 0, got {0}")]
    ScaleHeightNotPositive(f32),

    /// Single-scattering albedo left [0, 1].
    #[error("albedo must lie in [0, 1], got {0}")]
    AlbedoOutOfRange(f32),

    /// Noise amplitude must stay below 1 so density cannot go negative.
    #[error("noise amplitude must lie in [0, 1), got {0}")]
    NoiseAmplitudeOutOfRange(f32),

    /// Scattering asymmetry left the open interval (-1, 1).
    #[error("asymmetry must lie strictly inside (-1, 1), got {0}")]
    AsymmetryOutOfRange(f32),
}

/// Multi-octave simplex perturbation of the density field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediumNoiseParams {
    /// Seed for deterministic evaluation.
    pub seed: u32,
    /// Octave count. Typical range: 2–4; fog needs far fewer octaves than
    /// terrain.
    pub octaves: u32,
    /// Spatial frequency of the first octave, cycles per meter.
    pub base_frequency: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Overall perturbation strength in [0, 1). 0 disables the noise;
    /// values below 1 keep the perturbed density non-negative.
    pub amplitude: f32,
}

impl Default for MediumNoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 3,
            base_frequency: 0.02,
            lacunarity: 2.0,
            persistence: 0.5,
            amplitude: 0.5,
        }
    }
}

/// Bounding volume limiting the ray-march extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediumBounds {
    Sphere(Sphere),
    Box(Aabb),
}

/// Descriptor of a fog/haze volume, supplied per frame by the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumetricMedium {
    /// Density at ground level before noise perturbation, 1/m-ish scale
    /// (multiplied by `extinction` for the actual attenuation rate).
    pub base_density: f32,
    /// Exponential height-falloff scale in meters.
    pub scale_height: f32,
    /// Extinction cross-section: attenuation per unit density per meter.
    pub extinction: f32,
    /// Single-scattering albedo in [0, 1]: the scattered (vs absorbed)
    /// fraction of extinction.
    pub albedo: f32,
    /// Henyey–Greenstein asymmetry for light scattered inside the medium.
    pub asymmetry: f32,
    /// Bounding volume limiting the march.
    pub bounds: MediumBounds,
    /// Procedural density perturbation.
    pub noise: MediumNoiseParams,
}

impl VolumetricMedium {
    /// A low-lying ground fog bank inside a box.
    pub fn ground_fog(extent: Aabb) -> Self {
        Self {
            base_density: 0.4,
            scale_height: 15.0,
            extinction: 0.02,
            albedo: 0.9,
            asymmetry: 0.3,
            bounds: MediumBounds::Box(extent),
            noise: MediumNoiseParams::default(),
        }
    }

    /// Validate every invariant at scene-load time.
    pub fn validate(&self) -> Result<(), MediumError> {
        for (name, value) in [
            ("base_density", self.base_density),
            ("scale_height", self.scale_height),
            ("extinction", self.extinction),
            ("albedo", self.albedo),
            ("asymmetry", self.asymmetry),
            ("noise.amplitude", self.noise.amplitude),
        ] {
            if !value.is_finite() {
                return Err(MediumError::NotFinite(name));
            }
        }
        for (name, value) in [
            ("base_density", self.base_density),
            ("extinction", self.extinction),
        ] {
            if value < 0.0 {
                return Err(MediumError::Negative(name, value));
            }
        }
        if self.scale_height <= 0.0 {
            return Err(MediumError::ScaleHeightNotPositive(self.scale_height));
        }
        if !(0.0..=1.0).contains(&self.albedo) {
            return Err(MediumError::AlbedoOutOfRange(self.albedo));
        }
        if !(0.0..1.0).contains(&self.noise.amplitude) {
            return Err(MediumError::NoiseAmplitudeOutOfRange(self.noise.amplitude));
        }
        if self.asymmetry <= -1.0 || self.asymmetry >= 1.0 {
            return Err(MediumError::AsymmetryOutOfRange(self.asymmetry));
        }
        Ok(())
    }
}

/// Evaluates the medium's density field.
///
/// Owns the simplex generator so per-sample evaluation allocates nothing.
/// The field is `base_density · exp(-max(h,0)/H) · (1 + a·fbm)`, which is
/// bounded by [`MediumSampler::max_density`] for any position, which is
/// the guarantee the marcher relies on for a finite result.
pub struct MediumSampler {
    medium: VolumetricMedium,
    noise: Simplex,
    /// Normalization so the octave sum stays in [-1, 1].
    inv_max_octave_sum: f64,
}

impl MediumSampler {
    pub fn new(medium: VolumetricMedium) -> Self {
        let noise = Simplex::new(medium.noise.seed);
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..medium.noise.octaves.max(1) {
            sum += amp;
            amp *= medium.noise.persistence;
        }
        Self {
            medium,
            noise,
            inv_max_octave_sum: 1.0 / sum,
        }
    }

    pub fn medium(&self) -> &VolumetricMedium {
        &self.medium
    }

    /// Local density at a world position. Always in
    /// `[0, self.max_density()]`.
    pub fn density(&self, p: Vec3) -> f32 {
        let m = &self.medium;
        let height = p.y.max(0.0);
        let falloff = (-height / m.scale_height).exp();
        let perturbation = 1.0 + m.noise.amplitude * self.fbm(p);
        (m.base_density * falloff * perturbation).max(0.0)
    }

    /// Upper bound of [`Self::density`] over all positions.
    pub fn max_density(&self) -> f32 {
        self.medium.base_density * (1.0 + self.medium.noise.amplitude)
    }

    /// Clip a ray against the medium bounds, returning the
    /// `(t_enter, t_exit)` march interval.
    pub fn clip_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        match &self.medium.bounds {
            MediumBounds::Sphere(sphere) => ray.intersect_sphere(sphere),
            MediumBounds::Box(aabb) => ray.intersect_aabb(aabb),
        }
    }

    /// Multi-octave simplex noise in [-1, 1].
    fn fbm(&self, p: Vec3) -> f32 {
        let params = &self.medium.noise;
        if params.amplitude == 0.0 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut frequency = params.base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..params.octaves.max(1) {
            let sample = self.noise.get([
                p.x as f64 * frequency,
                p.y as f64 * frequency,
                p.z as f64 * frequency,
            ]);
            total += sample * amplitude;
            frequency *= params.lacunarity;
            amplitude *= params.persistence;
        }
        ((total * self.inv_max_octave_sum) as f32).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_medium() -> VolumetricMedium {
        VolumetricMedium::ground_fog(Aabb::new(
            Vec3::new(-200.0, 0.0, -200.0),
            Vec3::new(200.0, 80.0, 200.0),
        ))
    }

    #[test]
    fn test_ground_fog_validates() {
        test_medium().validate().expect("preset must validate");
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let mut medium = test_medium();
        medium.albedo = 1.5;
        assert!(matches!(
            medium.validate(),
            Err(MediumError::AlbedoOutOfRange(_))
        ));

        let mut medium = test_medium();
        medium.noise.amplitude = 1.0;
        assert!(matches!(
            medium.validate(),
            Err(MediumError::NoiseAmplitudeOutOfRange(_))
        ));

        let mut medium = test_medium();
        medium.extinction = -0.1;
        assert!(matches!(medium.validate(), Err(MediumError::Negative(..))));

        let mut medium = test_medium();
        medium.scale_height = 0.0;
        assert!(medium.validate().is_err());
    }

    #[test]
    fn test_density_bounded_and_non_negative() {
        let sampler = MediumSampler::new(test_medium());
        let bound = sampler.max_density();
        for i in 0..200 {
            let p = Vec3::new(
                (i as f32 * 7.3) % 400.0 - 200.0,
                (i as f32 * 1.7) % 80.0,
                (i as f32 * 13.1) % 400.0 - 200.0,
            );
            let d = sampler.density(p);
            assert!(d >= 0.0, "density must be non-negative at {p}");
            assert!(d <= bound + 1e-6, "density {d} exceeds bound {bound} at {p}");
        }
    }

    #[test]
    fn test_density_falls_with_height() {
        let mut medium = test_medium();
        medium.noise.amplitude = 0.0;
        let sampler = MediumSampler::new(medium);
        let low = sampler.density(Vec3::new(0.0, 1.0, 0.0));
        let mid = sampler.density(Vec3::new(0.0, 20.0, 0.0));
        let high = sampler.density(Vec3::new(0.0, 60.0, 0.0));
        assert!(low > mid && mid > high, "{low} > {mid} > {high} expected");
    }

    #[test]
    fn test_noise_perturbs_but_is_deterministic() {
        let sampler = MediumSampler::new(test_medium());
        let a = sampler.density(Vec3::new(10.0, 5.0, -30.0));
        let b = sampler.density(Vec3::new(10.0, 5.0, -30.0));
        assert_eq!(a, b, "same position must sample identically");

        let other = MediumSampler::new(test_medium());
        assert_eq!(a, other.density(Vec3::new(10.0, 5.0, -30.0)));
    }

    #[test]
    fn test_clip_ray_against_box() {
        let sampler = MediumSampler::new(test_medium());
        let inside = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::X);
        let (t0, t1) = sampler.clip_ray(&inside).expect("ray starts inside");
        assert_eq!(t0, 0.0);
        assert!((t1 - 200.0).abs() < 1e-3);

        let miss = Ray::new(Vec3::new(0.0, 500.0, 0.0), Vec3::Y);
        assert!(sampler.clip_ray(&miss).is_none());
    }
}
