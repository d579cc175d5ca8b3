//! Per-scene atmosphere constants and their validation.

use glam::Vec3;

/// Errors produced when atmosphere parameters are validated at
/// configuration-load time.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    /// A scalar field is NaN or infinite.
    #[error("parameter `{0}` is not finite")]
    NotFinite(&'static str),

    /// A coefficient that must be non-negative is negative.
    #[error("parameter `{0}` must be >= 0, got {1}")]
    Negative(&'static str, f32),

    /// The Mie asymmetry parameter left the open interval (-1, 1).
    #[error("mie asymmetry must lie strictly inside (-1, 1), got {0}")]
    AsymmetryOutOfRange(f32),

    /// The atmosphere shell does not enclose the planet.
    #[error("atmosphere radius {atmosphere} must exceed planet radius {planet}")]
    ShellInsidePlanet { planet: f32, atmosphere: f32 },

    /// A value that must be strictly positive is zero or negative.
    #[error("parameter `{0}` must be > 0, got {1}")]
    NotPositive(&'static str, f32),

    /// Ground albedo or another unit-interval field left [0, 1].
    #[error("parameter `{0}` must lie in [0, 1], got {1}")]
    OutOfUnitRange(&'static str, f32),

    /// Turbidity below the physical minimum of 1 (a perfectly clean sky).
    #[error("turbidity must be >= 1, got {0}")]
    TurbidityTooLow(f32),
}

/// Immutable per-scene physical constants for the atmosphere.
///
/// Created once per scene (or time-of-day change) and read-only during a
/// frame. Validated with [`AtmosphereParameters::validate`] before first
/// use; per-pixel evaluation assumes validity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereParameters {
    /// Planet radius in meters.
    pub planet_radius: f32,
    /// Radius of the outer atmosphere shell in meters. Must exceed
    /// `planet_radius`.
    pub atmosphere_radius: f32,
    /// Rayleigh scattering coefficient at sea level, one scalar per RGB
    /// sampling wavelength, in 1/m.
    pub rayleigh_scattering: Vec3,
    /// Rayleigh density scale height in meters.
    pub rayleigh_scale_height: f32,
    /// Mie scattering coefficient at sea level in 1/m (wavelength
    /// independent).
    pub mie_scattering: f32,
    /// Mie density scale height in meters.
    pub mie_scale_height: f32,
    /// Henyey–Greenstein asymmetry parameter g, strictly inside (-1, 1).
    pub mie_asymmetry: f32,
    /// Ground reflectance in [0, 1], used by the sky model's below-horizon
    /// fallback.
    pub ground_albedo: f32,
    /// Atmospheric haziness for the analytic sky model. 1 = perfectly
    /// clean, ~2 = clear day, 10 = heavy haze.
    pub turbidity: f32,
    /// Sun irradiance at the top of the atmosphere, engine radiance units.
    pub sun_irradiance: f32,
}

impl AtmosphereParameters {
    /// Earth-like defaults.
    pub fn earth() -> Self {
        Self {
            planet_radius: 6_371e3,
            atmosphere_radius: 6_471e3,
            rayleigh_scattering: Vec3::new(5.5e-6, 13.0e-6, 22.4e-6),
            rayleigh_scale_height: 8e3,
            mie_scattering: 21e-6,
            mie_scale_height: 1.2e3,
            mie_asymmetry: 0.758,
            ground_albedo: 0.3,
            turbidity: 2.0,
            sun_irradiance: 22.0,
        }
    }

    /// Validate every invariant. Called at configuration-load time; errors
    /// here are fatal to the owning scene, never surfaced per pixel.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let finite_checks = [
            ("planet_radius", self.planet_radius),
            ("atmosphere_radius", self.atmosphere_radius),
            ("rayleigh_scattering.r", self.rayleigh_scattering.x),
            ("rayleigh_scattering.g", self.rayleigh_scattering.y),
            ("rayleigh_scattering.b", self.rayleigh_scattering.z),
            ("rayleigh_scale_height", self.rayleigh_scale_height),
            ("mie_scattering", self.mie_scattering),
            ("mie_scale_height", self.mie_scale_height),
            ("mie_asymmetry", self.mie_asymmetry),
            ("ground_albedo", self.ground_albedo),
            ("turbidity", self.turbidity),
            ("sun_irradiance", self.sun_irradiance),
        ];
        for (name, value) in finite_checks {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite(name));
            }
        }

        for (name, value) in [
            ("planet_radius", self.planet_radius),
            ("atmosphere_radius", self.atmosphere_radius),
            ("rayleigh_scale_height", self.rayleigh_scale_height),
            ("mie_scale_height", self.mie_scale_height),
        ] {
            if value <= 0.0 {
                return Err(ParameterError::NotPositive(name, value));
            }
        }

        if self.atmosphere_radius <= self.planet_radius {
            return Err(ParameterError::ShellInsidePlanet {
                planet: self.planet_radius,
                atmosphere: self.atmosphere_radius,
            });
        }

        for (name, value) in [
            ("rayleigh_scattering.r", self.rayleigh_scattering.x),
            ("rayleigh_scattering.g", self.rayleigh_scattering.y),
            ("rayleigh_scattering.b", self.rayleigh_scattering.z),
            ("mie_scattering", self.mie_scattering),
            ("sun_irradiance", self.sun_irradiance),
        ] {
            if value < 0.0 {
                return Err(ParameterError::Negative(name, value));
            }
        }

        if self.mie_asymmetry <= -1.0 || self.mie_asymmetry >= 1.0 {
            return Err(ParameterError::AsymmetryOutOfRange(self.mie_asymmetry));
        }
        if !(0.0..=1.0).contains(&self.ground_albedo) {
            return Err(ParameterError::OutOfUnitRange(
                "ground_albedo",
                self.ground_albedo,
            ));
        }
        if self.turbidity < 1.0 {
            return Err(ParameterError::TurbidityTooLow(self.turbidity));
        }
        if self.turbidity > 10.0 {
            log::warn!(
                "turbidity {} is outside the analytic sky model's fitted range (1..=10)",
                self.turbidity
            );
        }

        Ok(())
    }

    /// Convert a world-space position (origin at sea level, +Y up) to
    /// planet-centric coordinates used by the scattering integrator.
    pub fn planet_position(&self, world: Vec3) -> Vec3 {
        world + Vec3::Y * self.planet_radius
    }

    /// Altitude above sea level of a planet-centric position.
    pub fn altitude(&self, planet_pos: Vec3) -> f32 {
        planet_pos.length() - self.planet_radius
    }
}

impl Default for AtmosphereParameters {
    fn default() -> Self {
        Self::earth()
    }
}
