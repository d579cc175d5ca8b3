//! The flat scene record and its RON persistence.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use aurora_atmosphere::AtmosphereParameters;
use aurora_ephemeris::Observer;
use aurora_frame::{QualitySettings, SkyMode};

use crate::error::ConfigError;

/// Flat record of the scene's scalar configuration: atmosphere constants,
/// observer location/date/time, and quality settings.
///
/// Every field has a default so partial files load; validation happens in
/// [`SceneConfig::to_engine_config`], not during parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    // Atmosphere.
    pub planet_radius: f32,
    pub atmosphere_radius: f32,
    pub rayleigh_r: f32,
    pub rayleigh_g: f32,
    pub rayleigh_b: f32,
    pub rayleigh_scale_height: f32,
    pub mie_scattering: f32,
    pub mie_scale_height: f32,
    pub mie_asymmetry: f32,
    pub ground_albedo: f32,
    pub turbidity: f32,
    pub sun_irradiance: f32,

    // Observer.
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub utc_offset_hours: f64,

    // Quality.
    pub sky_mode: String,
    pub scattering_view_steps: u32,
    pub scattering_sun_steps: u32,
    pub volumetric_steps: u32,
    pub volumetric_shadow_steps: u32,
    pub history_weight: f32,
    pub rejection_threshold: f32,
    pub shaft_samples: u32,
    pub shaft_decay: f32,
    pub shaft_intensity: f32,
    pub threads: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let params = AtmosphereParameters::earth();
        let observer = Observer::default();
        let quality = QualitySettings::default();
        Self {
            planet_radius: params.planet_radius,
            atmosphere_radius: params.atmosphere_radius,
            rayleigh_r: params.rayleigh_scattering.x,
            rayleigh_g: params.rayleigh_scattering.y,
            rayleigh_b: params.rayleigh_scattering.z,
            rayleigh_scale_height: params.rayleigh_scale_height,
            mie_scattering: params.mie_scattering,
            mie_scale_height: params.mie_scale_height,
            mie_asymmetry: params.mie_asymmetry,
            ground_albedo: params.ground_albedo,
            turbidity: params.turbidity,
            sun_irradiance: params.sun_irradiance,
            latitude_deg: observer.latitude_deg,
            longitude_deg: observer.longitude_deg,
            year: observer.year,
            month: observer.month,
            day: observer.day,
            hour: observer.hour,
            minute: observer.minute,
            second: observer.second,
            utc_offset_hours: observer.utc_offset_hours,
            sky_mode: "analytic".to_string(),
            scattering_view_steps: quality.scattering.view_steps,
            scattering_sun_steps: quality.scattering.sun_steps,
            volumetric_steps: quality.volumetric.steps,
            volumetric_shadow_steps: quality.volumetric.shadow_steps,
            history_weight: quality.temporal.history_weight,
            rejection_threshold: quality.temporal.rejection_threshold,
            shaft_samples: quality.shafts.samples,
            shaft_decay: quality.shafts.decay,
            shaft_intensity: quality.shafts.intensity,
            threads: 0,
        }
    }
}

impl SceneConfig {
    /// Load from the given directory, or create a default `scene.ron`.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join("scene.ron");
        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(ConfigError::Read)?;
            let config: SceneConfig = ron::from_str(&contents).map_err(ConfigError::Parse)?;
            log::info!("loaded scene config from {}", path.display());
            Ok(config)
        } else {
            let config = SceneConfig::default();
            config.save(config_dir)?;
            log::info!("created default scene config at {}", path.display());
            Ok(config)
        }
    }

    /// Save to `scene.ron` in the given directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;
        let path = config_dir.join("scene.ron");
        let pretty = ron::ser::PrettyConfig::new().separate_tuple_members(true);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }

    /// Capture a running configuration into a record.
    pub fn from_parts(
        params: &AtmosphereParameters,
        observer: &Observer,
        quality: &QualitySettings,
    ) -> Self {
        Self {
            planet_radius: params.planet_radius,
            atmosphere_radius: params.atmosphere_radius,
            rayleigh_r: params.rayleigh_scattering.x,
            rayleigh_g: params.rayleigh_scattering.y,
            rayleigh_b: params.rayleigh_scattering.z,
            rayleigh_scale_height: params.rayleigh_scale_height,
            mie_scattering: params.mie_scattering,
            mie_scale_height: params.mie_scale_height,
            mie_asymmetry: params.mie_asymmetry,
            ground_albedo: params.ground_albedo,
            turbidity: params.turbidity,
            sun_irradiance: params.sun_irradiance,
            latitude_deg: observer.latitude_deg,
            longitude_deg: observer.longitude_deg,
            year: observer.year,
            month: observer.month,
            day: observer.day,
            hour: observer.hour,
            minute: observer.minute,
            second: observer.second,
            utc_offset_hours: observer.utc_offset_hours,
            sky_mode: match quality.sky_mode {
                SkyMode::Analytic => "analytic".to_string(),
                SkyMode::Integrated => "integrated".to_string(),
            },
            scattering_view_steps: quality.scattering.view_steps,
            scattering_sun_steps: quality.scattering.sun_steps,
            volumetric_steps: quality.volumetric.steps,
            volumetric_shadow_steps: quality.volumetric.shadow_steps,
            history_weight: quality.temporal.history_weight,
            rejection_threshold: quality.temporal.rejection_threshold,
            shaft_samples: quality.shafts.samples,
            shaft_decay: quality.shafts.decay,
            shaft_intensity: quality.shafts.intensity,
            threads: quality.threads,
        }
    }

    /// Validate the record and build the engine-side values from it.
    pub fn to_engine_config(
        &self,
    ) -> Result<(AtmosphereParameters, Observer, QualitySettings), ConfigError> {
        let params = AtmosphereParameters {
            planet_radius: self.planet_radius,
            atmosphere_radius: self.atmosphere_radius,
            rayleigh_scattering: Vec3::new(self.rayleigh_r, self.rayleigh_g, self.rayleigh_b),
            rayleigh_scale_height: self.rayleigh_scale_height,
            mie_scattering: self.mie_scattering,
            mie_scale_height: self.mie_scale_height,
            mie_asymmetry: self.mie_asymmetry,
            ground_albedo: self.ground_albedo,
            turbidity: self.turbidity,
            sun_irradiance: self.sun_irradiance,
        };
        params.validate()?;

        let observer = Observer::new(
            self.latitude_deg,
            self.longitude_deg,
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.utc_offset_hours,
        );

        let sky_mode = match self.sky_mode.as_str() {
            "analytic" => SkyMode::Analytic,
            "integrated" => SkyMode::Integrated,
            other => return Err(ConfigError::UnknownSkyMode(other.to_string())),
        };

        let mut quality = QualitySettings {
            sky_mode,
            threads: self.threads,
            ..QualitySettings::default()
        };
        quality.scattering.view_steps = self.scattering_view_steps;
        quality.scattering.sun_steps = self.scattering_sun_steps;
        quality.volumetric.steps = self.volumetric_steps;
        quality.volumetric.shadow_steps = self.volumetric_shadow_steps;
        quality.temporal.history_weight = self.history_weight.clamp(0.0, 0.99);
        quality.temporal.rejection_threshold = self.rejection_threshold.max(0.0);
        quality.shafts.samples = self.shaft_samples;
        quality.shafts.decay = self.shaft_decay.clamp(0.0, 1.0);
        quality.shafts.intensity = self.shaft_intensity.max(0.0);

        Ok((params, observer, quality))
    }
}
