//! The engine facade: runs every stage of the atmospheric/volumetric
//! pipeline for one frame.
//!
//! Per-pixel work (background, aerial perspective, volumetric march) is
//! pure over immutable per-frame inputs, so rows are distributed across
//! scoped worker threads with no synchronization. The temporal resolve is
//! the single sequential, stateful step and runs strictly after the
//! volumetric pass; light shafts are added to its output before
//! compositing.

use glam::{Vec2, Vec3};

use aurora_atmosphere::{
    AtmosphereParameters, ParameterError, ScatteringResult, ScatteringSettings,
    integrate_scattering, sky_radiance,
};
use aurora_ephemeris::{Observer, SolarState};
use aurora_temporal::{TemporalAccumulator, TemporalSettings};
use aurora_volumetric::{
    LightKind, LightSource, MediumSampler, ShaftSettings, VolumetricSettings, march_volume,
    shaft_contribution,
};

use crate::buffer::{RgbaBuffer, RgbaPixel};
use crate::frame::FrameInputs;

/// How background/sky pixels are shaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SkyMode {
    /// Closed-form analytic model plus the solar disk. The cheap default.
    #[default]
    Analytic,
    /// Numerical single-scattering integration to the atmosphere edge.
    Integrated,
}

/// Quality/performance trade-offs for every stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QualitySettings {
    pub sky_mode: SkyMode,
    pub scattering: ScatteringSettings,
    pub volumetric: VolumetricSettings,
    pub temporal: TemporalSettings,
    pub shafts: ShaftSettings,
    /// Worker threads for the per-pixel stages. 0 = derive from the CPU
    /// count.
    pub threads: usize,
}

/// Owns the scene-level lighting state and renders frames on demand.
pub struct Engine {
    params: AtmosphereParameters,
    observer: Observer,
    solar: SolarState,
    quality: QualitySettings,
    temporal: TemporalAccumulator,
    width: usize,
    height: usize,
    output: RgbaBuffer,
}

impl Engine {
    /// Create an engine for the given scene configuration.
    ///
    /// Parameter validation happens here, once; invalid configuration is
    /// fatal to the caller rather than degrading per pixel.
    pub fn new(
        params: AtmosphereParameters,
        observer: Observer,
        quality: QualitySettings,
        width: usize,
        height: usize,
    ) -> Result<Self, ParameterError> {
        params.validate()?;
        let solar = SolarState::compute(&observer, params.sun_irradiance);
        log::info!(
            "engine up: {width}x{height}, sun elevation {:.2}°, azimuth {:.2}°",
            solar.elevation.to_degrees(),
            solar.azimuth.to_degrees()
        );
        Ok(Self {
            params,
            observer,
            solar,
            quality,
            temporal: TemporalAccumulator::new(width, height, quality.temporal),
            width,
            height,
            output: RgbaBuffer::new(width, height),
        })
    }

    pub fn atmosphere(&self) -> &AtmosphereParameters {
        &self.params
    }

    pub fn solar_state(&self) -> &SolarState {
        &self.solar
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Move the observer (location or time of day) and recompute the sun.
    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = observer;
        self.solar = SolarState::compute(&observer, self.params.sun_irradiance);
        log::info!(
            "observer updated: sun elevation {:.2}°, azimuth {:.2}°",
            self.solar.elevation.to_degrees(),
            self.solar.azimuth.to_degrees()
        );
    }

    /// Replace the atmosphere parameters (validated) and recompute the
    /// sun irradiance.
    pub fn set_atmosphere(&mut self, params: AtmosphereParameters) -> Result<(), ParameterError> {
        params.validate()?;
        self.params = params;
        self.solar = SolarState::compute(&self.observer, params.sun_irradiance);
        Ok(())
    }

    /// Change the output resolution. Discards the in-flight history.
    pub fn resize(&mut self, width: usize, height: usize) {
        log::info!("engine resized to {width}x{height}");
        self.width = width;
        self.height = height;
        self.output = RgbaBuffer::new(width, height);
        self.temporal.resize(width, height);
    }

    /// Discard temporal history (scene reset / camera teleport).
    pub fn reset(&mut self) {
        self.temporal.reset();
    }

    /// Render one frame into the output buffer.
    pub fn render(&mut self, inputs: &FrameInputs<'_>) -> &RgbaBuffer {
        if inputs.depth.width() != self.width || inputs.depth.height() != self.height {
            self.resize(inputs.depth.width(), inputs.depth.height());
        }
        let (width, height) = (self.width, self.height);
        let n = width * height;

        let sampler = inputs.medium.and_then(|medium| match medium.validate() {
            Ok(()) => Some(MediumSampler::new(medium)),
            Err(err) => {
                log::warn!("ignoring invalid medium: {err}");
                None
            }
        });

        let camera = &inputs.camera;
        let view_proj = camera.view_projection_matrix();
        let inv_view_proj = view_proj.inverse();
        let params = self.params;
        let solar = self.solar;
        let quality = self.quality;
        let depth = inputs.depth;
        let lights = inputs.lights;
        let sampler_ref = sampler.as_ref();

        let mut bg_rgb = vec![Vec3::ZERO; n];
        let mut bg_alpha = vec![0.0f32; n];
        let mut fog_rgb = vec![Vec3::ZERO; n];
        let mut fog_t = vec![1.0f32; n];

        let threads = match quality.threads {
            0 => num_cpus::get().saturating_sub(2).max(1),
            t => t,
        };
        let rows_per_chunk = height.div_ceil(threads).max(1);
        let chunk_len = rows_per_chunk * width;

        std::thread::scope(|scope| {
            let chunks = bg_rgb
                .chunks_mut(chunk_len)
                .zip(bg_alpha.chunks_mut(chunk_len))
                .zip(fog_rgb.chunks_mut(chunk_len))
                .zip(fog_t.chunks_mut(chunk_len))
                .enumerate();
            for (chunk_idx, (((bg_c, bga_c), fog_c), fogt_c)) in chunks {
                scope.spawn(move || {
                    let base = chunk_idx * chunk_len;
                    for local in 0..bg_c.len() {
                        let idx = base + local;
                        let (x, y) = (idx % width, idx / width);
                        let ray = camera.ray_for_pixel_with(&inv_view_proj, x, y, width, height);
                        let dir = ray.direction();
                        let sky = depth.is_sky(x, y);

                        let (rgb, alpha) = if sky {
                            let rgb = match quality.sky_mode {
                                SkyMode::Analytic => sky_radiance(dir, &solar, &params),
                                SkyMode::Integrated => {
                                    integrate_scattering(
                                        camera.position,
                                        dir,
                                        f32::INFINITY,
                                        &params,
                                        &solar,
                                        &quality.scattering,
                                    )
                                    .radiance
                                }
                            };
                            // No geometry behind a sky pixel; the
                            // compositor must not blend scene color in.
                            (rgb, 0.0)
                        } else {
                            let aerial = integrate_scattering(
                                camera.position,
                                dir,
                                depth.distance(x, y),
                                &params,
                                &solar,
                                &quality.scattering,
                            );
                            (aerial.radiance, aerial.transmittance)
                        };
                        bg_c[local] = rgb;
                        bga_c[local] = alpha;

                        if let Some(sampler) = sampler_ref {
                            let march_depth = if sky {
                                f32::INFINITY
                            } else {
                                depth.distance(x, y)
                            };
                            let fog = march_volume(
                                camera.position,
                                dir,
                                march_depth,
                                sampler,
                                lights,
                                &quality.volumetric,
                            );
                            fog_c[local] = fog.radiance;
                            fogt_c[local] = fog.transmittance;
                        }
                    }
                });
            }
        });

        // Temporal resolve: the only stateful step, strictly after the
        // volumetric pass and strictly before history is overwritten.
        let mut fog_filtered = if sampler.is_some() {
            self.temporal.resolve(&fog_rgb, view_proj, inv_view_proj)
        } else {
            fog_rgb
        };

        // Additive screen-space shafts for qualifying lights.
        for light in lights.iter().filter(|l| l.shafts) {
            let Some(light_uv) = shaft_anchor(light, camera) else {
                continue;
            };
            let color = light.color * light.intensity;
            let occluded = |uv: Vec2| !depth.is_sky_uv(uv);
            for y in 0..height {
                for x in 0..width {
                    let uv = Vec2::new(
                        (x as f32 + 0.5) / width as f32,
                        (y as f32 + 0.5) / height as f32,
                    );
                    fog_filtered[y * width + x] +=
                        shaft_contribution(uv, light_uv, color, &occluded, &quality.shafts);
                }
            }
        }

        // Composite fog over the background and clamp to the output
        // contract.
        let pixels = self.output.pixels_mut();
        for idx in 0..n {
            let fog = ScatteringResult {
                radiance: fog_filtered[idx],
                transmittance: fog_t[idx],
            };
            let combined = ScatteringResult {
                radiance: fog.apply_to(bg_rgb[idx]),
                transmittance: bg_alpha[idx] * fog_t[idx],
            }
            .sanitized();
            pixels[idx] = RgbaPixel::new(combined.radiance, combined.transmittance);
        }

        &self.output
    }
}

/// Screen-space anchor toward which a light's shafts converge.
fn shaft_anchor(light: &LightSource, camera: &crate::camera::Camera) -> Option<Vec2> {
    let world = match light.kind {
        LightKind::Directional { direction } => {
            // Anchor a directional light at a far point opposite its
            // travel direction.
            camera.position - direction.normalize() * camera.far
        }
        LightKind::Point { position, .. } | LightKind::Spot { position, .. } => position,
    };
    camera.project_to_uv(world)
}
