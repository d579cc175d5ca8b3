//! Demo binary: renders a short time-of-day sequence through the full
//! engine pipeline and writes the frames as PNGs.
//!
//! Configuration is loaded from `scene.ron` in the working directory (a
//! default file is created on first run). Run with
//! `cargo run -p aurora-demo`; frames land in `aurora-demo-out/`.

use std::path::Path;
use std::time::Instant;

use glam::Vec3;
use tracing::info;

use aurora_config::SceneConfig;
use aurora_frame::{Camera, DepthBuffer, Engine, FrameInputs, RgbaBuffer};
use aurora_math::Aabb;
use aurora_volumetric::{LightSource, VolumetricMedium};

const WIDTH: usize = 320;
const HEIGHT: usize = 180;
const FRAMES_PER_HOUR: u32 = 4;

fn main() {
    aurora_log::init_logging(Some("info"));

    if let Err(err) = run() {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SceneConfig::load_or_create(Path::new("."))?;
    let (params, observer, quality) = config.to_engine_config()?;
    let mut engine = Engine::new(params, observer, quality, WIDTH, HEIGHT)?;

    let out_dir = Path::new("aurora-demo-out");
    std::fs::create_dir_all(out_dir)?;

    let camera = Camera {
        position: Vec3::new(0.0, 12.0, 0.0),
        aspect_ratio: WIDTH as f32 / HEIGHT as f32,
        far: 20_000.0,
        ..Camera::default()
    };

    // A rolling plain ahead of the camera: geometry in the lower half of
    // the frame, sky above.
    let depth = DepthBuffer::from_fn(WIDTH, HEIGHT, camera.far, |x, y| {
        let horizon = HEIGHT as f32 * 0.55;
        if (y as f32) > horizon {
            let slope = (y as f32 - horizon) / (HEIGHT as f32 - horizon);
            let wobble = 1.0 + 0.1 * ((x as f32) * 0.07).sin();
            (2_000.0 / slope.max(0.02)) * wobble
        } else {
            camera.far
        }
    });

    let fog = VolumetricMedium::ground_fog(Aabb::new(
        Vec3::new(-2_000.0, 0.0, -4_000.0),
        Vec3::new(2_000.0, 90.0, 200.0),
    ));
    let lights = [
        LightSource::directional(Vec3::new(0.25, -1.0, -0.4), Vec3::new(1.0, 0.96, 0.9), 4.0),
        LightSource::point(
            Vec3::new(-60.0, 25.0, -250.0),
            400.0,
            Vec3::new(1.0, 0.75, 0.45),
            120.0,
        )
        .with_shafts(),
    ];

    // Sweep the afternoon into dusk; several frames per hour so the
    // temporal accumulator has something to converge on.
    for (i, hour) in [12u32, 15, 17, 18, 19, 21].iter().enumerate() {
        let mut observer = *engine.observer();
        observer.hour = *hour;
        observer.minute = 0;
        engine.set_observer(observer);

        let inputs = FrameInputs {
            camera: camera.clone(),
            depth: &depth,
            lights: &lights,
            medium: Some(fog),
        };

        let start = Instant::now();
        for _ in 0..FRAMES_PER_HOUR - 1 {
            engine.render(&inputs);
        }
        let output = engine.render(&inputs).clone();
        let elapsed = start.elapsed();
        info!(
            "hour {hour:02}:00: {FRAMES_PER_HOUR} frames in {:.1} ms, sun elevation {:.1}°",
            elapsed.as_secs_f64() * 1e3,
            engine.solar_state().elevation.to_degrees()
        );

        let path = out_dir.join(format!("frame_{i:02}_h{hour:02}.png"));
        write_png(&output, &path)?;
    }

    info!("frames written to {}", out_dir.display());
    Ok(())
}

/// Encode the HDR output for viewing: Reinhard tone curve plus gamma.
/// (The real compositor applies its own post-processing; this is only for
/// the demo PNGs.)
fn write_png(buffer: &RgbaBuffer, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut img = image::RgbImage::new(buffer.width() as u32, buffer.height() as u32);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let rgb = buffer.pixel(x as usize, y as usize).rgb();
        let mapped = rgb / (rgb + Vec3::ONE);
        let encode = |v: f32| (v.powf(1.0 / 2.2).clamp(0.0, 1.0) * 255.0).round() as u8;
        *px = image::Rgb([encode(mapped.x), encode(mapped.y), encode(mapped.z)]);
    }
    img.save(path)?;
    Ok(())
}
