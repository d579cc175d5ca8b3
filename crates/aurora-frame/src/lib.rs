//! Per-frame orchestration: camera, frame buffers, and the engine facade
//! that runs the sky, scattering, volumetric, temporal, and light-shaft
//! stages into a single RGBA radiance buffer for the external compositor.

mod buffer;
mod camera;
mod engine;
mod frame;

pub use buffer::{DepthBuffer, RgbaBuffer, RgbaPixel};
pub use camera::Camera;
pub use engine::{Engine, QualitySettings, SkyMode};
pub use frame::FrameInputs;
