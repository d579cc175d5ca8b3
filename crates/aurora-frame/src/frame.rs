//! Read-only per-frame inputs from the external renderer.

use aurora_volumetric::{LightSource, VolumetricMedium};

use crate::buffer::DepthBuffer;
use crate::camera::Camera;

/// Everything the engine consumes for one frame, read-only.
///
/// The depth buffer, light list, and medium descriptor are owned by the
/// scene collaborator and borrowed for the duration of the render call.
pub struct FrameInputs<'a> {
    /// Camera for this frame.
    pub camera: Camera,
    /// Scene depth at render resolution.
    pub depth: &'a DepthBuffer,
    /// Active light sources.
    pub lights: &'a [LightSource],
    /// Fog/haze volume, if the scene carries one this frame.
    pub medium: Option<VolumetricMedium>,
}
