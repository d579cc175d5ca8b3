//! Participating media: fog/haze volumes, scene light sources, the
//! volumetric ray marcher, and the screen-space light-shaft estimator.
//!
//! The marcher accumulates in-scattered light from the active light list
//! through a bounded density field; the shaft estimator is the cheaper,
//! noisier screen-space alternative for strong directional sources.

mod light;
mod march;
mod medium;
mod shafts;

pub use light::{LightKind, LightSource, attenuation};
pub use march::{VolumetricSettings, march_volume};
pub use medium::{MediumBounds, MediumError, MediumNoiseParams, MediumSampler, VolumetricMedium};
pub use shafts::{ShaftSettings, shaft_contribution};
