//! Solar position calculation from observer location, date, and time.
//!
//! Reduces the standard NOAA solar-position algorithm: Julian day,
//! equation-of-time correction, solar declination and hour angle, then
//! elevation/azimuth by spherical trigonometry with an empirical
//! atmospheric-refraction correction near the horizon. Internally computes
//! in `f64` and converts to `f32` at the [`SolarState`] boundary.

mod julian;
mod observer;
mod solar;

pub use julian::julian_day;
pub use observer::Observer;
pub use solar::{SolarState, irradiance_for_elevation, refraction_correction};
