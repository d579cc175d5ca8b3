//! Atmosphere model: physical parameters, phase functions, the analytic
//! sky radiance evaluator, and the Rayleigh+Mie single-scattering
//! integrator.
//!
//! The sky evaluator is the closed-form path (no marching) used for
//! background pixels; the integrator is the numerical path used for
//! distant-sky shading and aerial perspective on opaque geometry. Both
//! consume the same immutable [`AtmosphereParameters`] and
//! [`SolarState`](aurora_ephemeris::SolarState).

mod parameters;
mod phase;
mod result;
mod scattering;
mod sky;

pub use parameters::{AtmosphereParameters, ParameterError};
pub use phase::{henyey_greenstein, rayleigh_phase};
pub use result::ScatteringResult;
pub use scattering::{ScatteringSettings, integrate_scattering};
pub use sky::{SUN_ANGULAR_RADIUS, sky_radiance};
