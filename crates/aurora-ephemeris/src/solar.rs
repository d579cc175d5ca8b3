//! NOAA solar-position reduction: declination, equation of time, hour
//! angle, elevation/azimuth, and atmospheric refraction.

use glam::Vec3;

use crate::julian::{is_valid_date, julian_day};
use crate::observer::Observer;

/// Sun state for one observer location and instant.
///
/// Recomputed when the observer's location/date/time changes and persists
/// unchanged across frames otherwise. All angles are radians; azimuth is
/// measured clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarState {
    /// Unit vector from the scene toward the sun, world space
    /// (+X east, +Y up, −Z north).
    pub direction: Vec3,
    /// Elevation above the horizon, refraction-corrected. Negative below
    /// the horizon.
    pub elevation: f32,
    /// Azimuth clockwise from north.
    pub azimuth: f32,
    /// Scalar irradiance reaching the top of the atmosphere, already
    /// dimmed through twilight. Never exactly zero.
    pub irradiance: f32,
}

impl SolarState {
    /// Compute the solar state for an observer.
    ///
    /// `base_irradiance` is the full daytime sun intensity; the stored
    /// value is dimmed through twilight via [`irradiance_for_elevation`].
    /// An invalid calendar date fails closed to [`SolarState::night`]
    /// rather than returning an error.
    pub fn compute(observer: &Observer, base_irradiance: f32) -> Self {
        if !is_valid_date(observer.year, observer.month, observer.day) {
            log::warn!(
                "invalid date {}-{}-{}, treating as night",
                observer.year,
                observer.month,
                observer.day
            );
            return Self::night(base_irradiance);
        }

        let (elevation_deg, azimuth_deg) = elevation_azimuth(observer);
        let elevation = (elevation_deg as f32).to_radians();
        let azimuth = (azimuth_deg as f32).to_radians();

        Self {
            direction: direction_from_angles(elevation, azimuth),
            elevation,
            azimuth,
            irradiance: irradiance_for_elevation(elevation, base_irradiance),
        }
    }

    /// Fail-closed state: sun at the nadir (elevation −90°), residual
    /// irradiance only.
    pub fn night(base_irradiance: f32) -> Self {
        let elevation = -core::f32::consts::FRAC_PI_2;
        Self {
            direction: Vec3::NEG_Y,
            elevation,
            azimuth: 0.0,
            irradiance: irradiance_for_elevation(elevation, base_irradiance),
        }
    }
}

/// World-space unit vector for an elevation/azimuth pair (radians,
/// azimuth clockwise from north; +X east, +Y up, −Z north).
pub(crate) fn direction_from_angles(elevation: f32, azimuth: f32) -> Vec3 {
    let (sin_el, cos_el) = elevation.sin_cos();
    let (sin_az, cos_az) = azimuth.sin_cos();
    Vec3::new(sin_az * cos_el, sin_el, -cos_az * cos_el).normalize()
}

/// Refraction-corrected solar elevation and azimuth in degrees.
fn elevation_azimuth(observer: &Observer) -> (f64, f64) {
    let utc_hours = observer.local_hours() - observer.utc_offset_hours;
    let jd = julian_day(observer.year, observer.month, observer.day) + utc_hours / 24.0;
    // Julian centuries since J2000.0.
    let t = (jd - 2451545.0) / 36525.0;

    // Geometric mean longitude and anomaly of the sun, degrees.
    let mean_long = (280.46646 + t * (36000.76983 + t * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + t * (35999.05029 - 0.0001537 * t);
    let eccentricity = 0.016708634 - t * (0.000042037 + 0.0000001267 * t);

    let m = mean_anom.to_radians();
    let eq_of_center = m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289;

    let true_long = mean_long + eq_of_center;
    // Apparent longitude: corrected for nutation and aberration.
    let omega = (125.04 - 1934.136 * t).to_radians();
    let apparent_long = (true_long - 0.00569 - 0.00478 * omega.sin()).to_radians();

    // Mean obliquity of the ecliptic plus nutation correction, degrees.
    let mean_obliq =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    let obliq = (mean_obliq + 0.00256 * omega.cos()).to_radians();

    let declination = (obliq.sin() * apparent_long.sin()).asin();

    // Equation of time in minutes.
    let y = (obliq / 2.0).tan().powi(2);
    let l0 = mean_long.to_radians();
    let eq_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * eccentricity * m.sin()
            + 4.0 * eccentricity * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * m).sin())
        .to_degrees();

    // True solar time in minutes, then hour angle in degrees.
    let local_minutes = observer.local_hours() * 60.0;
    let tst = (local_minutes + eq_time + 4.0 * observer.longitude_deg
        - 60.0 * observer.utc_offset_hours)
        .rem_euclid(1440.0);
    // `tst` is wrapped to [0, 1440), so the hour angle lands in
    // [-180°, 180°): negative before solar noon, positive after.
    let hour_angle = (tst / 4.0 - 180.0).to_radians();

    let lat = observer.latitude_deg.to_radians();
    let cos_zenith = lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos();
    let elevation = 90.0 - zenith.to_degrees();

    // Azimuth clockwise from north; guard the poles and the exact zenith,
    // where the azimuth is undefined.
    let denom = lat.cos() * zenith.sin();
    let azimuth = if denom.abs() < 1e-9 {
        180.0
    } else {
        let cos_az = ((lat.sin() * zenith.cos()) - declination.sin()) / denom;
        let az = cos_az.clamp(-1.0, 1.0).acos().to_degrees();
        if hour_angle > 0.0 {
            (az + 180.0).rem_euclid(360.0)
        } else {
            (540.0 - az).rem_euclid(360.0)
        }
    };

    (elevation + refraction_correction(elevation), azimuth)
}

/// Empirical atmospheric refraction correction in degrees for an
/// uncorrected elevation in degrees.
///
/// NOAA's piecewise fit: strongest at the horizon (~0.48°), a separate
/// series below ~5°, asymptotically approaching zero at higher elevations,
/// and zero above 85° where the correction is below measurement noise.
pub fn refraction_correction(elevation_deg: f64) -> f64 {
    let e = elevation_deg;
    let arcsec = if e > 85.0 {
        0.0
    } else if e > 5.0 {
        let tan_e = e.to_radians().tan();
        58.1 / tan_e - 0.07 / tan_e.powi(3) + 0.000086 / tan_e.powi(5)
    } else if e > -0.575 {
        1735.0 + e * (-518.2 + e * (103.4 + e * (-12.79 + e * 0.711)))
    } else {
        -20.772 / e.to_radians().tan()
    };
    arcsec / 3600.0
}

/// Sun irradiance dimmed through twilight.
///
/// Full strength above ~6° elevation, smoothly fading through civil
/// twilight to a residual floor below −6°. The floor keeps the returned
/// value strictly positive so downstream transmittance weighting never
/// divides by zero.
pub fn irradiance_for_elevation(elevation: f32, base_irradiance: f32) -> f32 {
    const TWILIGHT_HALF_WIDTH_DEG: f32 = 6.0;
    const FLOOR: f32 = 1e-4;

    let t = (elevation.to_degrees() + TWILIGHT_HALF_WIDTH_DEG) / (2.0 * TWILIGHT_HALF_WIDTH_DEG);
    let t = t.clamp(0.0, 1.0);
    let smooth = t * t * (3.0 - 2.0 * t);
    (base_irradiance * smooth).max(base_irradiance.abs() * FLOOR + FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer(lat: f64, lon: f64, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Observer {
        Observer::new(lat, lon, y, mo, d, h, mi, 0, 0.0)
    }

    /// Solar declination recovered from the zenith angle at the
    /// subsolar-noon relation: elevation = 90° − lat + declination.
    fn noon_declination(lat: f64, state_elevation_deg: f64) -> f64 {
        state_elevation_deg - 90.0 + lat
    }

    #[test]
    fn test_june_solstice_declination() {
        // 2023 June solstice: declination ≈ +23.44°.
        let obs = observer(40.0, 0.0, 2023, 6, 21, 12, 2);
        let state = SolarState::compute(&obs, 1.0);
        let decl = noon_declination(40.0, state.elevation.to_degrees() as f64);
        assert!(
            (decl - 23.44).abs() < 0.15,
            "solstice declination = {decl}, expected ~23.44"
        );
    }

    #[test]
    fn test_march_equinox_declination() {
        // 2023 March equinox fell at 21:24 UTC on March 20. Solar noon at
        // longitude −141° is ~21:31 UTC, so an equatorial observer there
        // sees the sun essentially at the zenith.
        let obs = observer(0.0, -141.0, 2023, 3, 20, 21, 31);
        let state = SolarState::compute(&obs, 1.0);
        let decl = noon_declination(0.0, state.elevation.to_degrees() as f64);
        assert!(
            decl.abs() < 0.6,
            "equinox declination = {decl}, expected ~0"
        );
    }

    #[test]
    fn test_solar_noon_elevation_and_azimuth() {
        // Lat 40°N on the June solstice, near solar noon at Greenwich.
        let obs = observer(40.0, 0.0, 2023, 6, 21, 12, 2);
        let state = SolarState::compute(&obs, 1.0);
        let elevation = state.elevation.to_degrees();
        assert!(
            (elevation - 73.4).abs() < 0.5,
            "noon elevation = {elevation}, expected ~73.4"
        );
        let azimuth = state.azimuth.to_degrees();
        assert!(
            (azimuth - 180.0).abs() < 3.0,
            "noon azimuth = {azimuth}, expected ~180"
        );
    }

    #[test]
    fn test_morning_sun_in_the_east() {
        let obs = observer(40.0, 0.0, 2023, 6, 21, 6, 0);
        let state = SolarState::compute(&obs, 1.0);
        let elevation = state.elevation.to_degrees();
        let azimuth = state.azimuth.to_degrees();
        assert!(
            (13.0..18.0).contains(&elevation),
            "6am elevation = {elevation}"
        );
        assert!((65.0..80.0).contains(&azimuth), "6am azimuth = {azimuth}");
        assert!(state.direction.x > 0.0, "morning sun must be east (+X)");
        assert!(state.direction.y > 0.0, "morning sun must be above horizon");
    }

    #[test]
    fn test_midnight_below_horizon() {
        let obs = observer(40.0, 0.0, 2023, 6, 21, 0, 0);
        let state = SolarState::compute(&obs, 1.0);
        assert!(
            state.elevation.to_degrees() < -20.0,
            "midnight elevation = {}",
            state.elevation.to_degrees()
        );
        assert!(state.direction.y < 0.0);
    }

    #[test]
    fn test_direction_matches_angles() {
        let obs = observer(40.0, 0.0, 2023, 6, 21, 12, 2);
        let state = SolarState::compute(&obs, 1.0);
        let len = state.direction.length();
        assert!((len - 1.0).abs() < 1e-5, "direction length = {len}");
        assert!(
            (state.direction.y - state.elevation.sin()).abs() < 1e-5,
            "vertical component must equal sin(elevation)"
        );
    }

    #[test]
    fn test_invalid_date_fails_closed() {
        let obs = Observer::new(40.0, 0.0, 2023, 13, 1, 12, 0, 0, 0.0);
        let state = SolarState::compute(&obs, 1.0);
        assert_eq!(state.elevation, -core::f32::consts::FRAC_PI_2);
        assert_eq!(state.direction, Vec3::NEG_Y);
        assert!(state.irradiance > 0.0, "irradiance floor must survive");
    }

    #[test]
    fn test_distant_year_still_reasonable() {
        // The reduction holds over a multi-millennium range: noon at the
        // equator should stay within the tropics' elevation band.
        for year in [500, 1000, 3000, 4000] {
            let obs = observer(0.0, 0.0, year, 6, 21, 12, 0);
            let state = SolarState::compute(&obs, 1.0);
            let elevation = state.elevation.to_degrees();
            assert!(
                (60.0..=90.0).contains(&elevation),
                "year {year}: noon equatorial elevation = {elevation}"
            );
        }
    }

    #[test]
    fn test_refraction_profile() {
        let at_horizon = refraction_correction(0.0);
        assert!(
            (0.4..0.6).contains(&at_horizon),
            "horizon refraction = {at_horizon}°"
        );
        // Stronger near the horizon, asymptotically vanishing above.
        assert!(refraction_correction(2.0) < at_horizon);
        assert!(refraction_correction(10.0) < refraction_correction(5.0));
        assert!(refraction_correction(20.0) < 0.05);
        assert!(refraction_correction(45.0) < 0.02);
        assert_eq!(refraction_correction(86.0), 0.0);
    }

    #[test]
    fn test_twilight_irradiance_is_smooth_and_positive() {
        let base = 22.0;
        let day = irradiance_for_elevation(0.5, base);
        let dusk = irradiance_for_elevation(0.0, base);
        let night = irradiance_for_elevation(-0.5, base);
        assert!((day - base).abs() < 1e-3, "full sun above twilight");
        assert!(dusk < day && dusk > night, "dusk must sit between");
        assert!(night > 0.0, "night irradiance must stay positive");
        assert!(night < base * 1e-2);
    }
}
