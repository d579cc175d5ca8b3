//! Scalar interpolation helpers.

use glam::Vec3;

/// Linear interpolation between `a` and `b` by `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smoothstep interpolation: 3t² − 2t³ for t clamped to \[0, 1\].
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rec. 709 luminance of a linear RGB value.
pub fn luminance(rgb: Vec3) -> f32 {
    rgb.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
    }

    #[test]
    fn test_smoothstep_clamps_and_is_monotonic() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
        let mut prev = 0.0;
        for i in 0..=20 {
            let v = smoothstep(i as f32 / 20.0);
            assert!(v >= prev, "smoothstep must be non-decreasing");
            prev = v;
        }
    }

    #[test]
    fn test_luminance_weights_sum_to_one() {
        let white = luminance(Vec3::ONE);
        assert!((white - 1.0).abs() < 1e-4, "white luminance = {white}");
    }
}
