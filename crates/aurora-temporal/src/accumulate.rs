//! Reprojection and history blending.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::history::HistoryBuffer;

/// Blend/rejection tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemporalSettings {
    /// Weight of the reprojected history in the blend, in [0, 1).
    pub history_weight: f32,
    /// How far history may deviate from the current frame's 3×3
    /// neighborhood color box before it is treated as a disocclusion and
    /// discarded.
    pub rejection_threshold: f32,
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            history_weight: 0.9,
            rejection_threshold: 0.15,
        }
    }
}

/// The engine's single stateful component: blends each frame's volumetric
/// buffer with the reprojected previous result.
///
/// Reprojection maps pixels at infinite depth through the camera delta
/// (view rotation dominates for sky and distant media); camera
/// translation and moving occluders are caught by the color-box rejection
/// instead.
pub struct TemporalAccumulator {
    history: HistoryBuffer,
    prev_view_proj: Option<Mat4>,
    settings: TemporalSettings,
}

impl TemporalAccumulator {
    pub fn new(width: usize, height: usize, settings: TemporalSettings) -> Self {
        Self {
            history: HistoryBuffer::new(width, height),
            prev_view_proj: None,
            settings,
        }
    }

    /// Drop all history (scene reset, teleport, any discontinuous camera
    /// configuration). The next resolve passes the current frame through.
    pub fn reset(&mut self) {
        self.history.invalidate();
        self.prev_view_proj = None;
    }

    /// Reallocate for a new output size and drop history.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.history.width() || height != self.history.height() {
            log::debug!("temporal history resized to {width}x{height}");
            self.history = HistoryBuffer::new(width, height);
        }
        self.reset();
    }

    /// Filter the current frame against history, returning the blended
    /// buffer and updating the history to it.
    ///
    /// `view_proj` / `inv_view_proj` are the current camera matrices; the
    /// previous frame's matrix is retained internally. The history buffer
    /// is replaced only after the whole frame has been resolved.
    pub fn resolve(
        &mut self,
        current: &[Vec3],
        view_proj: Mat4,
        inv_view_proj: Mat4,
    ) -> Vec<Vec3> {
        let width = self.history.width();
        let height = self.history.height();
        assert_eq!(
            current.len(),
            width * height,
            "volumetric buffer size must match the accumulator"
        );

        let mut out = vec![Vec3::ZERO; current.len()];
        let mut rejected = 0usize;

        let prev_view_proj = self.prev_view_proj;
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let blended = prev_view_proj
                    .and_then(|prev| {
                        self.reproject(x, y, width, height, prev, inv_view_proj)
                            .and_then(|(hx, hy)| self.history.sample(hx, hy))
                    })
                    .and_then(|history_rgb| {
                        self.accept(history_rgb, current, x, y, width, height)
                    });

                out[idx] = match blended {
                    Some(history_rgb) => {
                        current[idx].lerp(history_rgb, self.settings.history_weight)
                    }
                    None => {
                        rejected += 1;
                        current[idx]
                    }
                };
            }
        }

        if rejected > 0 {
            log::trace!("temporal resolve rejected {rejected} history samples");
        }

        // Swap the completed frame in as the new history in one step.
        self.history.store(out.clone(), vec![true; out.len()]);
        self.prev_view_proj = Some(view_proj);
        out
    }

    /// Map a current pixel to the previous frame's pixel grid via the
    /// world direction at infinite depth.
    fn reproject(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        prev_view_proj: Mat4,
        inv_view_proj: Mat4,
    ) -> Option<(usize, usize)> {
        let ndc = Vec2::new(
            (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
        );
        // Far-plane point in the current view.
        let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        if far.w.abs() < 1e-9 {
            return None;
        }
        let world = far.xyz() / far.w;

        let prev_clip = prev_view_proj * world.extend(1.0);
        if prev_clip.w <= 1e-6 {
            return None;
        }
        let prev_ndc = prev_clip.xyz() / prev_clip.w;
        if prev_ndc.x.abs() > 1.0 || prev_ndc.y.abs() > 1.0 {
            return None;
        }

        let px = ((prev_ndc.x + 1.0) * 0.5 * width as f32) as usize;
        let py = ((1.0 - prev_ndc.y) * 0.5 * height as f32) as usize;
        Some((px.min(width - 1), py.min(height - 1)))
    }

    /// Neighborhood color-box rejection: history deviating from the 3×3
    /// current-frame box beyond the threshold indicates a disocclusion.
    fn accept(
        &self,
        history_rgb: Vec3,
        current: &[Vec3],
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Option<Vec3> {
        let mut lo = Vec3::splat(f32::MAX);
        let mut hi = Vec3::splat(f32::MIN);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let nx = (x as i32 + dx).clamp(0, width as i32 - 1) as usize;
                let ny = (y as i32 + dy).clamp(0, height as i32 - 1) as usize;
                let c = current[ny * width + nx];
                lo = lo.min(c);
                hi = hi.max(c);
            }
        }
        let slack = Vec3::splat(self.settings.rejection_threshold);
        let lo = lo - slack;
        let hi = hi + slack;
        (history_rgb.cmpge(lo).all() && history_rgb.cmple(hi).all()).then_some(history_rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 8;
    const H: usize = 6;

    fn static_camera() -> (Mat4, Mat4) {
        let proj = Mat4::perspective_rh(1.0, W as f32 / H as f32, 0.1, 1000.0);
        let view = Mat4::look_to_rh(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z, Vec3::Y);
        let vp = proj * view;
        (vp, vp.inverse())
    }

    fn flat(v: f32) -> Vec<Vec3> {
        vec![Vec3::splat(v); W * H]
    }

    #[test]
    fn test_first_frame_passes_through() {
        let mut acc = TemporalAccumulator::new(W, H, TemporalSettings::default());
        let (vp, inv) = static_camera();
        let current = flat(0.5);
        let out = acc.resolve(&current, vp, inv);
        assert_eq!(out, current, "no history yet: current frame unblended");
    }

    #[test]
    fn test_identical_frames_converge_without_drift() {
        let mut acc = TemporalAccumulator::new(W, H, TemporalSettings::default());
        let (vp, inv) = static_camera();

        // Seed history with a nearby value (inside the rejection box) so
        // convergence runs through the blend path, then feed a constant
        // frame.
        let seed = flat(0.3);
        acc.resolve(&seed, vp, inv);
        let target = flat(0.2);
        let mut out = Vec::new();
        for _ in 0..60 {
            out = acc.resolve(&target, vp, inv);
        }
        let diff = (out[W * 2 + 3] - Vec3::splat(0.2)).abs().max_element();
        assert!(diff < 1e-2, "history must converge to the input, diff {diff}");

        // And once converged, stay exactly put.
        let settled = acc.resolve(&target, vp, inv);
        let drift = (settled[0] - out[0]).abs().max_element();
        assert!(drift < 1e-4, "no runaway drift on identical frames");
    }

    #[test]
    fn test_large_change_rejects_history() {
        let mut acc = TemporalAccumulator::new(W, H, TemporalSettings::default());
        let (vp, inv) = static_camera();
        acc.resolve(&flat(1.0), vp, inv);
        // A frame far outside the old neighborhood box: history discarded,
        // output equals current exactly.
        let out = acc.resolve(&flat(0.0), vp, inv);
        assert_eq!(out, flat(0.0), "disocclusion must discard history");
    }

    #[test]
    fn test_small_change_blends_history() {
        let settings = TemporalSettings::default();
        let mut acc = TemporalAccumulator::new(W, H, settings);
        let (vp, inv) = static_camera();
        acc.resolve(&flat(0.5), vp, inv);
        let out = acc.resolve(&flat(0.45), vp, inv);
        let expected = 0.45 + (0.5 - 0.45) * settings.history_weight;
        let got = out[W + 1].x;
        assert!(
            (got - expected).abs() < 1e-4,
            "expected blend toward history: {got} vs {expected}"
        );
    }

    #[test]
    fn test_reset_drops_history() {
        let mut acc = TemporalAccumulator::new(W, H, TemporalSettings::default());
        let (vp, inv) = static_camera();
        acc.resolve(&flat(0.5), vp, inv);
        acc.reset();
        let out = acc.resolve(&flat(0.1), vp, inv);
        assert_eq!(out, flat(0.1), "post-reset frame must pass through");
    }

    #[test]
    fn test_rotated_camera_out_of_view_rejects() {
        let mut acc = TemporalAccumulator::new(W, H, TemporalSettings::default());
        let proj = Mat4::perspective_rh(1.0, W as f32 / H as f32, 0.1, 1000.0);
        let view_a = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let vp_a = proj * view_a;
        acc.resolve(&flat(0.8), vp_a, vp_a.inverse());

        // Turn the camera fully around: nothing reprojects into view.
        let view_b = Mat4::look_to_rh(Vec3::ZERO, Vec3::Z, Vec3::Y);
        let vp_b = proj * view_b;
        let out = acc.resolve(&flat(0.3), vp_b, vp_b.inverse());
        assert_eq!(out, flat(0.3), "no valid match after a 180° turn");
    }

    #[test]
    fn test_resize_invalidates() {
        let mut acc = TemporalAccumulator::new(W, H, TemporalSettings::default());
        let (vp, inv) = static_camera();
        acc.resolve(&flat(0.9), vp, inv);
        acc.resize(W * 2, H * 2);
        let current = vec![Vec3::splat(0.1); W * 2 * H * 2];
        let out = acc.resolve(&current, vp, inv);
        assert_eq!(out, current);
    }
}
