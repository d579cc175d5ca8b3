//! Camera: view/projection matrices and per-pixel ray reconstruction.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4, Vec4Swizzles};

use aurora_math::Ray;

/// Perspective camera supplying matrices, per-pixel rays, and screen
/// projection for the frame stages.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Position in world space.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Compute the view matrix (inverse of the camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up())
    }

    /// Perspective projection with [0, 1] depth.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// The right direction vector (+X in camera space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height;
    }

    /// World-space ray through the center of pixel `(x, y)`.
    ///
    /// Reconstructed by unprojecting the pixel at the far plane, the same
    /// inverse view-projection trick a fullscreen sky pass uses.
    pub fn ray_for_pixel(&self, x: usize, y: usize, width: usize, height: usize) -> Ray {
        let inv = self.view_projection_matrix().inverse();
        self.ray_for_pixel_with(&inv, x, y, width, height)
    }

    /// [`Self::ray_for_pixel`] with a precomputed inverse view-projection,
    /// for per-pixel loops.
    pub fn ray_for_pixel_with(
        &self,
        inv_view_proj: &Mat4,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Ray {
        let ndc_x = (x as f32 + 0.5) / width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (y as f32 + 0.5) / height as f32 * 2.0;
        let far = *inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let world = far.xyz() / far.w;
        Ray::new(self.position, world - self.position)
    }

    /// Project a world position to viewport UV in [0, 1]².
    ///
    /// Returns `None` for positions behind the camera. Positions outside
    /// the viewport still project (UV outside [0, 1]) so callers can fade
    /// near-edge effects.
    pub fn project_to_uv(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::IDENTITY,
            fov_y: 60f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 10_000.0,
        }
    }
}
