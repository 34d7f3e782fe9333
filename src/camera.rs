//! Look-at camera for the particle view.

use glam::{Mat4, Vec3};

/// Perspective camera looking from `eye` toward `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Width over height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at `eye` looking at `target`, Y up, 45° vertical field of view.
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            fovy: 45f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Right-handed world-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Right-handed perspective projection with depth in `[0, 1]`.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.near, self.far)
    }

    /// Combined `projection * view`.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    /// Looks straight down -Z at the middle of a 100x100 grid.
    fn default() -> Self {
        Self::new(Vec3::new(50.0, 50.0, 10.0), Vec3::new(50.0, 50.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::default();
        let clip = camera.view_proj() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
    }
}
