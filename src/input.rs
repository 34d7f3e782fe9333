//! Pointer handling for the attraction point.
//!
//! Pressing the pointer moves the attraction point to the world position
//! under the cursor; releasing it sends the point back to the origin. While
//! camera controls are enabled the pointer belongs to the camera and no
//! attraction commands are produced.
//!
//! # Usage
//!
//! ```
//! use gridswarm::input::{Pointer, PointerEvent, Viewport};
//! use gridswarm::{Camera, Command};
//!
//! let camera = Camera::default();
//! let mut pointer = Pointer::new(Viewport::new(1280, 720));
//!
//! pointer.handle(PointerEvent::Moved { x: 640.0, y: 360.0 }, camera.view_proj(), false);
//! let cmd = pointer.handle(PointerEvent::Pressed, camera.view_proj(), false);
//! assert!(matches!(cmd, Some(Command::PointerDown(_))));
//! ```

use glam::{Mat4, Vec2, Vec3};

use crate::simulation::Command;

/// Drawable surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, 1.0 for a zero-height viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Raw pointer events from the windowing layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Cursor moved to pixel coordinates (origin top-left).
    Moved { x: f32, y: f32 },
    /// Primary button went down.
    Pressed,
    /// Primary button went up.
    Released,
}

/// Map pixel coordinates to normalized device coordinates.
///
/// Origin is at the center of the viewport. X increases to the right, Y
/// increases upward. A zero-sized viewport maps everything to the center.
pub fn screen_to_ndc(x: f32, y: f32, viewport: Viewport) -> Vec2 {
    let (w, h) = (viewport.width, viewport.height);
    if w == 0 || h == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(2.0 * x / w as f32 - 1.0, 1.0 - 2.0 * y / h as f32)
}

/// Unproject an NDC point at `depth` through `inv_view_proj`.
fn unproject(ndc: Vec2, depth: f32, inv_view_proj: Mat4) -> Vec3 {
    let world = inv_view_proj * ndc.extend(depth).extend(1.0);
    if world.w.abs() > f32::EPSILON {
        world.truncate() / world.w
    } else {
        world.truncate()
    }
}

/// Cast a ray through a pixel and return where it meets the `z = 0` plane.
///
/// The ray runs from the near plane (NDC depth 0) toward the far plane
/// (depth 1). When it is parallel to the grid plane, or the plane lies
/// behind the near plane, the near-plane point is returned instead.
pub fn screen_to_world(x: f32, y: f32, viewport: Viewport, view_proj: Mat4) -> Vec3 {
    let ndc = screen_to_ndc(x, y, viewport);
    let inv = view_proj.inverse();
    let near = unproject(ndc, 0.0, inv);
    let far = unproject(ndc, 1.0, inv);

    let dir = far - near;
    if dir.z.abs() <= f32::EPSILON {
        return near;
    }
    let t = -near.z / dir.z;
    if t < 0.0 {
        return near;
    }
    near + dir * t
}

/// Cursor state tracking.
#[derive(Clone, Debug)]
pub struct Pointer {
    viewport: Viewport,
    position: Vec2,
    held: bool,
}

impl Pointer {
    /// Pointer at the top-left corner, button up.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            position: Vec2::ZERO,
            held: false,
        }
    }

    /// Update the viewport after a resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Cursor position in pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Cursor position in normalized device coordinates.
    pub fn ndc(&self) -> Vec2 {
        screen_to_ndc(self.position.x, self.position.y, self.viewport)
    }

    /// Whether the button is currently down.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Process one event, returning the command it triggers if any.
    pub fn handle(&mut self, event: PointerEvent, view_proj: Mat4, camera_controls: bool) -> Option<Command> {
        match event {
            PointerEvent::Moved { x, y } => {
                self.position = Vec2::new(x, y);
                None
            }
            PointerEvent::Pressed => {
                self.held = true;
                if camera_controls {
                    return None;
                }
                let point = screen_to_world(self.position.x, self.position.y, self.viewport, view_proj);
                log::debug!(
                    "pointer ({}, {}) on {}x{} -> world {:?}",
                    self.position.x,
                    self.position.y,
                    self.viewport.width,
                    self.viewport.height,
                    point
                );
                Some(Command::PointerDown(point))
            }
            PointerEvent::Released => {
                self.held = false;
                if camera_controls {
                    return None;
                }
                Some(Command::PointerUp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn test_ndc_corners() {
        let vp = Viewport::new(800, 600);
        assert_eq!(screen_to_ndc(400.0, 300.0, vp), Vec2::ZERO);
        assert_eq!(screen_to_ndc(0.0, 0.0, vp), Vec2::new(-1.0, 1.0));
        assert_eq!(screen_to_ndc(800.0, 600.0, vp), Vec2::new(1.0, -1.0));
        assert_eq!(screen_to_ndc(10.0, 10.0, Viewport::new(0, 600)), Vec2::ZERO);
    }

    #[test]
    fn test_center_unprojects_onto_view_axis() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(800.0 / 600.0);
        let point = screen_to_world(400.0, 300.0, Viewport::new(800, 600), camera.view_proj());

        // The camera looks down -Z through (50, 50).
        assert!((point.x - 50.0).abs() < 1e-2);
        assert!((point.y - 50.0).abs() < 1e-2);
        assert!(point.z.abs() < 1e-3);
    }

    #[test]
    fn test_off_center_click_lands_on_grid_plane() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1.0);
        let vp = Viewport::new(600, 600);

        // Right of center hits the plane right of the target, still at z = 0.
        let point = screen_to_world(450.0, 300.0, vp, camera.view_proj());
        assert!(point.z.abs() < 1e-3);
        assert!(point.x > 50.0);
        assert!((point.y - 50.0).abs() < 1e-2);

        // Close enough to the grid for capture to engage.
        let target = screen_to_world(300.0, 300.0, vp, camera.view_proj());
        assert!(target.distance(Vec3::new(50.0, 50.0, 0.0)) < 5.0);
    }

    #[test]
    fn test_plane_behind_camera_falls_back_to_near_plane() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, -20.0));
        camera.set_aspect_ratio(1.0);
        let point = screen_to_world(300.0, 300.0, Viewport::new(600, 600), camera.view_proj());
        assert!((point.z - (-10.1)).abs() < 1e-2);
    }

    #[test]
    fn test_unproject_identity() {
        let point = screen_to_world(800.0, 0.0, Viewport::new(800, 600), Mat4::IDENTITY);
        assert_eq!(point, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_press_and_release_commands() {
        let mut pointer = Pointer::new(Viewport::new(800, 600));
        let vp = Mat4::IDENTITY;

        assert_eq!(pointer.handle(PointerEvent::Moved { x: 0.0, y: 600.0 }, vp, false), None);
        assert_eq!(
            pointer.handle(PointerEvent::Pressed, vp, false),
            Some(Command::PointerDown(Vec3::new(-1.0, -1.0, 0.0)))
        );
        assert!(pointer.is_held());
        assert_eq!(pointer.handle(PointerEvent::Released, vp, false), Some(Command::PointerUp));
        assert!(!pointer.is_held());
    }

    #[test]
    fn test_camera_controls_swallow_clicks() {
        let mut pointer = Pointer::new(Viewport::new(800, 600));
        assert_eq!(pointer.handle(PointerEvent::Pressed, Mat4::IDENTITY, true), None);
        assert!(pointer.is_held());
        assert_eq!(pointer.handle(PointerEvent::Released, Mat4::IDENTITY, true), None);
    }
}
