//! Projection camera for the orbit viewer.
//!
//! The eye sits on the +Z axis looking at the origin; the orbit controller
//! supplies orientation and zoom, and [`Camera`] turns them into matrices.

use glam::{Mat4, Quat, Vec3};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
}

/// Eye placement and projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
    /// Distance from the eye to the orbit centre.
    pub distance: f32,
}

impl Camera {
    pub fn new(fov_y_degrees: f32, near: f32, far: f32, distance: f32) -> Self {
        Self {
            projection: Projection {
                fov_y: fov_y_degrees.to_radians(),
                aspect_ratio: 1.0,
            },
            near,
            far,
            distance,
        }
    }

    /// Reverse-Z perspective: near maps to 1, far to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.projection.fov_y,
            self.projection.aspect_ratio,
            self.far,  // swapped: far as "near" parameter
            self.near, // swapped: near as "far" parameter
        )
    }

    /// Translation that pulls the scene `distance` units in front of the eye.
    pub fn eye_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
    }

    /// View for the planet and its shells: orientation and zoom applied.
    pub fn body_view(&self, orientation: Quat, zoom: f32) -> Mat4 {
        self.eye_matrix()
            * Mat4::from_scale_rotation_translation(Vec3::splat(zoom), orientation, Vec3::ZERO)
    }

    /// View for the backdrop layers: orientation only, so zoom never pushes
    /// the sky through the far plane.
    pub fn sky_view(&self, orientation: Quat) -> Mat4 {
        self.eye_matrix() * Mat4::from_quat(orientation)
    }

    /// Update the aspect ratio from a surface size. Zero dimensions are treated as 1.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.projection.aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.projection.aspect_ratio
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(40.0, 0.1, 100.0, 6.0)
    }
}
