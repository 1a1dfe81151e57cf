//! Explicit per-frame state handed to every scene layer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat};

use crate::camera::Camera;

/// Everything a layer needs to draw one frame. Built once per frame by the
/// render loop; layers never read camera or lighting state from anywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub projection: Mat4,
    /// Eye translation and orientation, without zoom.
    pub sky_view: Mat4,
    /// Eye translation, orientation, and zoom.
    pub body_view: Mat4,
    pub orientation: Quat,
    pub zoom: f32,
    /// Seconds since the session started, from the loop's clock.
    pub elapsed: f32,
    pub lighting_enabled: bool,
    /// Surface size in physical pixels, each at least 1.
    pub viewport: (u32, u32),
}

impl FrameState {
    pub fn new(
        camera: &Camera,
        orientation: Quat,
        zoom: f32,
        elapsed: f32,
        lighting_enabled: bool,
        viewport: (u32, u32),
    ) -> Self {
        Self {
            projection: camera.projection_matrix(),
            sky_view: camera.sky_view(orientation),
            body_view: camera.body_view(orientation, zoom),
            orientation,
            zoom,
            elapsed,
            lighting_enabled,
            viewport: (viewport.0.max(1), viewport.1.max(1)),
        }
    }
}

/// GPU uniform shared by the layer shaders (group 0, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// `model` for layers that spin or scale their own geometry.
    pub model: [[f32; 4]; 4],
    /// x, y: viewport size; z: elapsed seconds; w: 1.0 when lighting is on.
    pub params: [f32; 4],
}

impl FrameUniform {
    /// Uniform for backdrop layers (sky view).
    pub fn sky(frame: &FrameState, model: Mat4) -> Self {
        Self::with_view(frame, frame.sky_view, model)
    }

    /// Uniform for the planet and its shells (body view).
    pub fn body(frame: &FrameState, model: Mat4) -> Self {
        Self::with_view(frame, frame.body_view, model)
    }

    fn with_view(frame: &FrameState, view: Mat4, model: Mat4) -> Self {
        Self {
            view_proj: (frame.projection * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            params: [
                frame.viewport.0 as f32,
                frame.viewport.1 as f32,
                frame.elapsed,
                if frame.lighting_enabled { 1.0 } else { 0.0 },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lighting: bool) -> FrameState {
        FrameState::new(&Camera::default(), Quat::IDENTITY, 1.5, 2.0, lighting, (1024, 768))
    }

    #[test]
    fn test_uniform_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 208);
    }

    #[test]
    fn test_params_carry_viewport_time_and_lighting() {
        let u = FrameUniform::body(&frame(true), Mat4::IDENTITY);
        assert_eq!(u.params, [1024.0, 768.0, 2.0, 1.0]);
        let u = FrameUniform::body(&frame(false), Mat4::IDENTITY);
        assert_eq!(u.params[3], 0.0);
    }

    #[test]
    fn test_sky_and_body_differ_only_by_zoom() {
        let orientation = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
        let f = FrameState::new(&Camera::default(), orientation, 1.5, 0.0, true, (800, 600));
        assert_ne!(f.sky_view, f.body_view);

        let unzoomed = f.body_view * Mat4::from_scale(glam::Vec3::splat(1.0 / f.zoom));
        assert!(unzoomed.abs_diff_eq(f.sky_view, 1e-5));

        let sky = FrameUniform::sky(&f, Mat4::IDENTITY);
        assert_eq!(sky.view, f.sky_view.to_cols_array_2d());
    }

    #[test]
    fn test_zero_viewport_is_clamped() {
        let f = FrameState::new(&Camera::default(), Quat::IDENTITY, 1.0, 0.0, true, (0, 0));
        assert_eq!(f.viewport, (1, 1));
    }
}
