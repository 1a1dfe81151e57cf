//! Orbit camera controller.
//!
//! The camera itself stays put; input rotates and scales the scene in front
//! of it. Rotations compose on the left of the stored orientation, so every
//! step turns about the camera's own axes, and the quaternion is renormalised
//! after each step to keep long sessions free of drift.

use glam::Quat;
use globe_input::{ArrowKey, Command, ZoomDirection};

/// Tunables for [`OrbitCamera`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSettings {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Radians of rotation per pixel of drag.
    pub drag_sensitivity: f32,
    /// Radians of rotation per arrow key press.
    pub key_step: f32,
    /// Zoom multiplier per wheel step towards the user (> 1).
    pub zoom_in_factor: f32,
    /// Zoom multiplier per wheel step away from the user (< 1).
    pub zoom_out_factor: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.3,
            max_zoom: 2.0,
            drag_sensitivity: 1.0_f32.to_radians(),
            key_step: 1.0_f32.to_radians(),
            zoom_in_factor: 1.05,
            zoom_out_factor: 0.95,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    settings: OrbitSettings,
    orientation: Quat,
    zoom: f32,
    drag: DragState,
    last_pointer: Option<(f64, f64)>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

impl OrbitCamera {
    /// Identity orientation, zoom 1 (clamped into the configured bounds).
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            orientation: Quat::IDENTITY,
            zoom: 1.0_f32.clamp(settings.min_zoom, settings.max_zoom),
            drag: DragState::Idle,
            last_pointer: None,
        }
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// Rotate by `dy·k` about the camera X axis and `dx·k` about the camera
    /// Y axis, `k` being the drag sensitivity.
    pub fn on_drag_delta(&mut self, dx: f32, dy: f32) {
        let k = self.settings.drag_sensitivity;
        let delta = Quat::from_rotation_x(dy * k) * Quat::from_rotation_y(dx * k);
        self.rotate(delta);
    }

    /// Multiply zoom by the wheel factor, staying within bounds.
    pub fn on_wheel(&mut self, direction: ZoomDirection) {
        let factor = match direction {
            ZoomDirection::In => self.settings.zoom_in_factor,
            ZoomDirection::Out => self.settings.zoom_out_factor,
        };
        self.zoom = (self.zoom * factor).clamp(self.settings.min_zoom, self.settings.max_zoom);
    }

    /// Fixed step about a cardinal axis, regardless of drag state.
    pub fn on_key(&mut self, key: ArrowKey) {
        let step = self.settings.key_step;
        let delta = match key {
            ArrowKey::Left => Quat::from_rotation_y(step),
            ArrowKey::Right => Quat::from_rotation_y(-step),
            ArrowKey::Up => Quat::from_rotation_x(-step),
            ArrowKey::Down => Quat::from_rotation_x(step),
        };
        self.rotate(delta);
    }

    pub fn begin_drag(&mut self) {
        self.drag = DragState::Dragging;
    }

    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Track the pointer; while dragging, the movement since the last
    /// position rotates the scene.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if let (DragState::Dragging, Some((last_x, last_y))) = (self.drag, self.last_pointer) {
            self.on_drag_delta((x - last_x) as f32, (y - last_y) as f32);
        }
        self.last_pointer = Some((x, y));
    }

    /// Apply a routed command. Returns `false` for commands the camera does
    /// not handle.
    pub fn apply(&mut self, command: &Command) -> bool {
        match *command {
            Command::Rotate(key) => self.on_key(key),
            Command::BeginDrag => self.begin_drag(),
            Command::EndDrag => self.end_drag(),
            Command::PointerMoved { x, y } => self.pointer_moved(x, y),
            Command::Zoom(direction) => self.on_wheel(direction),
            Command::ToggleLighting | Command::Resize { .. } | Command::Quit => return false,
        }
        true
    }

    fn rotate(&mut self, delta: Quat) {
        self.orientation = (delta * self.orientation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_quat_eq(a: Quat, b: Quat) {
        // q and -q are the same rotation.
        assert!(
            a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5),
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_starts_idle_at_identity() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.orientation(), Quat::IDENTITY);
        assert_eq!(cam.zoom(), 1.0);
        assert_eq!(cam.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_drag_delta_composes_x_then_y() {
        let mut cam = OrbitCamera::default();
        let k = cam.settings().drag_sensitivity;
        cam.on_drag_delta(10.0, 5.0);
        let expected = Quat::from_rotation_x(5.0 * k) * Quat::from_rotation_y(10.0 * k);
        assert_quat_eq(cam.orientation(), expected);
    }

    #[test]
    fn test_drag_composes_with_existing_orientation() {
        let mut cam = OrbitCamera::default();
        cam.on_key(ArrowKey::Left);
        let before = cam.orientation();
        cam.on_drag_delta(3.0, 0.0);
        let k = cam.settings().drag_sensitivity;
        assert_quat_eq(cam.orientation(), Quat::from_rotation_y(3.0 * k) * before);
    }

    #[test]
    fn test_pointer_motion_rotates_only_while_dragging() {
        let mut cam = OrbitCamera::default();
        cam.pointer_moved(100.0, 100.0);
        cam.pointer_moved(110.0, 105.0);
        assert_eq!(cam.orientation(), Quat::IDENTITY);

        cam.begin_drag();
        assert_eq!(cam.drag_state(), DragState::Dragging);
        cam.pointer_moved(120.0, 110.0);
        let k = cam.settings().drag_sensitivity;
        assert_quat_eq(
            cam.orientation(),
            Quat::from_rotation_x(5.0 * k) * Quat::from_rotation_y(10.0 * k),
        );

        cam.end_drag();
        let settled = cam.orientation();
        cam.pointer_moved(200.0, 200.0);
        assert_eq!(cam.orientation(), settled);
    }

    #[test]
    fn test_first_motion_after_press_without_history_does_not_jump() {
        let mut cam = OrbitCamera::default();
        cam.begin_drag();
        cam.pointer_moved(500.0, 500.0);
        assert_eq!(cam.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn test_zoom_never_exceeds_max() {
        let mut cam = OrbitCamera::default();
        for _ in 0..500 {
            cam.on_wheel(ZoomDirection::In);
            assert!(cam.zoom() <= cam.settings().max_zoom);
        }
        assert_eq!(cam.zoom(), 2.0);
    }

    #[test]
    fn test_zoom_never_below_min() {
        let mut cam = OrbitCamera::default();
        for _ in 0..500 {
            cam.on_wheel(ZoomDirection::Out);
            assert!(cam.zoom() >= cam.settings().min_zoom);
        }
        assert_eq!(cam.zoom(), 0.3);
    }

    #[test]
    fn test_single_wheel_steps() {
        let mut cam = OrbitCamera::default();
        cam.on_wheel(ZoomDirection::In);
        assert!((cam.zoom() - 1.05).abs() < 1e-6);
        cam.on_wheel(ZoomDirection::Out);
        assert!((cam.zoom() - 1.05 * 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_arrow_keys_step_about_cardinal_axes() {
        let step = 1.0_f32.to_radians();
        let cases = [
            (ArrowKey::Left, Quat::from_rotation_y(step)),
            (ArrowKey::Right, Quat::from_rotation_y(-step)),
            (ArrowKey::Up, Quat::from_rotation_x(-step)),
            (ArrowKey::Down, Quat::from_rotation_x(step)),
        ];
        for (key, expected) in cases {
            let mut cam = OrbitCamera::default();
            cam.on_key(key);
            assert_quat_eq(cam.orientation(), expected);
        }
    }

    #[test]
    fn test_keys_work_while_dragging() {
        let mut cam = OrbitCamera::default();
        cam.begin_drag();
        cam.on_key(ArrowKey::Down);
        assert_ne!(cam.orientation(), Quat::IDENTITY);
        assert_eq!(cam.drag_state(), DragState::Dragging);
    }

    #[test]
    fn test_orientation_stays_normalised_over_long_sessions() {
        let mut cam = OrbitCamera::default();
        cam.begin_drag();
        cam.pointer_moved(0.0, 0.0);
        for i in 0..100_000 {
            let t = i as f64;
            cam.pointer_moved(t.sin() * 50.0, t.cos() * 50.0);
        }
        assert!((cam.orientation().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_apply_reports_unhandled_commands() {
        let mut cam = OrbitCamera::default();
        assert!(cam.apply(&Command::Zoom(ZoomDirection::In)));
        assert!(cam.apply(&Command::BeginDrag));
        assert!(!cam.apply(&Command::ToggleLighting));
        assert!(!cam.apply(&Command::Quit));
        assert!(!cam.apply(&Command::Resize {
            width: 1,
            height: 1
        }));
    }

    #[test]
    fn test_initial_zoom_respects_bounds() {
        let cam = OrbitCamera::new(OrbitSettings {
            min_zoom: 1.5,
            ..OrbitSettings::default()
        });
        assert_eq!(cam.zoom(), 1.5);
    }
}
