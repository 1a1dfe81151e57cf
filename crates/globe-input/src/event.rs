//! Platform-neutral input events.
//!
//! The window host converts each winit [`WindowEvent`] it cares about into an
//! [`InputEvent`] and queues it; the render loop drains the queue in arrival
//! order once per frame. Tests build these events directly.

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

/// Pixels of smooth-scroll delta that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

/// Minimal description of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// The physical key involved.
    pub key: PhysicalKey,
    /// Whether the key was pressed or released.
    pub state: ElementState,
    /// Whether this is an auto-repeat event.
    pub repeat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(RawKeyEvent),
    PointerButton {
        button: MouseButton,
        state: ElementState,
    },
    /// Cursor position in physical pixels.
    PointerMoved {
        x: f64,
        y: f64,
    },
    /// Wheel movement in lines, positive away from the user.
    Wheel {
        lines: f32,
    },
    Resized {
        width: u32,
        height: u32,
    },
    CloseRequested,
}

impl InputEvent {
    /// Convert a winit window event. Events the viewer ignores yield `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key(RawKeyEvent {
                key: event.physical_key,
                state: event.state,
                repeat: event.repeat,
            })),
            WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::PointerButton {
                button: *button,
                state: *state,
            }),
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved {
                x: position.x,
                y: position.y,
            }),
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
                lines: wheel_lines(*delta),
            }),
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
            _ => None,
        }
    }

    /// A key press, for tests and scripted input.
    pub fn key_pressed(key: winit::keyboard::KeyCode) -> Self {
        InputEvent::Key(RawKeyEvent {
            key: PhysicalKey::Code(key),
            state: ElementState::Pressed,
            repeat: false,
        })
    }

    pub fn key_released(key: winit::keyboard::KeyCode) -> Self {
        InputEvent::Key(RawKeyEvent {
            key: PhysicalKey::Code(key),
            state: ElementState::Released,
            repeat: false,
        })
    }
}

/// Vertical wheel movement in lines.
pub fn wheel_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_x, y) => y,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
    }
}
