//! Maps input events to viewer commands.
//!
//! | Input                    | Command                      |
//! |--------------------------|------------------------------|
//! | Arrow key (press/repeat) | [`Command::Rotate`]          |
//! | `L` (press)              | [`Command::ToggleLighting`]  |
//! | `Esc` (press), close     | [`Command::Quit`]            |
//! | Left button down / up    | [`Command::BeginDrag`] / [`Command::EndDrag`] |
//! | Cursor moved             | [`Command::PointerMoved`]    |
//! | Wheel                    | [`Command::Zoom`]            |
//! | Window resized           | [`Command::Resize`]          |

use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::event::{InputEvent, RawKeyEvent};

/// Arrow key directions for stepwise rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// What the render loop should do in response to one input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Rotate(ArrowKey),
    BeginDrag,
    EndDrag,
    PointerMoved { x: f64, y: f64 },
    Zoom(ZoomDirection),
    ToggleLighting,
    Resize { width: u32, height: u32 },
    Quit,
}

/// Stateless event-to-command translation.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputRouter;

impl InputRouter {
    pub fn new() -> Self {
        Self
    }

    /// Translate one event; `None` for events with no effect.
    pub fn route(&self, event: &InputEvent) -> Option<Command> {
        match *event {
            InputEvent::Key(key) => route_key(key),
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state,
            } => Some(match state {
                ElementState::Pressed => Command::BeginDrag,
                ElementState::Released => Command::EndDrag,
            }),
            InputEvent::PointerButton { .. } => None,
            InputEvent::PointerMoved { x, y } => Some(Command::PointerMoved { x, y }),
            InputEvent::Wheel { lines } if lines > 0.0 => Some(Command::Zoom(ZoomDirection::In)),
            InputEvent::Wheel { lines } if lines < 0.0 => Some(Command::Zoom(ZoomDirection::Out)),
            InputEvent::Wheel { .. } => None,
            InputEvent::Resized { width, height } => Some(Command::Resize { width, height }),
            InputEvent::CloseRequested => {
                tracing::info!("Window close requested");
                Some(Command::Quit)
            }
        }
    }

    /// Translate a batch, keeping arrival order.
    pub fn route_all<'a, I>(&'a self, events: I) -> impl Iterator<Item = Command> + 'a
    where
        I: IntoIterator<Item = &'a InputEvent>,
        I::IntoIter: 'a,
    {
        events.into_iter().filter_map(|e| self.route(e))
    }
}

fn route_key(event: RawKeyEvent) -> Option<Command> {
    if event.state != ElementState::Pressed {
        return None;
    }
    let PhysicalKey::Code(code) = event.key else {
        return None;
    };
    match code {
        KeyCode::ArrowLeft => Some(Command::Rotate(ArrowKey::Left)),
        KeyCode::ArrowRight => Some(Command::Rotate(ArrowKey::Right)),
        KeyCode::ArrowUp => Some(Command::Rotate(ArrowKey::Up)),
        KeyCode::ArrowDown => Some(Command::Rotate(ArrowKey::Down)),
        KeyCode::KeyL if !event.repeat => {
            tracing::debug!("Lighting toggled");
            Some(Command::ToggleLighting)
        }
        KeyCode::Escape if !event.repeat => {
            tracing::info!("Escape pressed");
            Some(Command::Quit)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat(key: KeyCode) -> InputEvent {
        InputEvent::Key(RawKeyEvent {
            key: PhysicalKey::Code(key),
            state: ElementState::Pressed,
            repeat: true,
        })
    }

    #[test]
    fn test_arrow_keys_rotate() {
        let router = InputRouter::new();
        let cases = [
            (KeyCode::ArrowLeft, ArrowKey::Left),
            (KeyCode::ArrowRight, ArrowKey::Right),
            (KeyCode::ArrowUp, ArrowKey::Up),
            (KeyCode::ArrowDown, ArrowKey::Down),
        ];
        for (code, arrow) in cases {
            assert_eq!(
                router.route(&InputEvent::key_pressed(code)),
                Some(Command::Rotate(arrow))
            );
        }
    }

    #[test]
    fn test_arrow_repeat_keeps_rotating() {
        let router = InputRouter::new();
        assert_eq!(
            router.route(&repeat(KeyCode::ArrowLeft)),
            Some(Command::Rotate(ArrowKey::Left))
        );
    }

    #[test]
    fn test_key_release_does_nothing() {
        let router = InputRouter::new();
        assert_eq!(router.route(&InputEvent::key_released(KeyCode::ArrowLeft)), None);
        assert_eq!(router.route(&InputEvent::key_released(KeyCode::Escape)), None);
    }

    #[test]
    fn test_lighting_toggle_ignores_repeat() {
        let router = InputRouter::new();
        assert_eq!(
            router.route(&InputEvent::key_pressed(KeyCode::KeyL)),
            Some(Command::ToggleLighting)
        );
        assert_eq!(router.route(&repeat(KeyCode::KeyL)), None);
    }

    #[test]
    fn test_escape_and_close_quit() {
        let router = InputRouter::new();
        assert_eq!(
            router.route(&InputEvent::key_pressed(KeyCode::Escape)),
            Some(Command::Quit)
        );
        assert_eq!(router.route(&InputEvent::CloseRequested), Some(Command::Quit));
    }

    #[test]
    fn test_left_button_drives_drag() {
        let router = InputRouter::new();
        let press = InputEvent::PointerButton {
            button: MouseButton::Left,
            state: ElementState::Pressed,
        };
        let release = InputEvent::PointerButton {
            button: MouseButton::Left,
            state: ElementState::Released,
        };
        assert_eq!(router.route(&press), Some(Command::BeginDrag));
        assert_eq!(router.route(&release), Some(Command::EndDrag));
    }

    #[test]
    fn test_other_buttons_ignored() {
        let router = InputRouter::new();
        let press = InputEvent::PointerButton {
            button: MouseButton::Right,
            state: ElementState::Pressed,
        };
        assert_eq!(router.route(&press), None);
    }

    #[test]
    fn test_wheel_direction() {
        let router = InputRouter::new();
        assert_eq!(
            router.route(&InputEvent::Wheel { lines: 1.0 }),
            Some(Command::Zoom(ZoomDirection::In))
        );
        assert_eq!(
            router.route(&InputEvent::Wheel { lines: -0.5 }),
            Some(Command::Zoom(ZoomDirection::Out))
        );
        assert_eq!(router.route(&InputEvent::Wheel { lines: 0.0 }), None);
    }

    #[test]
    fn test_batch_order_is_preserved() {
        let router = InputRouter::new();
        let events = [
            InputEvent::key_pressed(KeyCode::ArrowLeft),
            InputEvent::PointerMoved { x: 3.0, y: 4.0 },
            InputEvent::key_released(KeyCode::ArrowLeft),
            InputEvent::Resized {
                width: 0,
                height: 0,
            },
        ];
        let commands: Vec<Command> = router.route_all(&events).collect();
        assert_eq!(
            commands,
            vec![
                Command::Rotate(ArrowKey::Left),
                Command::PointerMoved { x: 3.0, y: 4.0 },
                Command::Resize {
                    width: 0,
                    height: 0
                },
            ]
        );
    }
}
