//! Window input for the globe viewer: platform-neutral [`InputEvent`]s built
//! from winit events, and the [`InputRouter`] that maps them to [`Command`]s.

pub mod event;
pub mod router;

pub use event::{InputEvent, RawKeyEvent, wheel_lines};
pub use router::{ArrowKey, Command, InputRouter, ZoomDirection};
