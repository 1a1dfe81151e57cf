//! Orbit camera: quaternion orientation of the viewed body, bounded zoom, and
//! the pointer drag state machine.

pub mod orbit;

pub use orbit::{DragState, OrbitCamera, OrbitSettings};
