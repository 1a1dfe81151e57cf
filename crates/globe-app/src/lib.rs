//! Globe viewer application.
//!
//! Ties the scene layers, camera and input routing together behind an
//! explicit frame loop, and exposes the blocking [`Session`] lifecycle a host
//! embeds.

pub mod clock;
pub mod platform;
pub mod render_loop;
pub mod scene;
pub mod session;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use render_loop::{FrameError, FrameHost, LoopSummary, RenderLoop, StopHandle};
pub use scene::{Scene, SceneAssets, SceneContent, SceneLayer, generate_content, load_scene_assets};
pub use session::{Session, SessionError, SessionSummary};
pub use window::{GpuHost, window_attributes_from_config, window_size};
