//! The explicit, single-threaded frame loop.
//!
//! Each iteration polls the host for input, applies every event in arrival
//! order, draws one frame from an explicit [`FrameState`] and then sleeps for
//! the pacing interval. The loop checks its running flag only at the top of
//! an iteration, so a quit request always lets the current frame finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glam::Quat;
use globe_camera::{OrbitCamera, OrbitSettings};
use globe_config::{CameraConfig, Config};
use globe_input::{Command, InputEvent, InputRouter};
use globe_render::{Camera, FallbackEvent, FrameState, SurfaceError};
use tracing::{debug, error, info, instrument};

use crate::clock::Clock;

/// A failure while producing a frame. Always fatal for the session.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// The window side of the loop: input, surface size, drawing and teardown.
pub trait FrameHost {
    /// Append every pending input event, oldest first.
    fn poll_events(&mut self, events: &mut Vec<InputEvent>);

    /// Current surface size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the drawing surface. Both dimensions are at least 1.
    fn resize(&mut self, width: u32, height: u32);

    fn draw(&mut self, frame: &FrameState) -> Result<(), FrameError>;

    /// Release every texture the host owns; returns how many were released.
    fn release(&mut self) -> usize;

    /// Asset files the host replaced with generated content while loading.
    fn fallback_events(&self) -> &[FallbackEvent] {
        &[]
    }
}

/// Shared running flag. Clones refer to the same flag and may be moved to
/// other threads; [`stop`](Self::stop) only ever clears it.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Request shutdown. Returns `true` if this call cleared the flag; later
    /// calls are no-ops.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// What a finished loop reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub textures_released: usize,
}

/// Camera controller tunables from the `camera` config section.
pub fn orbit_settings(config: &CameraConfig) -> OrbitSettings {
    OrbitSettings {
        min_zoom: config.min_zoom,
        max_zoom: config.max_zoom,
        drag_sensitivity: config.drag_degrees_per_pixel.to_radians(),
        key_step: config.key_step_degrees.to_radians(),
        zoom_in_factor: config.zoom_in_factor,
        zoom_out_factor: config.zoom_out_factor,
    }
}

pub struct RenderLoop<C: Clock> {
    camera: OrbitCamera,
    projection: Camera,
    router: InputRouter,
    clock: C,
    running: StopHandle,
    lighting_enabled: bool,
    frame_interval: Duration,
    viewport: (u32, u32),
    frames: u64,
    events: Vec<InputEvent>,
    started: Duration,
}

impl<C: Clock> RenderLoop<C> {
    /// `viewport` is the initial surface size; `running` is the flag that
    /// ends the loop once cleared.
    pub fn new(config: &Config, viewport: (u32, u32), clock: C, running: StopHandle) -> Self {
        let mut projection = Camera::new(
            config.camera.fov_y_degrees,
            config.camera.near,
            config.camera.far,
            config.camera.distance,
        );
        projection.set_aspect_ratio(viewport.0, viewport.1);
        let started = clock.now();

        Self {
            camera: OrbitCamera::new(orbit_settings(&config.camera)),
            projection,
            router: InputRouter::new(),
            clock,
            running,
            lighting_enabled: config.scene.lighting_enabled,
            frame_interval: Duration::from_millis(config.render.frame_interval_ms),
            viewport: (viewport.0.max(1), viewport.1.max(1)),
            frames: 0,
            events: Vec::new(),
            started,
        }
    }

    pub fn orientation(&self) -> Quat {
        self.camera.orientation()
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.projection.aspect_ratio()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn lighting_enabled(&self) -> bool {
        self.lighting_enabled
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    /// Route one event and apply its command immediately.
    pub fn apply_event<H: FrameHost>(&mut self, event: &InputEvent, host: &mut H) {
        let Some(command) = self.router.route(event) else {
            return;
        };
        if self.camera.apply(&command) {
            return;
        }
        match command {
            Command::ToggleLighting => {
                self.lighting_enabled = !self.lighting_enabled;
                info!(enabled = self.lighting_enabled, "Lighting toggled");
            }
            Command::Resize { width, height } => {
                self.projection.set_aspect_ratio(width, height);
                self.viewport = (width.max(1), height.max(1));
                host.resize(self.viewport.0, self.viewport.1);
                debug!(width, height, aspect = self.projection.aspect_ratio(), "Viewport resized");
            }
            Command::Quit => {
                if self.running.stop() {
                    info!(frame = self.frames, "Quit requested");
                }
            }
            _ => {}
        }
    }

    /// The state every layer draws this frame from.
    pub fn frame_state(&self) -> FrameState {
        let elapsed = self.clock.now().saturating_sub(self.started);
        FrameState::new(
            &self.projection,
            self.camera.orientation(),
            self.camera.zoom(),
            elapsed.as_secs_f32(),
            self.lighting_enabled,
            self.viewport,
        )
    }

    /// One full iteration: input, draw, pacing sleep.
    pub fn step<H: FrameHost>(&mut self, host: &mut H) -> Result<(), FrameError> {
        let mut events = std::mem::take(&mut self.events);
        events.clear();
        host.poll_events(&mut events);
        for event in &events {
            self.apply_event(event, host);
        }
        self.events = events;

        let frame = self.frame_state();
        host.draw(&frame)?;
        self.frames += 1;

        self.clock.sleep(self.frame_interval);
        Ok(())
    }

    /// Run until the running flag clears or a frame fails, then release the
    /// host's textures. The release happens exactly once on every path.
    #[instrument(skip_all)]
    pub fn run<H: FrameHost>(&mut self, host: &mut H) -> Result<LoopSummary, FrameError> {
        info!(viewport = ?self.viewport, "Frame loop started");
        let outcome = loop {
            if !self.running.is_running() {
                break Ok(());
            }
            if let Err(e) = self.step(host) {
                error!(frame = self.frames, "Frame failed, ending session: {e}");
                self.running.stop();
                break Err(e);
            }
        };

        let textures_released = host.release();
        info!(frames = self.frames, textures_released, "Frame loop finished");
        outcome.map(|()| LoopSummary {
            frames: self.frames,
            textures_released,
        })
    }
}
