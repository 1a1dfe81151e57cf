//! winit window host.
//!
//! [`GpuHost`] owns the event loop, window, GPU context, texture store and
//! scene. The frame loop drives it through [`FrameHost`]: each poll pumps
//! pending window events with a zero timeout instead of handing control to
//! `run_app`, which keeps the loop explicit and lets the session run on any
//! thread the platform allows.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use globe_config::{Config, WindowConfig};
use globe_input::InputEvent;
use globe_render::{
    FallbackEvent, FrameState, RenderContext, TextureStore, WgpuTextureUploader,
    init_render_context_blocking,
};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize, Size};
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::render_loop::{FrameError, FrameHost};
use crate::scene::{Scene, generate_content, load_scene_assets};
use crate::session::SessionError;

/// How long to wait for the platform to deliver `resumed` and a window.
const WINDOW_WAIT_ATTEMPTS: u32 = 200;
const WINDOW_WAIT_STEP: Duration = Duration::from_millis(10);

/// Initial inner size: the monitor size minus the margin when fitting to the
/// monitor (and one is known), otherwise the configured logical size.
pub fn window_size(config: &WindowConfig, monitor: Option<PhysicalSize<u32>>) -> Size {
    match monitor {
        Some(monitor) if config.fit_to_monitor => Size::Physical(PhysicalSize::new(
            monitor.width.saturating_sub(config.monitor_margin).max(1),
            monitor.height.saturating_sub(config.monitor_margin).max(1),
        )),
        _ => Size::Logical(LogicalSize::new(
            config.width.max(1) as f64,
            config.height.max(1) as f64,
        )),
    }
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(
    config: &WindowConfig,
    monitor: Option<PhysicalSize<u32>>,
) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(window_size(config, monitor))
        .with_resizable(config.resizable);
    if config.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Collects window events between pumps and creates the window on `resumed`.
struct HostApp {
    config: WindowConfig,
    window: Option<Arc<Window>>,
    pending: Vec<InputEvent>,
    error: Option<OsError>,
}

impl HostApp {
    fn new(config: WindowConfig) -> Self {
        Self {
            config,
            window: None,
            pending: Vec::new(),
            error: None,
        }
    }
}

impl ApplicationHandler for HostApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let monitor = event_loop.primary_monitor().map(|m| m.size());
        let attributes = window_attributes_from_config(&self.config, monitor);
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    "Window created: {}x{} (scale: {:.2})",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                error!("Failed to create window: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(input) = InputEvent::from_window_event(&event) {
            self.pending.push(input);
        }
    }
}

fn build_event_loop() -> Result<EventLoop<()>, SessionError> {
    #[allow(unused_mut)]
    let mut builder = EventLoop::builder();
    #[cfg(target_os = "linux")]
    winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    #[cfg(target_os = "windows")]
    winit::platform::windows::EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);
    Ok(builder.build()?)
}

/// The real window, GPU and scene behind the frame loop.
///
/// Fields drop in declaration order: GPU resources, then the surface, then
/// the window, and the event loop (the display connection) last.
pub struct GpuHost {
    scene: Scene,
    store: TextureStore<WgpuTextureUploader>,
    gpu: RenderContext,
    window: Arc<Window>,
    app: HostApp,
    event_loop: EventLoop<()>,
}

impl GpuHost {
    /// Open the window, initialise the GPU, load textures from
    /// `content_dir` and build the scene.
    pub fn open(config: &Config, content_dir: &Path) -> Result<Self, SessionError> {
        let mut event_loop = build_event_loop()?;
        let mut app = HostApp::new(config.window.clone());

        for _ in 0..WINDOW_WAIT_ATTEMPTS {
            let status = event_loop.pump_app_events(Some(WINDOW_WAIT_STEP), &mut app);
            if app.window.is_some() || app.error.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                warn!(code, "Event loop exited before a window was created");
                break;
            }
        }
        if let Some(e) = app.error.take() {
            return Err(SessionError::Window(e));
        }
        let window = app.window.clone().ok_or(SessionError::NoWindow)?;

        let gpu = init_render_context_blocking(window.clone(), config.window.vsync)?;
        let mut store = TextureStore::new(WgpuTextureUploader::new(&gpu.device, &gpu.queue));
        let assets = match load_scene_assets(&mut store, content_dir, &config.assets, &config.scene)
        {
            Ok(assets) => assets,
            Err(e) => {
                store.release_all();
                return Err(e.into());
            }
        };
        let content = generate_content(&config.scene);
        let scene = Scene::new(
            &gpu.device,
            gpu.surface_format,
            gpu.size(),
            &store,
            &assets,
            &content,
            config,
        );
        info!(clouds = ?scene.cloud_mode(), "Scene ready");

        Ok(Self {
            scene,
            store,
            gpu,
            window,
            app,
            event_loop,
        })
    }
}

impl FrameHost for GpuHost {
    fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app);
        events.append(&mut self.app.pending);
        if let PumpStatus::Exit(_) = status {
            events.push(InputEvent::CloseRequested);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.scene.resize(&self.gpu.device, width, height);
    }

    fn draw(&mut self, frame: &FrameState) -> Result<(), FrameError> {
        let surface_texture = match self.gpu.get_current_texture() {
            Ok(texture) => texture,
            Err(e) if e.is_recoverable() => {
                warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        self.window.pre_present_notify();
        self.scene
            .draw(&self.gpu.device, &self.gpu.queue, surface_texture, frame);
        Ok(())
    }

    fn release(&mut self) -> usize {
        self.store.release_all()
    }

    fn fallback_events(&self) -> &[FallbackEvent] {
        self.store.fallback_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_monitor_subtracts_margin() {
        let config = WindowConfig::default();
        assert!(config.fit_to_monitor);
        let size = window_size(&config, Some(PhysicalSize::new(1920, 1080)));
        assert_eq!(size, Size::Physical(PhysicalSize::new(1820, 980)));
    }

    #[test]
    fn test_without_monitor_uses_configured_size() {
        let config = WindowConfig::default();
        let size = window_size(&config, None);
        assert_eq!(size, Size::Logical(LogicalSize::new(1280.0, 720.0)));
    }

    #[test]
    fn test_explicit_size_ignores_monitor() {
        let config = WindowConfig {
            fit_to_monitor: false,
            width: 1024,
            height: 768,
            ..WindowConfig::default()
        };
        let size = window_size(&config, Some(PhysicalSize::new(3840, 2160)));
        assert_eq!(size, Size::Logical(LogicalSize::new(1024.0, 768.0)));
    }

    #[test]
    fn test_tiny_monitor_never_yields_zero() {
        let config = WindowConfig::default();
        let size = window_size(&config, Some(PhysicalSize::new(50, 50)));
        assert_eq!(size, Size::Physical(PhysicalSize::new(1, 1)));
    }

    #[test]
    fn test_window_attributes_build() {
        let config = WindowConfig {
            fullscreen: true,
            ..WindowConfig::default()
        };
        // WindowAttributes has no getters worth asserting on; building must not panic.
        let _attributes = window_attributes_from_config(&config, None);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_host_opens_and_tears_down() {
        let has_display = ["DISPLAY", "WAYLAND_DISPLAY"]
            .iter()
            .any(|var| std::env::var_os(var).is_some());
        if !has_display {
            return;
        }
        let content = tempfile::tempdir().unwrap();
        let config = Config {
            window: WindowConfig {
                fit_to_monitor: false,
                width: 320,
                height: 240,
                ..WindowConfig::default()
            },
            ..Config::default()
        };
        let Ok(mut host) = GpuHost::open(&config, content.path()) else {
            return;
        };
        assert_eq!(host.fallback_events().len(), 3);
        assert_eq!(host.release(), 2);
        assert_eq!(host.release(), 0);
        drop(host);
    }
}
