//! Session lifecycle exposed to an embedding host.
//!
//! [`Session::start`] blocks the calling thread until the frame loop exits.
//! A [`StopHandle`] taken beforehand can end the session from any other
//! thread, and the optional closed callback runs exactly once when the
//! session is over, whether it ended normally or failed.

use std::path::Path;

use globe_config::Config;
use globe_render::{FallbackEvent, RenderContextError, TextureError};
use tracing::{error, info, instrument};

use crate::clock::{Clock, SystemClock};
use crate::render_loop::{FrameError, FrameHost, RenderLoop, StopHandle};
use crate::window::GpuHost;

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("failed to create window: {0}")]
    Window(winit::error::OsError),

    #[error("the platform never provided a window")]
    NoWindow,

    #[error("texture upload failed: {0}")]
    Texture(#[from] TextureError),

    #[error("frame failed: {0}")]
    Frame(#[from] FrameError),
}

/// Outcome of a session that ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub textures_released: usize,
    /// Asset files replaced by generated content.
    pub fallback_events: Vec<FallbackEvent>,
}

type ClosedCallback = Box<dyn FnOnce() + Send + 'static>;

pub struct Session {
    config: Config,
    running: StopHandle,
    on_closed: Option<ClosedCallback>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            running: StopHandle::new(),
            on_closed: None,
        }
    }

    /// Run `callback` once the session has shut down.
    pub fn on_closed(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_closed = Some(Box::new(callback));
        self
    }

    /// Handle for requesting shutdown from another thread. Stopping an
    /// already finished session does nothing.
    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    /// Open the window, load the scene from `content_dir` and run until the
    /// user quits, a stop is requested, or a frame fails.
    #[instrument(skip_all, fields(content_dir = %content_dir.display()))]
    pub fn start(self, content_dir: &Path) -> Result<SessionSummary, SessionError> {
        info!("Session starting");
        match GpuHost::open(&self.config, content_dir) {
            Ok(mut host) => self.run_with_host(&mut host, SystemClock::new()),
            Err(e) => {
                error!("Session could not start: {e}");
                self.finish(Err(e))
            }
        }
    }

    /// Run the frame loop against an already opened host.
    pub fn run_with_host<H: FrameHost, C: Clock>(
        self,
        host: &mut H,
        clock: C,
    ) -> Result<SessionSummary, SessionError> {
        let mut render_loop = RenderLoop::new(&self.config, host.size(), clock, self.stop_handle());
        let result = render_loop
            .run(host)
            .map(|summary| SessionSummary {
                frames: summary.frames,
                textures_released: summary.textures_released,
                fallback_events: host.fallback_events().to_vec(),
            })
            .map_err(SessionError::from);
        self.finish(result)
    }

    fn finish(
        mut self,
        result: Result<SessionSummary, SessionError>,
    ) -> Result<SessionSummary, SessionError> {
        self.running.stop();
        match &result {
            Ok(summary) => info!(
                frames = summary.frames,
                fallbacks = summary.fallback_events.len(),
                "Session closed"
            ),
            Err(e) => error!("Session closed with error: {e}"),
        }
        if let Some(callback) = self.on_closed.take() {
            callback();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::render_loop::tests::ScriptedHost;
    use globe_input::InputEvent;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use winit::keyboard::KeyCode;

    fn counting_session() -> (Session, Arc<AtomicUsize>) {
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = closed.clone();
        let session = Session::new(Config::default()).on_closed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (session, closed)
    }

    #[test]
    fn test_escape_closes_session_and_notifies_once() {
        let (session, closed) = counting_session();
        let handle = session.stop_handle();
        let mut host = ScriptedHost::new(vec![
            vec![],
            vec![InputEvent::key_pressed(KeyCode::Escape)],
        ]);
        let summary = session.run_with_host(&mut host, ManualClock::new()).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.textures_released, 3);
        assert!(summary.fallback_events.is_empty());
        assert_eq!(host.release_calls, 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(!handle.is_running());
    }

    #[test]
    fn test_stop_after_exit_is_harmless() {
        let (session, closed) = counting_session();
        let handle = session.stop_handle();
        let mut host = ScriptedHost::new(vec![vec![InputEvent::CloseRequested]]);
        session.run_with_host(&mut host, ManualClock::new()).unwrap();

        assert!(!handle.stop());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(host.release_calls, 1);
    }

    #[test]
    fn test_stop_before_start_draws_nothing() {
        let (session, closed) = counting_session();
        assert!(session.stop_handle().stop());
        let mut host = ScriptedHost::default();
        let summary = session.run_with_host(&mut host, ManualClock::new()).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(host.release_calls, 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_from_another_thread() {
        let (session, closed) = counting_session();
        let handle = session.stop_handle();
        let mut host = ScriptedHost::new(vec![vec![]; 3]);
        let stopper = std::thread::spawn(move || handle.stop());
        stopper.join().unwrap();
        let summary = session.run_with_host(&mut host, ManualClock::new()).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_frame_failure_still_notifies_and_releases() {
        let (session, closed) = counting_session();
        let mut host = ScriptedHost {
            fail_on_frame: Some(0),
            textures: 2,
            ..Default::default()
        };
        let err = session
            .run_with_host(&mut host, ManualClock::new())
            .unwrap_err();
        assert!(matches!(err, SessionError::Frame(_)));
        assert_eq!(host.release_calls, 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_without_callback_runs() {
        let session = Session::new(Config::default());
        let mut host = ScriptedHost::new(vec![vec![InputEvent::key_pressed(KeyCode::Escape)]]);
        let summary = session.run_with_host(&mut host, ManualClock::new()).unwrap();
        assert_eq!(summary.frames, 1);
    }
}
