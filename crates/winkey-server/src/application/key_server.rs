//! KeyServer: drives one native helper session.
//!
//! The helper blocks every key transition until it gets an answer, so the
//! session loop handles one line at a time: decode, ask the listener, apply
//! the Windows-key correction, write the directive, then read the next line.
//!
//! # Architecture
//!
//! ```text
//! helper stdout ─▶ line reader ─▶ KeyEvent ─▶ listener ─▶ MetaCapture ─▶ Directive ─▶ helper stdin
//! ```
//!
//! The loop runs in its own Tokio task, which is the sole owner of the
//! session state, so no locking is involved on the event path.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use winkey_core::{decode_event_line, try_decode_event_line, Directive, KeyEvent, MetaCapture};

use crate::infrastructure::helper::{HelperError, KeyHelper};

/// Per-server options for the Windows backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsConfig {
    /// Swallow a Windows-key release when its press (or a key pressed while
    /// it was held) was swallowed.
    pub capture_windows_key_up: bool,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            capture_windows_key_up: true,
        }
    }
}

/// Error type for the key server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Helper(#[from] HelperError),
    #[error("key server is already running")]
    AlreadyRunning,
    #[error("key helper exited unexpectedly")]
    HelperExited,
    #[error("I/O error talking to the key helper: {0}")]
    Io(#[from] io::Error),
    #[error("key server session task failed: {0}")]
    Task(String),
}

/// Receives every key event and decides whether to swallow it.
///
/// Returning `true` stops the key from reaching the rest of the system. Any
/// `Fn(&KeyEvent) -> bool` closure is a listener.
#[cfg_attr(test, mockall::automock)]
pub trait KeyListener: Send + Sync {
    fn on_key(&self, event: &KeyEvent) -> bool;
}

impl<F> KeyListener for F
where
    F: Fn(&KeyEvent) -> bool + Send + Sync,
{
    fn on_key(&self, event: &KeyEvent) -> bool {
        self(event)
    }
}

struct RunningSession {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), ServerError>>,
}

/// Facade over the helper process and its session loop.
pub struct KeyServer<H: KeyHelper> {
    helper: H,
    listener: Arc<dyn KeyListener>,
    config: WindowsConfig,
    session: Option<RunningSession>,
}

impl<H: KeyHelper> KeyServer<H> {
    /// Creates a stopped server.
    pub fn new(helper: H, listener: impl KeyListener + 'static, config: WindowsConfig) -> Self {
        Self::with_shared_listener(helper, Arc::new(listener), config)
    }

    /// Creates a stopped server around a listener the caller keeps a handle to.
    pub fn with_shared_listener(
        helper: H,
        listener: Arc<dyn KeyListener>,
        config: WindowsConfig,
    ) -> Self {
        Self {
            helper,
            listener,
            config,
            session: None,
        }
    }

    /// Returns `true` while a session is active.
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
    }

    /// Spawns the helper and starts delivering its events to the listener.
    ///
    /// Must be called from within a Tokio runtime. A server whose previous
    /// session ended (stopped, or helper exited) may be started again; the
    /// new session starts with fresh Windows-key state.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] if a session is active, and
    /// [`ServerError::Helper`] if the helper cannot be spawned.
    pub fn start(&mut self) -> Result<(), ServerError> {
        if self.is_running() {
            return Err(ServerError::AlreadyRunning);
        }
        if self.session.take().is_some() {
            // Previous session ended on its own; make sure the process is gone.
            self.helper.kill();
        }

        let streams = self.helper.spawn()?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_session(
            streams.events,
            streams.directives,
            Arc::clone(&self.listener),
            self.config,
            shutdown_rx,
        ));

        info!(
            capture_windows_key_up = self.config.capture_windows_key_up,
            "key server started"
        );
        self.session = Some(RunningSession { shutdown, task });
        Ok(())
    }

    /// Stops the session and terminates the helper.
    ///
    /// Once this returns, the listener is not called again. Calling `stop` on
    /// a server that was never started, or twice, does nothing.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        // Fails only if the session already ended and dropped its receiver.
        let _ = session.shutdown.send(true);
        self.helper.kill();

        match session.task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("key server session ended before stop: {e}"),
            Err(e) => error!("key server session task failed: {e}"),
        }
        info!("key server stopped");
    }

    /// Waits until the current session ends on its own.
    ///
    /// Returns `Ok(())` immediately when no session is active.
    ///
    /// # Errors
    ///
    /// [`ServerError::HelperExited`] when the helper closed its output,
    /// [`ServerError::Io`] on a pipe error, [`ServerError::Task`] if the
    /// session task was aborted.
    pub async fn wait(&mut self) -> Result<(), ServerError> {
        let result = match self.session.as_mut() {
            Some(session) => (&mut session.task).await,
            None => return Ok(()),
        };
        self.session = None;
        self.helper.kill();

        result.map_err(|e| ServerError::Task(e.to_string()))?
    }
}

impl<H: KeyHelper> Drop for KeyServer<H> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.shutdown.send(true);
            session.task.abort();
        }
        self.helper.kill();
    }
}

// ── Session loop ──────────────────────────────────────────────────────────────

/// Reads helper lines until shutdown or EOF, answering each one.
///
/// Lines are reassembled across reads, so an event split over two chunks is
/// handled once and two events in one chunk are answered separately. Bytes
/// that are not UTF-8 are replaced rather than rejected, so every non-blank
/// line still gets a directive.
pub(crate) async fn run_session<R, W>(
    events: R,
    mut directives: W,
    listener: Arc<dyn KeyListener>,
    config: WindowsConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(events);
    let mut buf = Vec::new();
    let mut meta = config.capture_windows_key_up.then(MetaCapture::new);

    loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                debug!("key server session received shutdown");
                return Ok(());
            }
            read = reader.read_until(b'\n', &mut buf) => read?,
        };

        if read == 0 {
            error!("key helper closed its output");
            return Err(ServerError::HelperExited);
        }

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }

        let directive = dispatch_line(&line, listener.as_ref(), meta.as_mut());
        directives.write_all(directive.as_bytes()).await?;
        directives.flush().await?;
    }
}

/// Turns one helper line into the directive to send back.
fn dispatch_line(
    line: &str,
    listener: &dyn KeyListener,
    meta: Option<&mut MetaCapture>,
) -> Directive {
    let event = match try_decode_event_line(line) {
        Ok(event) => event,
        Err(err) => {
            warn!(%err, line, "malformed key helper line");
            decode_event_line(line)
        }
    };

    let mut stop = match panic::catch_unwind(AssertUnwindSafe(|| listener.on_key(&event))) {
        Ok(stop) => stop,
        Err(_) => {
            error!(raw = %event.raw, "key listener panicked; treating as propagate");
            false
        }
    };
    if let Some(meta) = meta {
        stop = meta.resolve(&event, stop);
    }

    debug!(
        vk_code = ?event.vk_code,
        name = ?event.name,
        state = %event.state,
        stop,
        "key event"
    );
    Directive::from_stop_propagation(stop)
}
