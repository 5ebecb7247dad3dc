//! Native hook helper infrastructure.
//!
//! The Windows low-level keyboard hook runs in a separate executable
//! (`WinKeyServer.exe`). It writes one line per key transition on stdout and
//! waits for a one-line directive on stdin before letting the key continue.
//!
//! # Testability
//!
//! The [`KeyHelper`] trait lets unit and integration tests swap the real
//! process for [`mock::MockHelper`], which speaks the same protocol over
//! in-memory pipes.

use std::io;
use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncWrite};

pub mod mock;
pub mod process;

pub use process::{default_helper_path, NativeHelper, DEFAULT_HELPER_RELATIVE_PATH};

/// Error type for helper lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    #[error("failed to spawn key helper {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("key helper did not provide a {0} pipe")]
    MissingPipe(&'static str),
    #[error("could not locate the key helper executable: {0}")]
    NotFound(String),
}

/// The two pipes connecting the host to a running helper.
pub struct HelperStreams {
    /// The helper's stdout: event lines.
    pub events: Box<dyn AsyncRead + Send + Unpin>,
    /// The helper's stdin: directive lines.
    pub directives: Box<dyn AsyncWrite + Send + Unpin>,
}

/// Trait abstracting the helper process.
///
/// The production implementation spawns the native executable; tests use
/// [`mock::MockHelper`].
pub trait KeyHelper: Send {
    /// Starts the helper and returns its pipes.
    fn spawn(&mut self) -> Result<HelperStreams, HelperError>;
    /// Terminates the helper. Must be safe to call when nothing is running.
    fn kill(&mut self);
}
