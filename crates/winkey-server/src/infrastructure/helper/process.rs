//! Helper backed by the native `WinKeyServer.exe` process.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::{HelperError, HelperStreams, KeyHelper};

/// Location of the helper relative to the directory of the running executable.
pub const DEFAULT_HELPER_RELATIVE_PATH: &str = "bin/WinKeyServer.exe";

/// Resolves the default helper path next to the current executable.
///
/// # Errors
///
/// Returns [`HelperError::NotFound`] if the current executable path cannot be
/// determined.
pub fn default_helper_path() -> Result<PathBuf, HelperError> {
    let exe = std::env::current_exe().map_err(|e| HelperError::NotFound(e.to_string()))?;
    let dir = exe
        .parent()
        .ok_or_else(|| HelperError::NotFound(format!("{} has no parent directory", exe.display())))?;
    Ok(dir.join(DEFAULT_HELPER_RELATIVE_PATH))
}

/// Spawns and owns the native helper process.
pub struct NativeHelper {
    path: PathBuf,
    child: Option<Child>,
}

impl NativeHelper {
    /// Creates an (unstarted) helper for the executable at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            child: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// OS process id of the running helper, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }
}

impl KeyHelper for NativeHelper {
    fn spawn(&mut self) -> Result<HelperStreams, HelperError> {
        // Both pipes are used; stderr is left attached to ours so helper
        // diagnostics stay visible.
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HelperError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(HelperError::MissingPipe("stdout"))?;
        let stdin = child.stdin.take().ok_or(HelperError::MissingPipe("stdin"))?;

        info!(path = %self.path.display(), pid = ?child.id(), "key helper started");
        self.child = Some(child);

        Ok(HelperStreams {
            events: Box::new(stdout),
            directives: Box::new(stdin),
        })
    }

    fn kill(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        match child.start_kill() {
            Ok(()) => debug!(pid = ?child.id(), "key helper killed"),
            Err(e) => warn!("failed to kill key helper: {e}"),
        }
    }
}

impl Drop for NativeHelper {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_helper_path_ends_with_helper_exe() {
        let path = default_helper_path().expect("current_exe is available in tests");
        assert!(path.ends_with("bin/WinKeyServer.exe"), "got {path:?}");
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_returns_spawn_error() {
        // Arrange
        let mut helper = NativeHelper::new("/nonexistent/dir/WinKeyServer.exe");

        // Act
        let result = helper.spawn();

        // Assert
        assert!(matches!(result, Err(HelperError::Spawn { .. })));
        assert_eq!(helper.pid(), None);
    }

    #[test]
    fn test_kill_without_spawn_is_a_no_op() {
        let mut helper = NativeHelper::new("WinKeyServer.exe");
        helper.kill();
        helper.kill();
        assert_eq!(helper.path(), Path::new("WinKeyServer.exe"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawned_process_echoes_through_pipes() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        // `cat` stands in for the helper: whatever we write comes back.
        let mut helper = NativeHelper::new("cat");
        let streams = helper.spawn().expect("cat must spawn");
        assert!(helper.pid().is_some());

        let mut directives = streams.directives;
        directives.write_all(b"65,DOWN,30\n").await.unwrap();
        directives.flush().await.unwrap();

        let mut lines = BufReader::new(streams.events).lines();
        let line = lines.next_line().await.unwrap();
        assert_eq!(line.as_deref(), Some("65,DOWN,30"));

        helper.kill();
        assert_eq!(helper.pid(), None);
    }
}
