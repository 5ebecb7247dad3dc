//! Mock helper for unit and integration testing.
//!
//! Speaks the helper protocol over in-memory pipes so tests can inject event
//! lines and read back directives without a Windows machine or a native
//! executable.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use winkey_core::Directive;

use super::{HelperError, HelperStreams, KeyHelper};

const PIPE_CAPACITY: usize = 4096;

fn lock(shared: &Mutex<MockShared>) -> MutexGuard<'_, MockShared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct MockShared {
    pending: Option<MockHelperIo>,
    spawn_count: usize,
    kill_count: usize,
}

/// A [`KeyHelper`] whose "process" is a pair of in-memory pipes.
pub struct MockHelper {
    shared: Arc<Mutex<MockShared>>,
    fail_spawn: bool,
}

/// Test-side view of a [`MockHelper`]: counters and the far ends of the pipes.
#[derive(Clone)]
pub struct MockHelperHandle {
    shared: Arc<Mutex<MockShared>>,
}

/// The helper's side of one spawned session.
pub struct MockHelperIo {
    events: Option<DuplexStream>,
    directives: Lines<BufReader<DuplexStream>>,
}

impl MockHelper {
    /// Creates a mock helper and the handle tests use to drive it.
    pub fn new() -> (Self, MockHelperHandle) {
        let shared = Arc::new(Mutex::new(MockShared::default()));
        let helper = Self {
            shared: Arc::clone(&shared),
            fail_spawn: false,
        };
        (helper, MockHelperHandle { shared })
    }

    /// Creates a mock helper whose `spawn` always fails, as if the
    /// executable were missing.
    pub fn failing() -> (Self, MockHelperHandle) {
        let (mut helper, handle) = Self::new();
        helper.fail_spawn = true;
        (helper, handle)
    }
}

impl KeyHelper for MockHelper {
    fn spawn(&mut self) -> Result<HelperStreams, HelperError> {
        let mut shared = lock(&self.shared);
        shared.spawn_count += 1;

        if self.fail_spawn {
            return Err(HelperError::Spawn {
                path: "mock://WinKeyServer.exe".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock helper configured to fail"),
            });
        }

        let (host_events, helper_events) = tokio::io::duplex(PIPE_CAPACITY);
        let (host_directives, helper_directives) = tokio::io::duplex(PIPE_CAPACITY);

        shared.pending = Some(MockHelperIo {
            events: Some(helper_events),
            directives: BufReader::new(helper_directives).lines(),
        });

        Ok(HelperStreams {
            events: Box::new(host_events),
            directives: Box::new(host_directives),
        })
    }

    fn kill(&mut self) {
        let mut shared = lock(&self.shared);
        shared.kill_count += 1;
        shared.pending = None;
    }
}

impl MockHelperHandle {
    /// Takes the helper side of the most recent spawn.
    ///
    /// Returns `None` if nothing was spawned, if it was already taken, or if
    /// the helper was killed before the test picked it up.
    pub fn take_io(&self) -> Option<MockHelperIo> {
        lock(&self.shared).pending.take()
    }

    /// Number of times `spawn` was called.
    pub fn spawn_count(&self) -> usize {
        lock(&self.shared).spawn_count
    }

    /// Number of times `kill` was called.
    pub fn kill_count(&self) -> usize {
        lock(&self.shared).kill_count
    }
}

impl MockHelperIo {
    /// Writes `line` plus a newline to the host, as the helper does for each
    /// key transition.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.send_raw(format!("{line}\n").as_bytes()).await
    }

    /// Writes raw bytes to the host, e.g. half a line.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        let events = self
            .events
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "helper output closed"))?;
        events.write_all(bytes).await?;
        events.flush().await
    }

    /// Reads the next directive the host wrote back.
    ///
    /// Returns `None` once the host closes the pipe, or if the host wrote
    /// something other than a directive.
    pub async fn next_directive(&mut self) -> Option<Directive> {
        let line = self.directives.next_line().await.ok()??;
        line.parse().ok()
    }

    /// Closes the helper's stdout, as if the process had crashed.
    pub fn close_output(&mut self) {
        self.events = None;
    }
}
