//! Multi-handler keyboard listener built on top of [`KeyServer`].
//!
//! Handlers are registered and removed at any time. The key server is started
//! lazily when the first handler is added and stopped when the last one is
//! removed, so an idle listener holds no helper process.
//!
//! For every event the dispatcher first updates [`KeyStates`], then calls the
//! handlers in registration order. The key is suppressed if any handler asks
//! for it; a handler can also cut the chain short with
//! `stop_immediate_propagation`.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};
use winkey_core::{KeyEvent, StandardKey};

use super::key_server::{KeyListener, KeyServer, ServerError, WindowsConfig};
use crate::infrastructure::helper::KeyHelper;

/// Identifies a registered handler for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A handler's verdict on one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Keep the key from reaching the rest of the system.
    pub stop_propagation: bool,
    /// Skip the handlers registered after this one.
    pub stop_immediate_propagation: bool,
}

impl Propagation {
    pub const PROPAGATE: Self = Self {
        stop_propagation: false,
        stop_immediate_propagation: false,
    };

    pub const STOP: Self = Self {
        stop_propagation: true,
        stop_immediate_propagation: false,
    };
}

impl From<bool> for Propagation {
    fn from(stop_propagation: bool) -> Self {
        Self {
            stop_propagation,
            stop_immediate_propagation: false,
        }
    }
}

/// Which keys are currently held, as seen by this listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStates(HashMap<StandardKey, bool>);

impl KeyStates {
    /// Returns `true` if the last event seen for `key` was a press.
    pub fn is_down(&self, key: StandardKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    /// All keys currently held, in no particular order.
    pub fn pressed(&self) -> impl Iterator<Item = StandardKey> + '_ {
        self.0.iter().filter(|(_, down)| **down).map(|(key, _)| *key)
    }

    fn record(&mut self, event: &KeyEvent) {
        if let Some(name) = event.name {
            self.0.insert(name, event.is_down());
        }
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// Receives events from a [`GlobalKeyboardListener`].
///
/// Closures taking `(&KeyEvent, &KeyStates)` and returning `bool` or
/// [`Propagation`] implement this trait.
pub trait KeyHandler: Send + Sync {
    fn handle(&self, event: &KeyEvent, states: &KeyStates) -> Propagation;
}

impl<F, R> KeyHandler for F
where
    F: Fn(&KeyEvent, &KeyStates) -> R + Send + Sync,
    R: Into<Propagation>,
{
    fn handle(&self, event: &KeyEvent, states: &KeyStates) -> Propagation {
        self(event, states).into()
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(ListenerId, Arc<dyn KeyHandler>)>,
    states: KeyStates,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The [`KeyListener`] the key server calls; fans out to the registry.
struct RegistryListener {
    registry: Arc<Mutex<Registry>>,
}

impl KeyListener for RegistryListener {
    fn on_key(&self, event: &KeyEvent) -> bool {
        // Snapshot under the lock, run handlers without it.
        let (handlers, states) = {
            let mut registry = lock(&self.registry);
            registry.states.record(event);
            let handlers: Vec<_> = registry.handlers.iter().map(|(_, h)| Arc::clone(h)).collect();
            (handlers, registry.states.clone())
        };
        dispatch(&handlers, event, &states)
    }
}

fn dispatch(handlers: &[Arc<dyn KeyHandler>], event: &KeyEvent, states: &KeyStates) -> bool {
    let mut stop = false;
    for handler in handlers {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event, states))) {
            Ok(verdict) => {
                stop |= verdict.stop_propagation;
                if verdict.stop_immediate_propagation {
                    break;
                }
            }
            Err(_) => {
                error!(raw = %event.raw, "key handler panicked; treating as propagate");
            }
        }
    }
    stop
}

/// Keyboard listener that multiplexes one helper session to many handlers.
pub struct GlobalKeyboardListener<H: KeyHelper> {
    server: KeyServer<H>,
    registry: Arc<Mutex<Registry>>,
}

impl<H: KeyHelper> GlobalKeyboardListener<H> {
    pub fn new(helper: H, config: WindowsConfig) -> Self {
        let registry = Arc::new(Mutex::new(Registry::default()));
        let listener = RegistryListener {
            registry: Arc::clone(&registry),
        };
        Self {
            server: KeyServer::new(helper, listener, config),
            registry,
        }
    }

    /// Registers `handler`, starting the key server if it is not running.
    ///
    /// This covers the first registration as well as a server whose helper
    /// exited while handlers were still registered. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Propagates the key server's start error. The handler is not kept in
    /// that case.
    pub fn add_listener(&mut self, handler: impl KeyHandler + 'static) -> Result<ListenerId, ServerError> {
        let id = {
            let mut registry = lock(&self.registry);
            registry.next_id += 1;
            let id = ListenerId(registry.next_id);
            registry.handlers.push((id, Arc::new(handler)));
            id
        };

        if !self.server.is_running() {
            // Held keys from a dead session are stale.
            lock(&self.registry).states.clear();
            if let Err(e) = self.server.start() {
                lock(&self.registry).handlers.retain(|(h, _)| *h != id);
                return Err(e);
            }
        }

        debug!(?id, "key handler added");
        Ok(id)
    }

    /// Unregisters a handler. Removing the last one stops the key server.
    ///
    /// Returns `false` if `id` was not registered.
    pub async fn remove_listener(&mut self, id: ListenerId) -> bool {
        let (removed, now_empty) = {
            let mut registry = lock(&self.registry);
            let before = registry.handlers.len();
            registry.handlers.retain(|(h, _)| *h != id);
            (registry.handlers.len() != before, registry.handlers.is_empty())
        };

        if removed {
            debug!(?id, "key handler removed");
            if now_empty {
                self.stop_server().await;
            }
        }
        removed
    }

    /// Removes every handler and stops the key server.
    pub async fn kill(&mut self) {
        lock(&self.registry).handlers.clear();
        self.stop_server().await;
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).handlers.len()
    }

    /// Snapshot of the keys currently held.
    pub fn key_states(&self) -> KeyStates {
        lock(&self.registry).states.clone()
    }

    pub fn is_running(&self) -> bool {
        self.server.is_running()
    }

    /// Waits for the helper session to end on its own.
    ///
    /// # Errors
    ///
    /// See [`KeyServer::wait`].
    pub async fn wait(&mut self) -> Result<(), ServerError> {
        self.server.wait().await
    }

    async fn stop_server(&mut self) {
        self.server.stop().await;
        // Releases made while stopped are never seen.
        lock(&self.registry).states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use winkey_core::{Directive, KeyState};

    use crate::infrastructure::helper::mock::{MockHelper, MockHelperHandle, MockHelperIo};

    fn listener() -> (GlobalKeyboardListener<MockHelper>, MockHelperHandle) {
        let (helper, handle) = MockHelper::new();
        (GlobalKeyboardListener::new(helper, WindowsConfig::default()), handle)
    }

    async fn exchange(io: &mut MockHelperIo, line: &str) -> Option<Directive> {
        io.send_line(line).await.expect("send line");
        io.next_directive().await
    }

    fn counting_handler(verdict: Propagation) -> (impl KeyHandler + 'static, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = move |_: &KeyEvent, _: &KeyStates| {
            counter.fetch_add(1, Ordering::SeqCst);
            verdict
        };
        (handler, calls)
    }

    // ── Propagation / KeyStates ───────────────────────────────────────────────

    #[test]
    fn test_propagation_from_bool() {
        assert_eq!(Propagation::from(true), Propagation::STOP);
        assert_eq!(Propagation::from(false), Propagation::PROPAGATE);
    }

    #[test]
    fn test_key_states_track_last_transition() {
        let mut states = KeyStates::default();

        states.record(&KeyEvent::new(Some(0x41), KeyState::Down, Some(30), "65,DOWN,30"));
        states.record(&KeyEvent::new(Some(0xA0), KeyState::Down, Some(42), "160,DOWN,42"));
        states.record(&KeyEvent::new(Some(0x41), KeyState::Up, Some(30), "65,UP,30"));

        assert!(!states.is_down(StandardKey::A));
        assert!(states.is_down(StandardKey::LeftShift));
        assert_eq!(states.pressed().collect::<Vec<_>>(), vec![StandardKey::LeftShift]);
    }

    #[test]
    fn test_key_states_ignore_unnamed_events() {
        let mut states = KeyStates::default();
        states.record(&KeyEvent::new(None, KeyState::Down, None, "garbage"));
        assert_eq!(states, KeyStates::default());
    }

    // ── dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_any_stop_suppresses_and_all_handlers_run() {
        let (first, first_calls) = counting_handler(Propagation::STOP);
        let (second, second_calls) = counting_handler(Propagation::PROPAGATE);
        let handlers: Vec<Arc<dyn KeyHandler>> = vec![Arc::new(first), Arc::new(second)];
        let event = KeyEvent::new(Some(0x41), KeyState::Down, Some(30), "65,DOWN,30");

        let stop = dispatch(&handlers, &event, &KeyStates::default());

        assert!(stop);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_stop_immediate_skips_later_handlers() {
        let (first, _) = counting_handler(Propagation {
            stop_propagation: false,
            stop_immediate_propagation: true,
        });
        let (second, second_calls) = counting_handler(Propagation::STOP);
        let handlers: Vec<Arc<dyn KeyHandler>> = vec![Arc::new(first), Arc::new(second)];
        let event = KeyEvent::new(Some(0x41), KeyState::Down, Some(30), "65,DOWN,30");

        let stop = dispatch(&handlers, &event, &KeyStates::default());

        assert!(!stop, "immediate stop alone does not suppress");
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_survives_panicking_handler() {
        let panicking = |_: &KeyEvent, _: &KeyStates| -> bool { panic!("handler bug") };
        let (after, after_calls) = counting_handler(Propagation::STOP);
        let handlers: Vec<Arc<dyn KeyHandler>> = vec![Arc::new(panicking), Arc::new(after)];
        let event = KeyEvent::new(Some(0x41), KeyState::Down, Some(30), "65,DOWN,30");

        let stop = dispatch(&handlers, &event, &KeyStates::default());

        assert!(stop);
        assert_eq!(after_calls.load(Ordering::SeqCst), 1);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_first_listener_starts_server_once() {
        // Arrange
        let (mut listener, handle) = listener();
        assert!(!listener.is_running());

        // Act
        listener.add_listener(|_: &KeyEvent, _: &KeyStates| false).unwrap();
        listener.add_listener(|_: &KeyEvent, _: &KeyStates| false).unwrap();

        // Assert
        assert!(listener.is_running());
        assert_eq!(handle.spawn_count(), 1);
        assert_eq!(listener.listener_count(), 2);
        listener.kill().await;
    }

    #[tokio::test]
    async fn test_removing_last_listener_stops_server() {
        let (mut listener, handle) = listener();
        let a = listener.add_listener(|_: &KeyEvent, _: &KeyStates| false).unwrap();
        let b = listener.add_listener(|_: &KeyEvent, _: &KeyStates| false).unwrap();

        assert!(listener.remove_listener(a).await);
        assert_eq!(handle.kill_count(), 0);
        assert!(listener.remove_listener(b).await);

        assert_eq!(handle.kill_count(), 1);
        assert!(!listener.is_running());
        assert!(!listener.remove_listener(b).await, "second removal is a no-op");
    }

    #[tokio::test]
    async fn test_add_listener_restarts_server_after_helper_crash() {
        // Arrange
        let (mut listener, handle) = listener();
        listener.add_listener(|_: &KeyEvent, _: &KeyStates| false).unwrap();
        let mut io = handle.take_io().unwrap();
        io.close_output();
        assert!(matches!(listener.wait().await, Err(ServerError::HelperExited)));
        assert!(!listener.is_running());

        // Act
        listener.add_listener(|_: &KeyEvent, _: &KeyStates| true).unwrap();

        // Assert
        assert!(listener.is_running());
        assert_eq!(handle.spawn_count(), 2);
        assert_eq!(listener.listener_count(), 2);
        let mut io = handle.take_io().expect("io for restarted session");
        assert_eq!(exchange(&mut io, "65,DOWN,30").await, Some(Directive::Suppress));
        listener.kill().await;
    }

    #[tokio::test]
    async fn test_add_listener_failure_leaves_no_handler() {
        let (helper, _handle) = MockHelper::failing();
        let mut listener = GlobalKeyboardListener::new(helper, WindowsConfig::default());

        let result = listener.add_listener(|_: &KeyEvent, _: &KeyStates| false);

        assert!(matches!(result, Err(ServerError::Helper(_))));
        assert_eq!(listener.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_handlers_see_key_states_and_combine_verdicts() {
        // Arrange: suppress A only while left shift is held.
        let (mut listener, handle) = listener();
        listener
            .add_listener(|event: &KeyEvent, states: &KeyStates| {
                event.name == Some(StandardKey::A) && states.is_down(StandardKey::LeftShift)
            })
            .unwrap();
        let mut io = handle.take_io().unwrap();

        // Act / Assert
        assert_eq!(exchange(&mut io, "65,DOWN,30").await, Some(Directive::Propagate));
        assert_eq!(exchange(&mut io, "160,DOWN,42").await, Some(Directive::Propagate));
        assert_eq!(exchange(&mut io, "65,DOWN,30").await, Some(Directive::Suppress));
        assert!(listener.key_states().is_down(StandardKey::A));

        listener.kill().await;
        assert_eq!(listener.key_states(), KeyStates::default());
    }
}
