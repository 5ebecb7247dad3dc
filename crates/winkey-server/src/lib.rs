//! winkey-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::dispatcher::{GlobalKeyboardListener, KeyHandler, KeyStates, ListenerId, Propagation};
pub use application::key_server::{KeyListener, KeyServer, ServerError, WindowsConfig};
pub use infrastructure::helper::{HelperError, HelperStreams, KeyHelper};
