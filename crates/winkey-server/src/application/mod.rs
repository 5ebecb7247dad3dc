//! Application layer of the WinKey host.
//!
//! Use cases in this layer orchestrate `winkey_core` types around an injected
//! [`KeyHelper`](crate::infrastructure::helper::KeyHelper), so they can be
//! exercised end-to-end with the in-memory mock helper.
//!
//! # Sub-modules
//!
//! - **`key_server`** – Owns one helper session: reads event lines, asks the
//!   listener, applies the Windows-key correction, and answers the helper.
//!
//! - **`dispatcher`** – Fans events out to any number of registered handlers,
//!   tracks which keys are held, and starts/stops the key server as handlers
//!   come and go.

pub mod dispatcher;
pub mod key_server;
