//! # winkey-core
//!
//! Shared library for WinKey containing the key event model, the Windows
//! virtual-key lookup table, and the line protocol spoken with the native
//! hook helper.
//!
//! This crate has zero dependencies on OS APIs, processes, or async runtimes.
//! The host side (`winkey-server`) owns the helper process and feeds the
//! lines it reads through the types defined here.
//!
//! # Architecture overview
//!
//! The actual keyboard hook lives in a native executable (`WinKeyServer.exe`).
//! For every key transition it prints one line such as `65,DOWN,30` and then
//! blocks until the host answers `1` (swallow the key) or `0` (let it through).
//!
//! - **`keymap`** – The virtual-key table: `vk -> WinKeyInfo`, where each entry
//!   carries the Win32 constant name and the canonical [`StandardKey`].
//!
//! - **`protocol`** – Decoding helper lines into [`KeyEvent`]s and encoding
//!   the one-character [`Directive`] sent back.
//!
//! - **`domain`** – The event model and the [`MetaCapture`] state machine that
//!   keeps a swallowed Windows-key press from leaking its release.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::event::{KeyEvent, KeyState};
pub use domain::meta_capture::MetaCapture;
pub use keymap::standard::StandardKey;
pub use keymap::windows_vk::WinKeyInfo;
pub use protocol::codec::{decode_event_line, try_decode_event_line, Directive, ProtocolError};
