//! Domain types for WinKey.
//!
//! Pure logic with no process or I/O dependencies: the key event handed to
//! listeners, and the per-session state that decides whether a Windows-key
//! release must be swallowed.

/// Key events as delivered to listeners.
pub mod event;
/// Release suppression for the Windows (meta) keys.
pub mod meta_capture;
