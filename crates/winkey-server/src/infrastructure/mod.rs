//! Infrastructure layer for the WinKey host.
//!
//! Contains OS-facing adapters: the native helper process and configuration
//! file storage.
//!
//! **Dependency rule**: this layer may depend on `winkey_core`, but MUST NOT
//! be imported by the domain types in `winkey_core`.

pub mod helper;
pub mod storage;
