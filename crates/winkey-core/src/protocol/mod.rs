//! Line protocol spoken with the native hook helper.

pub mod codec;

pub use codec::{decode_event_line, try_decode_event_line, Directive, ProtocolError};
