//! Text codec for the helper's stdin/stdout protocol.
//!
//! Wire format, helper → host, one line per key transition:
//! ```text
//! <vk_code>,<STATE_TOKEN>,<scan_code>[,<ignored>...]\n
//! ```
//! `STATE_TOKEN` contains `DOWN` for a press; anything else is a release.
//!
//! Host → helper, exactly one line per event line received:
//! ```text
//! 1\n   swallow the key
//! 0\n   let the key through
//! ```
//!
//! Surrounding whitespace on the line and on each field is ignored. Both
//! integers are unsigned decimal.

use std::str::FromStr;

use thiserror::Error;

use crate::domain::event::{KeyEvent, KeyState};

const VK_FIELD: usize = 0;
const STATE_FIELD: usize = 1;
const SCAN_FIELD: usize = 2;

/// Substring of the state token that marks a key press.
const DOWN_TOKEN: &str = "DOWN";

/// Problems found by the strict decoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line was empty after trimming.
    #[error("empty event line")]
    EmptyLine,

    /// Fewer fields than the protocol requires.
    #[error("missing {name} (field {index})")]
    MissingField { index: usize, name: &'static str },

    /// A numeric field did not parse as an unsigned integer.
    #[error("invalid {name} in field {index}: {value:?}")]
    InvalidNumber {
        index: usize,
        name: &'static str,
        value: String,
    },

    /// A directive line other than `0` or `1`.
    #[error("invalid directive: {0:?}")]
    InvalidDirective(String),
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes one helper line, never failing.
///
/// Missing or non-numeric fields come back as `None`, unknown key codes leave
/// the name empty, and a missing state token reads as a release. Output from
/// the helper must never be able to take the host down, so this is the
/// decoder used on the event path.
///
/// # Examples
///
/// ```rust
/// use winkey_core::{decode_event_line, KeyState, StandardKey};
///
/// let event = decode_event_line("65,DOWN,30");
/// assert_eq!(event.vk_code, Some(65));
/// assert_eq!(event.name, Some(StandardKey::A));
/// assert_eq!(event.state, KeyState::Down);
/// assert_eq!(event.scan_code, Some(30));
///
/// let garbled = decode_event_line("??");
/// assert_eq!(garbled.vk_code, None);
/// ```
pub fn decode_event_line(line: &str) -> KeyEvent {
    let cleaned = line.trim();
    let mut fields = cleaned.split(',').map(str::trim);

    let vk_code = fields.next().and_then(parse_code);
    let state = parse_state(fields.next());
    let scan_code = fields.next().and_then(parse_code);

    KeyEvent::new(vk_code, state, scan_code, cleaned)
}

/// Decodes one helper line, reporting the first protocol violation.
///
/// Used for diagnostics; a line rejected here is still delivered through
/// [`decode_event_line`].
///
/// # Errors
///
/// Returns [`ProtocolError`] for empty lines, missing fields, or numeric
/// fields that are not unsigned integers.
pub fn try_decode_event_line(line: &str) -> Result<KeyEvent, ProtocolError> {
    let cleaned = line.trim();
    if cleaned.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }

    let fields: Vec<&str> = cleaned.split(',').map(str::trim).collect();

    let vk_code = required_code(&fields, VK_FIELD, "virtual key code")?;
    let token = fields.get(STATE_FIELD).copied().ok_or(ProtocolError::MissingField {
        index: STATE_FIELD,
        name: "state",
    })?;
    let scan_code = required_code(&fields, SCAN_FIELD, "scan code")?;

    Ok(KeyEvent::new(
        Some(vk_code),
        parse_state(Some(token)),
        Some(scan_code),
        cleaned,
    ))
}

fn parse_code(field: &str) -> Option<u32> {
    field.parse().ok()
}

fn parse_state(token: Option<&str>) -> KeyState {
    match token {
        Some(token) if token.contains(DOWN_TOKEN) => KeyState::Down,
        _ => KeyState::Up,
    }
}

fn required_code(fields: &[&str], index: usize, name: &'static str) -> Result<u32, ProtocolError> {
    let value = fields
        .get(index)
        .copied()
        .ok_or(ProtocolError::MissingField { index, name })?;
    parse_code(value).ok_or_else(|| ProtocolError::InvalidNumber {
        index,
        name,
        value: value.to_string(),
    })
}

// ── Directives ────────────────────────────────────────────────────────────────

/// The host's answer to one event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `0`: the OS keeps processing the key.
    Propagate,
    /// `1`: the key is swallowed.
    Suppress,
}

impl Directive {
    pub fn from_stop_propagation(stop_propagation: bool) -> Self {
        if stop_propagation {
            Directive::Suppress
        } else {
            Directive::Propagate
        }
    }

    /// Wire bytes including the trailing newline.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Directive::Propagate => b"0\n",
            Directive::Suppress => b"1\n",
        }
    }
}

impl FromStr for Directive {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Directive::Propagate),
            "1" => Ok(Directive::Suppress),
            other => Err(ProtocolError::InvalidDirective(other.to_string())),
        }
    }
}
