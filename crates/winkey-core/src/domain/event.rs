use std::fmt;

use serde::Serialize;

use crate::keymap::{lookup_vk, StandardKey, WinKeyInfo};

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyState {
    Down,
    Up,
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyState::Down => f.write_str("DOWN"),
            KeyState::Up => f.write_str("UP"),
        }
    }
}

/// One key transition reported by the helper.
///
/// Numeric fields are `None` when the helper line did not carry a valid
/// integer there. Listeners must tolerate that: a garbled line still reaches
/// them rather than being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEvent {
    /// Windows virtual key code.
    pub vk_code: Option<u32>,
    /// Table entry for `vk_code`, if the code is known.
    pub raw_key: Option<WinKeyInfo>,
    /// Canonical name derived from `raw_key`.
    pub name: Option<StandardKey>,
    pub state: KeyState,
    /// Hardware scan code.
    pub scan_code: Option<u32>,
    /// The cleaned helper line this event was decoded from.
    pub raw: String,
}

impl KeyEvent {
    /// Builds an event from already-parsed fields, resolving the key name
    /// through the virtual-key table.
    pub fn new(
        vk_code: Option<u32>,
        state: KeyState,
        scan_code: Option<u32>,
        raw: impl Into<String>,
    ) -> Self {
        let raw_key = vk_code.and_then(lookup_vk);
        Self {
            vk_code,
            raw_key,
            name: raw_key.and_then(|info| info.standard_name),
            state,
            scan_code,
            raw: raw.into(),
        }
    }

    pub fn is_down(&self) -> bool {
        self.state == KeyState::Down
    }

    /// Returns `true` if this event is for either Windows key.
    pub fn is_meta(&self) -> bool {
        self.name.is_some_and(StandardKey::is_meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resolves_name_from_vk_table() {
        let event = KeyEvent::new(Some(0x41), KeyState::Down, Some(30), "65,DOWN,30");
        assert_eq!(event.name, Some(StandardKey::A));
        assert_eq!(event.raw_key.map(|k| k.raw_name), Some("VK_A"));
    }

    #[test]
    fn test_new_with_unknown_vk_leaves_name_empty() {
        let event = KeyEvent::new(Some(0x07), KeyState::Up, Some(0), "7,UP,0");
        assert_eq!(event.raw_key, None);
        assert_eq!(event.name, None);
    }

    #[test]
    fn test_new_without_vk_leaves_name_empty() {
        let event = KeyEvent::new(None, KeyState::Up, None, "garbage");
        assert_eq!(event.raw_key, None);
        assert_eq!(event.name, None);
    }

    #[test]
    fn test_is_meta_for_both_windows_keys() {
        assert!(KeyEvent::new(Some(0x5B), KeyState::Down, None, "").is_meta());
        assert!(KeyEvent::new(Some(0x5C), KeyState::Up, None, "").is_meta());
        assert!(!KeyEvent::new(Some(0xA2), KeyState::Down, None, "").is_meta());
    }

    #[test]
    fn test_serializes_state_and_name_as_strings() {
        let event = KeyEvent::new(Some(0x5B), KeyState::Down, Some(91), "91,DOWN,91");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["state"], "DOWN");
        assert_eq!(json["name"], "LEFT META");
        assert_eq!(json["vk_code"], 91);
    }
}
