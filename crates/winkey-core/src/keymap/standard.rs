//! Canonical cross-platform key names.
//!
//! Every key a listener sees is identified by a [`StandardKey`], independent
//! of the platform code that produced it. The string form (`"LEFT META"`,
//! `"NUMPAD 0"`, `"A"`) is what gets logged, serialised, and written in the
//! configuration file.
//!
//! # Why names instead of codes?
//!
//! Virtual key codes are a Windows concept. A listener that wants to react to
//! "the left Windows key" should not need to know that Windows calls it
//! `0x5B`. Names also survive the trip through a TOML config file intact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Returned by [`StandardKey::from_str`] for names that are not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name: {0:?}")]
pub struct UnknownKeyName(pub String);

/// Canonical key name shared by all platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardKey {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Digit row
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadMultiply,
    NumpadPlus,
    NumpadMinus,
    NumpadDot,
    NumpadDivide,
    NumpadClear,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    // Control and editing
    Return,
    Escape,
    Backspace,
    Tab,
    Space,
    CapsLock,
    NumLock,
    ScrollLock,
    Ins,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    PrintScreen,

    // Arrows
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,

    // Modifiers
    LeftCtrl,
    RightCtrl,
    LeftShift,
    RightShift,
    LeftAlt,
    RightAlt,
    LeftMeta,
    RightMeta,

    // Punctuation
    Section,
    SquareBracketOpen,
    SquareBracketClose,
    Semicolon,
    Quote,
    Backslash,
    Backtick,
    Minus,
    Equals,
    Comma,
    Dot,
    ForwardSlash,

    // Mouse buttons (the helper reports them through the same stream)
    MouseLeft,
    MouseRight,
    MouseMiddle,
    MouseX1,
    MouseX2,
}

impl StandardKey {
    /// Every variant, in declaration order.
    pub const ALL: &'static [StandardKey] = &[
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
        Self::M,
        Self::N,
        Self::O,
        Self::P,
        Self::Q,
        Self::R,
        Self::S,
        Self::T,
        Self::U,
        Self::V,
        Self::W,
        Self::X,
        Self::Y,
        Self::Z,
        Self::Digit0,
        Self::Digit1,
        Self::Digit2,
        Self::Digit3,
        Self::Digit4,
        Self::Digit5,
        Self::Digit6,
        Self::Digit7,
        Self::Digit8,
        Self::Digit9,
        Self::Numpad0,
        Self::Numpad1,
        Self::Numpad2,
        Self::Numpad3,
        Self::Numpad4,
        Self::Numpad5,
        Self::Numpad6,
        Self::Numpad7,
        Self::Numpad8,
        Self::Numpad9,
        Self::NumpadMultiply,
        Self::NumpadPlus,
        Self::NumpadMinus,
        Self::NumpadDot,
        Self::NumpadDivide,
        Self::NumpadClear,
        Self::F1,
        Self::F2,
        Self::F3,
        Self::F4,
        Self::F5,
        Self::F6,
        Self::F7,
        Self::F8,
        Self::F9,
        Self::F10,
        Self::F11,
        Self::F12,
        Self::F13,
        Self::F14,
        Self::F15,
        Self::F16,
        Self::F17,
        Self::F18,
        Self::F19,
        Self::F20,
        Self::F21,
        Self::F22,
        Self::F23,
        Self::F24,
        Self::Return,
        Self::Escape,
        Self::Backspace,
        Self::Tab,
        Self::Space,
        Self::CapsLock,
        Self::NumLock,
        Self::ScrollLock,
        Self::Ins,
        Self::Delete,
        Self::Home,
        Self::End,
        Self::PageUp,
        Self::PageDown,
        Self::PrintScreen,
        Self::UpArrow,
        Self::DownArrow,
        Self::LeftArrow,
        Self::RightArrow,
        Self::LeftCtrl,
        Self::RightCtrl,
        Self::LeftShift,
        Self::RightShift,
        Self::LeftAlt,
        Self::RightAlt,
        Self::LeftMeta,
        Self::RightMeta,
        Self::Section,
        Self::SquareBracketOpen,
        Self::SquareBracketClose,
        Self::Semicolon,
        Self::Quote,
        Self::Backslash,
        Self::Backtick,
        Self::Minus,
        Self::Equals,
        Self::Comma,
        Self::Dot,
        Self::ForwardSlash,
        Self::MouseLeft,
        Self::MouseRight,
        Self::MouseMiddle,
        Self::MouseX1,
        Self::MouseX2,
    ];

    /// Returns the canonical upper-case name, e.g. `"LEFT META"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::H => "H",
            Self::I => "I",
            Self::J => "J",
            Self::K => "K",
            Self::L => "L",
            Self::M => "M",
            Self::N => "N",
            Self::O => "O",
            Self::P => "P",
            Self::Q => "Q",
            Self::R => "R",
            Self::S => "S",
            Self::T => "T",
            Self::U => "U",
            Self::V => "V",
            Self::W => "W",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::Digit0 => "0",
            Self::Digit1 => "1",
            Self::Digit2 => "2",
            Self::Digit3 => "3",
            Self::Digit4 => "4",
            Self::Digit5 => "5",
            Self::Digit6 => "6",
            Self::Digit7 => "7",
            Self::Digit8 => "8",
            Self::Digit9 => "9",
            Self::Numpad0 => "NUMPAD 0",
            Self::Numpad1 => "NUMPAD 1",
            Self::Numpad2 => "NUMPAD 2",
            Self::Numpad3 => "NUMPAD 3",
            Self::Numpad4 => "NUMPAD 4",
            Self::Numpad5 => "NUMPAD 5",
            Self::Numpad6 => "NUMPAD 6",
            Self::Numpad7 => "NUMPAD 7",
            Self::Numpad8 => "NUMPAD 8",
            Self::Numpad9 => "NUMPAD 9",
            Self::NumpadMultiply => "NUMPAD MULTIPLY",
            Self::NumpadPlus => "NUMPAD PLUS",
            Self::NumpadMinus => "NUMPAD MINUS",
            Self::NumpadDot => "NUMPAD DOT",
            Self::NumpadDivide => "NUMPAD DIVIDE",
            Self::NumpadClear => "NUMPAD CLEAR",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            Self::F13 => "F13",
            Self::F14 => "F14",
            Self::F15 => "F15",
            Self::F16 => "F16",
            Self::F17 => "F17",
            Self::F18 => "F18",
            Self::F19 => "F19",
            Self::F20 => "F20",
            Self::F21 => "F21",
            Self::F22 => "F22",
            Self::F23 => "F23",
            Self::F24 => "F24",
            Self::Return => "RETURN",
            Self::Escape => "ESCAPE",
            Self::Backspace => "BACKSPACE",
            Self::Tab => "TAB",
            Self::Space => "SPACE",
            Self::CapsLock => "CAPS LOCK",
            Self::NumLock => "NUM LOCK",
            Self::ScrollLock => "SCROLL LOCK",
            Self::Ins => "INS",
            Self::Delete => "DELETE",
            Self::Home => "HOME",
            Self::End => "END",
            Self::PageUp => "PAGE UP",
            Self::PageDown => "PAGE DOWN",
            Self::PrintScreen => "PRINT SCREEN",
            Self::UpArrow => "UP ARROW",
            Self::DownArrow => "DOWN ARROW",
            Self::LeftArrow => "LEFT ARROW",
            Self::RightArrow => "RIGHT ARROW",
            Self::LeftCtrl => "LEFT CTRL",
            Self::RightCtrl => "RIGHT CTRL",
            Self::LeftShift => "LEFT SHIFT",
            Self::RightShift => "RIGHT SHIFT",
            Self::LeftAlt => "LEFT ALT",
            Self::RightAlt => "RIGHT ALT",
            Self::LeftMeta => "LEFT META",
            Self::RightMeta => "RIGHT META",
            Self::Section => "SECTION",
            Self::SquareBracketOpen => "SQUARE BRACKET OPEN",
            Self::SquareBracketClose => "SQUARE BRACKET CLOSE",
            Self::Semicolon => "SEMICOLON",
            Self::Quote => "QUOTE",
            Self::Backslash => "BACKSLASH",
            Self::Backtick => "BACKTICK",
            Self::Minus => "MINUS",
            Self::Equals => "EQUALS",
            Self::Comma => "COMMA",
            Self::Dot => "DOT",
            Self::ForwardSlash => "FORWARD SLASH",
            Self::MouseLeft => "MOUSE LEFT",
            Self::MouseRight => "MOUSE RIGHT",
            Self::MouseMiddle => "MOUSE MIDDLE",
            Self::MouseX1 => "MOUSE X1",
            Self::MouseX2 => "MOUSE X2",
        }
    }

    /// Returns `true` for the left and right Windows keys.
    pub fn is_meta(self) -> bool {
        matches!(self, Self::LeftMeta | Self::RightMeta)
    }
}

impl fmt::Display for StandardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardKey {
    type Err = UnknownKeyName;

    /// Parses a canonical name. Matching ignores ASCII case and surrounding
    /// whitespace, so `"left meta"` and `" LEFT META "` both work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownKeyName(s.to_string()))
    }
}

impl Serialize for StandardKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StandardKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
