//! Windows Virtual Key (VK) code lookup table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h). VK codes range from
//! 0x00 to 0xFF.
//!
//! # What is a Windows Virtual Key (VK) code?
//!
//! Windows assigns each key a number called a "Virtual Key code", defined in
//! `<winuser.h>` as `VK_*` (e.g. `VK_RETURN = 0x0D`, `VK_LWIN = 0x5B`). They
//! are "virtual" because they name *logical* keys rather than physical scan
//! codes: pressing the key that types A yields `VK_A = 0x41` on any layout.
//!
//! # How this table works
//!
//! `VK_TABLE` is a compile-time array of 256 optional [`WinKeyInfo`] entries
//! indexed by VK code. Entry 0x5B holds `VK_LWIN` / `LEFT META`. Codes with no
//! entry are `None`; some entries have a raw name but no standard name
//! (`VK_SHIFT` could be either shift key, so it gets no canonical name).

use serde::Serialize;

use super::standard::StandardKey;

/// Descriptor for a single virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinKeyInfo {
    /// Win32 constant name, e.g. `"VK_LWIN"`.
    pub raw_name: &'static str,
    /// Canonical cross-platform name, if the key has one.
    pub standard_name: Option<StandardKey>,
}

/// Returns the descriptor for `vk`, or `None` if the code is not in the table.
///
/// # Panics
///
/// Never panics; all u8 inputs are handled.
pub fn vk_info(vk: u8) -> Option<WinKeyInfo> {
    VK_TABLE[vk as usize]
}

const fn named(raw_name: &'static str, standard_name: StandardKey) -> Option<WinKeyInfo> {
    Some(WinKeyInfo {
        raw_name,
        standard_name: Some(standard_name),
    })
}

const fn raw_only(raw_name: &'static str) -> Option<WinKeyInfo> {
    Some(WinKeyInfo {
        raw_name,
        standard_name: None,
    })
}

/// Complete VK lookup table indexed by VK code (0x00–0xFF).
/// Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes
const VK_TABLE: [Option<WinKeyInfo>; 256] = {
    use StandardKey::*;
    let mut t: [Option<WinKeyInfo>; 256] = [None; 256];

    // ── Mouse buttons ─────────────────────────────────────────────────────────
    t[0x01] = named("VK_LBUTTON", MouseLeft);
    t[0x02] = named("VK_RBUTTON", MouseRight);
    t[0x03] = raw_only("VK_CANCEL");
    t[0x04] = named("VK_MBUTTON", MouseMiddle);
    t[0x05] = named("VK_XBUTTON1", MouseX1);
    t[0x06] = named("VK_XBUTTON2", MouseX2);

    // ── Control keys ─────────────────────────────────────────────────────────
    t[0x08] = named("VK_BACK", Backspace);
    t[0x09] = named("VK_TAB", Tab);
    t[0x0C] = named("VK_CLEAR", NumpadClear);
    t[0x0D] = named("VK_RETURN", Return);
    t[0x10] = raw_only("VK_SHIFT");
    t[0x11] = raw_only("VK_CONTROL");
    t[0x12] = raw_only("VK_MENU");
    t[0x13] = raw_only("VK_PAUSE");
    t[0x14] = named("VK_CAPITAL", CapsLock);
    t[0x1B] = named("VK_ESCAPE", Escape);
    t[0x20] = named("VK_SPACE", Space);
    t[0x21] = named("VK_PRIOR", PageUp);
    t[0x22] = named("VK_NEXT", PageDown);
    t[0x23] = named("VK_END", End);
    t[0x24] = named("VK_HOME", Home);
    t[0x2C] = named("VK_SNAPSHOT", PrintScreen);
    t[0x2D] = named("VK_INSERT", Ins);
    t[0x2E] = named("VK_DELETE", Delete);
    t[0x5D] = raw_only("VK_APPS");
    t[0x5F] = raw_only("VK_SLEEP");

    // ── Arrow keys ────────────────────────────────────────────────────────────
    t[0x25] = named("VK_LEFT", LeftArrow);
    t[0x26] = named("VK_UP", UpArrow);
    t[0x27] = named("VK_RIGHT", RightArrow);
    t[0x28] = named("VK_DOWN", DownArrow);

    // ── Digit row (VK_0=0x30 … VK_9=0x39) ───────────────────────────────────
    t[0x30] = named("VK_0", Digit0);
    t[0x31] = named("VK_1", Digit1);
    t[0x32] = named("VK_2", Digit2);
    t[0x33] = named("VK_3", Digit3);
    t[0x34] = named("VK_4", Digit4);
    t[0x35] = named("VK_5", Digit5);
    t[0x36] = named("VK_6", Digit6);
    t[0x37] = named("VK_7", Digit7);
    t[0x38] = named("VK_8", Digit8);
    t[0x39] = named("VK_9", Digit9);

    // ── Alphabet (VK_A=0x41 … VK_Z=0x5A) ─────────────────────────────────────
    t[0x41] = named("VK_A", A);
    t[0x42] = named("VK_B", B);
    t[0x43] = named("VK_C", C);
    t[0x44] = named("VK_D", D);
    t[0x45] = named("VK_E", E);
    t[0x46] = named("VK_F", F);
    t[0x47] = named("VK_G", G);
    t[0x48] = named("VK_H", H);
    t[0x49] = named("VK_I", I);
    t[0x4A] = named("VK_J", J);
    t[0x4B] = named("VK_K", K);
    t[0x4C] = named("VK_L", L);
    t[0x4D] = named("VK_M", M);
    t[0x4E] = named("VK_N", N);
    t[0x4F] = named("VK_O", O);
    t[0x50] = named("VK_P", P);
    t[0x51] = named("VK_Q", Q);
    t[0x52] = named("VK_R", R);
    t[0x53] = named("VK_S", S);
    t[0x54] = named("VK_T", T);
    t[0x55] = named("VK_U", U);
    t[0x56] = named("VK_V", V);
    t[0x57] = named("VK_W", W);
    t[0x58] = named("VK_X", X);
    t[0x59] = named("VK_Y", Y);
    t[0x5A] = named("VK_Z", Z);

    // ── Windows keys ──────────────────────────────────────────────────────────
    t[0x5B] = named("VK_LWIN", LeftMeta);
    t[0x5C] = named("VK_RWIN", RightMeta);

    // ── Numpad (VK_NUMPAD0=0x60 … VK_NUMPAD9=0x69) ───────────────────────────
    t[0x60] = named("VK_NUMPAD0", Numpad0);
    t[0x61] = named("VK_NUMPAD1", Numpad1);
    t[0x62] = named("VK_NUMPAD2", Numpad2);
    t[0x63] = named("VK_NUMPAD3", Numpad3);
    t[0x64] = named("VK_NUMPAD4", Numpad4);
    t[0x65] = named("VK_NUMPAD5", Numpad5);
    t[0x66] = named("VK_NUMPAD6", Numpad6);
    t[0x67] = named("VK_NUMPAD7", Numpad7);
    t[0x68] = named("VK_NUMPAD8", Numpad8);
    t[0x69] = named("VK_NUMPAD9", Numpad9);
    t[0x6A] = named("VK_MULTIPLY", NumpadMultiply);
    t[0x6B] = named("VK_ADD", NumpadPlus);
    t[0x6C] = raw_only("VK_SEPARATOR");
    t[0x6D] = named("VK_SUBTRACT", NumpadMinus);
    t[0x6E] = named("VK_DECIMAL", NumpadDot);
    t[0x6F] = named("VK_DIVIDE", NumpadDivide);

    // ── Function keys (VK_F1=0x70 … VK_F24=0x87) ─────────────────────────────
    t[0x70] = named("VK_F1", F1);
    t[0x71] = named("VK_F2", F2);
    t[0x72] = named("VK_F3", F3);
    t[0x73] = named("VK_F4", F4);
    t[0x74] = named("VK_F5", F5);
    t[0x75] = named("VK_F6", F6);
    t[0x76] = named("VK_F7", F7);
    t[0x77] = named("VK_F8", F8);
    t[0x78] = named("VK_F9", F9);
    t[0x79] = named("VK_F10", F10);
    t[0x7A] = named("VK_F11", F11);
    t[0x7B] = named("VK_F12", F12);
    t[0x7C] = named("VK_F13", F13);
    t[0x7D] = named("VK_F14", F14);
    t[0x7E] = named("VK_F15", F15);
    t[0x7F] = named("VK_F16", F16);
    t[0x80] = named("VK_F17", F17);
    t[0x81] = named("VK_F18", F18);
    t[0x82] = named("VK_F19", F19);
    t[0x83] = named("VK_F20", F20);
    t[0x84] = named("VK_F21", F21);
    t[0x85] = named("VK_F22", F22);
    t[0x86] = named("VK_F23", F23);
    t[0x87] = named("VK_F24", F24);

    // ── Lock keys ─────────────────────────────────────────────────────────────
    t[0x90] = named("VK_NUMLOCK", NumLock);
    t[0x91] = named("VK_SCROLL", ScrollLock);

    // ── Sided modifiers (what WH_KEYBOARD_LL actually reports) ────────────────
    t[0xA0] = named("VK_LSHIFT", LeftShift);
    t[0xA1] = named("VK_RSHIFT", RightShift);
    t[0xA2] = named("VK_LCONTROL", LeftCtrl);
    t[0xA3] = named("VK_RCONTROL", RightCtrl);
    t[0xA4] = named("VK_LMENU", LeftAlt);
    t[0xA5] = named("VK_RMENU", RightAlt);

    // ── Punctuation / symbols (US layout labels) ──────────────────────────────
    t[0xBA] = named("VK_OEM_1", Semicolon);
    t[0xBB] = named("VK_OEM_PLUS", Equals);
    t[0xBC] = named("VK_OEM_COMMA", Comma);
    t[0xBD] = named("VK_OEM_MINUS", Minus);
    t[0xBE] = named("VK_OEM_PERIOD", Dot);
    t[0xBF] = named("VK_OEM_2", ForwardSlash);
    t[0xC0] = named("VK_OEM_3", Backtick);
    t[0xDB] = named("VK_OEM_4", SquareBracketOpen);
    t[0xDC] = named("VK_OEM_5", Backslash);
    t[0xDD] = named("VK_OEM_6", SquareBracketClose);
    t[0xDE] = named("VK_OEM_7", Quote);
    t[0xDF] = named("VK_OEM_8", Section);
    t[0xE2] = raw_only("VK_OEM_102");

    t
};
