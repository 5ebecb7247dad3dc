//! Key code lookup tables.
//!
//! The helper reports Windows virtual key codes. The canonical representation
//! handed to listeners is [`StandardKey`], the cross-platform key name.

pub mod standard;
pub mod windows_vk;

pub use standard::StandardKey;
pub use windows_vk::WinKeyInfo;

/// Looks up the descriptor for a virtual key code reported by the helper.
///
/// Returns `None` for codes outside `0..=255` and for codes with no entry.
pub fn lookup_vk(vk: u32) -> Option<WinKeyInfo> {
    u8::try_from(vk).ok().and_then(windows_vk::vk_info)
}

/// Translates a virtual key code straight to its standard name.
///
/// `None` both when the code is unknown and when the code is known but has no
/// standard name (for example the side-less `VK_SHIFT`).
pub fn standard_name_for_vk(vk: u32) -> Option<StandardKey> {
    lookup_vk(vk).and_then(|info| info.standard_name)
}
