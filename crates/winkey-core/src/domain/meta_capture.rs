//! Windows-key release suppression.
//!
//! If a listener swallows a Windows-key press (or any key pressed while the
//! Windows key is held), Windows must not see the matching release on its
//! own: an unmatched Win key-up opens the Start menu. `MetaCapture` remembers
//! that a swallowed press is pending and forces the eventual release to be
//! swallowed too, whatever the listener says about it.
//!
//! ```text
//!  meta DOWN, listener says suppress     -> suppress, arm
//!  meta UP,   listener says propagate    -> suppress (forced), disarm
//! ```

use tracing::debug;

use super::event::KeyEvent;

/// Two-flag state machine, one per helper session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetaCapture {
    meta_down: bool,
    capture_meta_up: bool,
}

impl MetaCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the correction to the listener's decision for `event` and
    /// returns the final stop-propagation value.
    pub fn resolve(&mut self, event: &KeyEvent, stop_propagation: bool) -> bool {
        let mut stop = stop_propagation;

        if event.is_meta() {
            self.meta_down = event.is_down();
            if !self.meta_down && self.capture_meta_up {
                debug!(key = ?event.name, "swallowing release of captured meta key");
                stop = true;
                self.capture_meta_up = false;
            }
        }

        if stop && self.meta_down {
            self.capture_meta_up = true;
        }

        stop
    }

    /// Whether a Windows key is currently held, as last observed.
    pub fn is_meta_down(&self) -> bool {
        self.meta_down
    }

    /// Whether the next Windows-key release will be swallowed.
    pub fn is_capturing_meta_up(&self) -> bool {
        self.capture_meta_up
    }
}
