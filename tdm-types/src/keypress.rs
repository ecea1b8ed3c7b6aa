use bitfield_struct::bitfield;
use serde::{Deserialize, Serialize};

use crate::keycode::{HidKeyCode, KeyCode};

/// Metadata of a recorded keypress.
///
/// Only bit 0 is in use, the remaining bits are reserved for recording more of the key's context
/// (tap state, combo origin) later.
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Serialize, Deserialize, Eq, PartialEq)]
pub struct KeyFlags {
    /// The event was a key down
    #[bits(1)]
    pub pressed: bool,
    #[bits(7)]
    pub reserved: u8,
}

/// One recorded key event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keypress {
    pub keycode: KeyCode,
    /// Pause after this event is replayed, in milliseconds. 0 means no pause.
    pub delay_ms: u32,
    pub flags: KeyFlags,
}

impl Default for Keypress {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Keypress {
    pub const EMPTY: Keypress = Keypress {
        keycode: KeyCode::Hid(HidKeyCode::NO),
        delay_ms: 0,
        flags: KeyFlags::new(),
    };

    pub const fn new(keycode: KeyCode, pressed: bool) -> Self {
        Self {
            keycode,
            delay_ms: 0,
            flags: KeyFlags::new().with_pressed(pressed),
        }
    }

    pub fn pressed(&self) -> bool {
        self.flags.pressed()
    }

    /// Reset the delay and all flags, the keycode is left untouched.
    pub fn clear(&mut self) {
        self.delay_ms = 0;
        self.flags = KeyFlags::new();
    }
}
