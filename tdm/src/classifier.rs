//! Predicates that sort incoming keys before the macro engine handles them.

use tdm_types::keycode::{KeyCode, MacroControl};
use tdm_types::keypress::Keypress;

/// Role of a key for the macro engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyClass {
    /// Drives the state machine
    Control(MacroControl),
    /// Changes the active layer, never recorded
    Layer,
    /// Number row or keypad digit
    Numeral(u8),
    Other,
}

impl KeyClass {
    pub fn of(keycode: KeyCode) -> Self {
        if let Some(control) = keycode.as_macro_control() {
            KeyClass::Control(control)
        } else if keycode.is_layer() {
            KeyClass::Layer
        } else if let Some(n) = keycode.numeral() {
            KeyClass::Numeral(n)
        } else {
            KeyClass::Other
        }
    }
}

pub fn is_control_key(keycode: KeyCode) -> bool {
    keycode.is_macro_control()
}

pub fn is_layer_key(keycode: KeyCode) -> bool {
    keycode.is_layer()
}

pub fn numeral_value(keycode: KeyCode) -> Option<u8> {
    keycode.numeral()
}

pub fn is_numeral_key(keycode: KeyCode) -> bool {
    numeral_value(keycode).is_some()
}

/// A record that can't stay at the tail of a finished macro: a key that is still held, or a key
/// that should never have been stored.
pub(crate) fn is_trimmable_tail(record: &Keypress) -> bool {
    record.pressed() || is_control_key(record.keycode) || is_layer_key(record.keycode)
}
