use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// A usage id in the HID keyboard/keypad page.
///
/// Only the keys the macro engine cares about have named constants, every other usage id is still
/// representable through the inner value.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidKeyCode(pub u8);

macro_rules! hid_keycodes {
    ($($(#[$attr:meta])* $name:ident = $value:literal,)*) => {
        impl HidKeyCode {
            $(
                $(#[$attr])*
                pub const $name: HidKeyCode = HidKeyCode($value);
            )*
        }
    };
}

hid_keycodes! {
    /// Reserved, no-key.
    NO = 0x00,
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,
    /// `1` and `!`
    KC_1 = 0x1E,
    KC_2 = 0x1F,
    KC_3 = 0x20,
    KC_4 = 0x21,
    KC_5 = 0x22,
    KC_6 = 0x23,
    KC_7 = 0x24,
    KC_8 = 0x25,
    KC_9 = 0x26,
    /// `0` and `)`
    KC_0 = 0x27,
    ENTER = 0x28,
    ESCAPE = 0x29,
    BACKSPACE = 0x2A,
    TAB = 0x2B,
    SPACE = 0x2C,
    MINUS = 0x2D,
    EQUAL = 0x2E,
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,
    RIGHT = 0x4F,
    LEFT = 0x50,
    DOWN = 0x51,
    UP = 0x52,
    /// Keypad `1` and `End`
    KP_1 = 0x59,
    KP_2 = 0x5A,
    KP_3 = 0x5B,
    KP_4 = 0x5C,
    KP_5 = 0x5D,
    KP_6 = 0x5E,
    KP_7 = 0x5F,
    KP_8 = 0x60,
    KP_9 = 0x61,
    /// Keypad `0` and `Insert`
    KP_0 = 0x62,
    L_CTRL = 0xE0,
    L_SHIFT = 0xE1,
    L_ALT = 0xE2,
    L_GUI = 0xE3,
    R_CTRL = 0xE4,
    R_SHIFT = 0xE5,
    R_ALT = 0xE6,
    R_GUI = 0xE7,
}

impl HidKeyCode {
    /// Returns `true` if the keycode is a modifier keycode
    pub fn is_modifier(self) -> bool {
        HidKeyCode::L_CTRL <= self && self <= HidKeyCode::R_GUI
    }

    /// Returns the byte with the bit corresponding to the USB HID modifier bitfield set.
    pub fn modifier_bit(self) -> u8 {
        if self.is_modifier() {
            1 << (self.0 - HidKeyCode::L_CTRL.0)
        } else {
            0
        }
    }

    /// The decimal value of a number row or keypad digit key.
    pub fn numeral(self) -> Option<u8> {
        match self {
            HidKeyCode::KC_0 | HidKeyCode::KP_0 => Some(0),
            k if HidKeyCode::KC_1 <= k && k <= HidKeyCode::KC_9 => Some(k.0 - HidKeyCode::KC_1.0 + 1),
            k if HidKeyCode::KP_1 <= k && k <= HidKeyCode::KP_9 => Some(k.0 - HidKeyCode::KP_1.0 + 1),
            _ => None,
        }
    }
}

impl From<u8> for HidKeyCode {
    fn from(value: u8) -> Self {
        HidKeyCode(value)
    }
}

/// Keys whose only job is to change the active layer.
///
/// These never end up in a recorded macro: the engine only sees the keycode the layer produced.
/// In the 16-bit form a layer key addresses layers `0..=MAX_LAYER`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerKey {
    /// Activate the layer while held
    Momentary(u8),
    /// Switch to the layer
    To(u8),
    /// Toggle the layer
    Toggle(u8),
    /// Momentary when held, toggle after repeated taps
    TapToggle(u8),
    /// Activate the layer for the next key only
    OneShot(u8),
    /// One shot modifier, handled by the layer engine
    OneShotModifier(u8),
    TriLayerLower,
    TriLayerUpper,
}

/// Keys that drive the macro engine itself.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroControl {
    /// Start recording into the selected slot
    Record = 0,
    /// Start entering a delay after the last recorded key
    Delay = 1,
    /// Finish the current recording, delay entry, selection or playback
    End = 2,
    /// Play the selected slot once
    Play = 3,
    /// Play the selected slot repeatedly
    Loop = 4,
    /// Start typing the number of the slot to use
    Select = 5,
}

/// Highest layer a layer key can encode.
pub const MAX_LAYER: u8 = 0x1F;

/// Base of the 16-bit keycode ranges, see [`KeyCode::from_raw`].
const LAYER_TO: u16 = 0x5200;
const LAYER_MOMENTARY: u16 = 0x5220;
const LAYER_TOGGLE: u16 = 0x5260;
const LAYER_ONE_SHOT: u16 = 0x5280;
const ONE_SHOT_MODIFIER: u16 = 0x52A0;
const LAYER_TAP_TOGGLE: u16 = 0x52C0;
const TRI_LAYER_LOWER: u16 = 0x7C77;
const TRI_LAYER_UPPER: u16 = 0x7C78;
const MACRO_CONTROL: u16 = 0x7E00;

/// A keycode as seen by the macro engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyCode {
    Hid(HidKeyCode),
    Layer(LayerKey),
    Control(MacroControl),
    /// Any other 16-bit keycode, recorded and replayed untouched
    Other(u16),
}

impl Default for KeyCode {
    fn default() -> Self {
        KeyCode::Hid(HidKeyCode::NO)
    }
}

impl KeyCode {
    /// Returns `true` if the key drives the macro engine
    pub fn is_macro_control(self) -> bool {
        matches!(self, KeyCode::Control(_))
    }

    /// Returns `true` if the key only selects a layer
    pub fn is_layer(self) -> bool {
        matches!(self, KeyCode::Layer(_))
    }

    pub fn as_macro_control(self) -> Option<MacroControl> {
        match self {
            KeyCode::Control(c) => Some(c),
            _ => None,
        }
    }

    /// The decimal value of a digit key, `None` for every other key.
    pub fn numeral(self) -> Option<u8> {
        match self {
            KeyCode::Hid(k) => k.numeral(),
            _ => None,
        }
    }

    /// Decode a 16-bit keycode.
    ///
    /// | range | key |
    /// | --- | --- |
    /// | `0x0000..=0x00FF` | HID usage id |
    /// | `0x5200..=0x52DF` | layer keys, low 5 bits are the layer |
    /// | `0x7C77`, `0x7C78` | tri-layer lower/upper |
    /// | `0x7E00..=0x7E05` | macro control keys |
    pub fn from_raw(raw: u16) -> Self {
        let layer = (raw & 0x1F) as u8;
        match raw {
            0x0000..=0x00FF => KeyCode::Hid(HidKeyCode(raw as u8)),
            0x5200..=0x521F => KeyCode::Layer(LayerKey::To(layer)),
            0x5220..=0x523F => KeyCode::Layer(LayerKey::Momentary(layer)),
            0x5260..=0x527F => KeyCode::Layer(LayerKey::Toggle(layer)),
            0x5280..=0x529F => KeyCode::Layer(LayerKey::OneShot(layer)),
            0x52A0..=0x52BF => KeyCode::Layer(LayerKey::OneShotModifier(layer)),
            0x52C0..=0x52DF => KeyCode::Layer(LayerKey::TapToggle(layer)),
            TRI_LAYER_LOWER => KeyCode::Layer(LayerKey::TriLayerLower),
            TRI_LAYER_UPPER => KeyCode::Layer(LayerKey::TriLayerUpper),
            r if r >= MACRO_CONTROL && r - MACRO_CONTROL <= u8::MAX as u16 => {
                match MacroControl::from_repr((r - MACRO_CONTROL) as u8) {
                    Some(c) => KeyCode::Control(c),
                    None => KeyCode::Other(r),
                }
            }
            r => KeyCode::Other(r),
        }
    }

    /// Encode into the 16-bit form accepted by [`KeyCode::from_raw`].
    ///
    /// Layer keys only have 5 bits for the layer, `None` if the layer is above [`MAX_LAYER`].
    pub fn to_raw(self) -> Option<u16> {
        let layer = |base: u16, l: u8| (l <= MAX_LAYER).then_some(base | l as u16);
        let raw = match self {
            KeyCode::Hid(k) => k.0 as u16,
            KeyCode::Layer(LayerKey::To(l)) => layer(LAYER_TO, l)?,
            KeyCode::Layer(LayerKey::Momentary(l)) => layer(LAYER_MOMENTARY, l)?,
            KeyCode::Layer(LayerKey::Toggle(l)) => layer(LAYER_TOGGLE, l)?,
            KeyCode::Layer(LayerKey::OneShot(l)) => layer(LAYER_ONE_SHOT, l)?,
            KeyCode::Layer(LayerKey::OneShotModifier(m)) => layer(ONE_SHOT_MODIFIER, m)?,
            KeyCode::Layer(LayerKey::TapToggle(l)) => layer(LAYER_TAP_TOGGLE, l)?,
            KeyCode::Layer(LayerKey::TriLayerLower) => TRI_LAYER_LOWER,
            KeyCode::Layer(LayerKey::TriLayerUpper) => TRI_LAYER_UPPER,
            KeyCode::Control(c) => MACRO_CONTROL + c as u16,
            KeyCode::Other(r) => r,
        };
        Some(raw)
    }
}

impl From<HidKeyCode> for KeyCode {
    fn from(k: HidKeyCode) -> Self {
        KeyCode::Hid(k)
    }
}

impl From<LayerKey> for KeyCode {
    fn from(k: LayerKey) -> Self {
        KeyCode::Layer(k)
    }
}

impl From<MacroControl> for KeyCode {
    fn from(c: MacroControl) -> Self {
        KeyCode::Control(c)
    }
}

impl From<u16> for KeyCode {
    fn from(raw: u16) -> Self {
        KeyCode::from_raw(raw)
    }
}
