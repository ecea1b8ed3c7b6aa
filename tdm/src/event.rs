use tdm_types::keycode::KeyCode;

/// A key changed state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub keycode: KeyCode,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn press(keycode: impl Into<KeyCode>) -> Self {
        Self {
            keycode: keycode.into(),
            pressed: true,
        }
    }

    pub fn release(keycode: impl Into<KeyCode>) -> Self {
        Self {
            keycode: keycode.into(),
            pressed: false,
        }
    }
}
