//! User feedback for the macro engine.
//!
//! Every method of [`MacroHooks`] has a default, implement only the ones you care about.

use embedded_hal::digital::OutputPin;
use tdm_types::keycode::KeyCode;

/// Callbacks fired by [`MacroController`](crate::controller::MacroController) at the
/// interesting points of a session.
pub trait MacroHooks {
    /// Default feedback signal, every other hook falls back to it
    fn blink(&mut self) {
        debug!("Macro feedback: blink");
    }

    /// Feedback for errors
    fn double_blink(&mut self) {
        self.blink();
        self.blink();
    }

    fn on_init(&mut self) {
        self.blink();
    }

    fn on_record_start(&mut self, _slot: u8) {
        self.blink();
    }

    fn on_record_key(&mut self, _slot: u8, _keycode: KeyCode, _pressed: bool) {
        self.blink();
    }

    fn on_record_end(&mut self, _slot: u8, _len: usize) {
        self.blink();
    }

    fn on_play(&mut self, _slot: u8) {
        self.blink();
    }

    fn on_play_stop(&mut self, _slot: u8) {
        self.blink();
    }

    /// Playback of `slot` couldn't be scheduled and was abandoned
    fn on_play_abort(&mut self, _slot: u8) {
        self.double_blink();
    }

    /// Narrow down which keys may be recorded. A key rejected here ends the recording.
    fn is_macro_eligible_key(&self, _keycode: KeyCode) -> bool {
        true
    }
}

/// Hooks that only write to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogHooks;

impl MacroHooks for LogHooks {
    fn on_record_start(&mut self, slot: u8) {
        info!("Recording into macro {}", slot);
        self.blink();
    }

    fn on_record_end(&mut self, slot: u8, len: usize) {
        info!("Macro {} recorded, {} keys", slot, len);
        self.blink();
    }

    fn on_play(&mut self, slot: u8) {
        info!("Playing macro {}", slot);
        self.blink();
    }

    fn on_play_stop(&mut self, slot: u8) {
        info!("Done playing macro {}", slot);
        self.blink();
    }
}

/// Feedback on an LED: every signal flips the pin once.
///
/// The hooks run synchronously, so there is no pulse. The LED keeps the parity of the signals
/// seen since [`MacroHooks::on_init`], which turns it off. Errors flip it twice, so they leave it
/// where it was.
pub struct PinFeedback<P: OutputPin> {
    pin: P,
    low_active: bool,
    lit: bool,
}

impl<P: OutputPin> PinFeedback<P> {
    pub fn new(pin: P, low_active: bool) -> Self {
        Self {
            pin,
            low_active,
            lit: false,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Release the pin
    pub fn free(self) -> P {
        self.pin
    }

    fn set(&mut self, lit: bool) {
        let high = lit != self.low_active;
        let result = if high { self.pin.set_high() } else { self.pin.set_low() };
        match result {
            Ok(()) => self.lit = lit,
            Err(_) => warn!("Failed to drive macro feedback pin"),
        }
    }
}

impl<P: OutputPin> MacroHooks for PinFeedback<P> {
    fn blink(&mut self) {
        let lit = !self.lit;
        self.set(lit);
    }

    /// Start from a known state
    fn on_init(&mut self) {
        self.set(false);
    }
}
