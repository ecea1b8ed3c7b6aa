use super::MacroController;
use crate::classifier::{KeyClass, is_layer_key};
use crate::config::MAX_DELAY_MS;
use crate::hooks::MacroHooks;
use crate::scheduler::Scheduler;
use crate::sink::KeySink;
use crate::state::MacroState;

impl<S: KeySink, T: Scheduler, H: MacroHooks, const NUM_REGIONS: usize, const REGION_SIZE: usize>
    MacroController<S, T, H, NUM_REGIONS, REGION_SIZE>
{
    /// Digits build up the delay on key down, any other key goes back to recording on key up.
    pub(super) fn process_delay_key(&mut self, class: KeyClass, pressed: bool) -> bool {
        match class {
            KeyClass::Numeral(digit) => {
                if pressed {
                    self.accumulate_delay_digit(digit);
                }
                !self.config.silent_recorded_keys
            }
            _ => {
                if !pressed {
                    warn!("Only digits are accepted in delay entry");
                    let _ = self.transition(MacroState::Recording);
                }
                !self.config.silent_invalid_keys
            }
        }
    }

    pub(super) fn begin_delay_entry(&mut self) {
        self.delay_acc = 0;
        let slot = self.cursor.slot();
        while let Some(pos) = self.cursor.behind() {
            if !is_layer_key(self.buffer.get(slot, pos).keycode) {
                break;
            }
            self.cursor.retreat();
        }
    }

    /// Append a decimal digit to the delay. A digit that would push the delay over
    /// [`MAX_DELAY_MS`] is dropped.
    pub(crate) fn accumulate_delay_digit(&mut self, digit: u8) {
        match self
            .delay_acc
            .checked_mul(10)
            .and_then(|d| d.checked_add(digit as u32))
            .filter(|d| *d <= MAX_DELAY_MS)
        {
            Some(delay) => {
                self.delay_acc = delay;
                debug!("Delay: {}ms", delay);
            }
            None => debug!("Delay digit {} dropped, the delay is capped at {}ms", digit, MAX_DELAY_MS),
        }
    }

    /// Attach the typed delay to the last recorded key
    pub(super) fn end_delay_entry(&mut self) {
        let slot = self.cursor.slot();
        let delay = self.delay_acc;
        match self.cursor.behind() {
            Some(pos) => {
                let record = self.buffer.get_mut(slot, pos);
                record.delay_ms = delay;
                info!("Delay of {}ms after {:?} in macro {}", delay, record.keycode, slot);
            }
            None => warn!("No recorded key to attach the delay of {}ms to", delay),
        }
        self.delay_acc = 0;
    }
}
