use super::MacroController;
use crate::classifier::KeyClass;
use crate::hooks::MacroHooks;
use crate::scheduler::Scheduler;
use crate::sink::KeySink;
use crate::state::MacroState;

impl<S: KeySink, T: Scheduler, H: MacroHooks, const NUM_REGIONS: usize, const REGION_SIZE: usize>
    MacroController<S, T, H, NUM_REGIONS, REGION_SIZE>
{
    pub(super) fn process_selection_key(&mut self, class: KeyClass, pressed: bool) -> bool {
        match class {
            KeyClass::Numeral(digit) => {
                if pressed {
                    self.accumulate_selection_digit(digit);
                }
                !self.config.silent_recorded_keys
            }
            _ => {
                if !pressed {
                    warn!("Only digits are accepted in macro selection");
                    let _ = self.transition(MacroState::Idle);
                }
                !self.config.silent_invalid_keys
            }
        }
    }

    pub(super) fn begin_selection(&mut self) {
        self.selection = 0;
    }

    pub(super) fn accumulate_selection_digit(&mut self, digit: u8) {
        self.selection = self.selection.saturating_mul(10).saturating_add(digit as u32);
        debug!("Macro selection: {}", self.selection);
    }

    pub(super) fn end_selection(&mut self) {
        let last = Self::last_slot();
        let slot = if self.selection > last as u32 {
            last
        } else {
            self.selection as u8
        };
        self.sink.release_all();
        self.active_slot = slot;
        info!("Selected macro {}", slot);
    }
}
