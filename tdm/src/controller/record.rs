use tdm_types::keycode::KeyCode;
use tdm_types::keypress::Keypress;

use super::MacroController;
use crate::classifier::is_trimmable_tail;
use crate::cursor::Cursor;
use crate::hooks::MacroHooks;
use crate::scheduler::Scheduler;
use crate::sink::KeySink;
use crate::state::MacroState;

impl<S: KeySink, T: Scheduler, H: MacroHooks, const NUM_REGIONS: usize, const REGION_SIZE: usize>
    MacroController<S, T, H, NUM_REGIONS, REGION_SIZE>
{
    pub(super) fn process_recording_key(&mut self, keycode: KeyCode, pressed: bool) -> bool {
        if self.hooks.is_macro_eligible_key(keycode) {
            self.record_event(keycode, pressed);
            return !self.config.silent_recorded_keys;
        }
        if !pressed {
            warn!("{:?} can't be recorded, stop recording", keycode);
            let _ = self.transition(MacroState::Idle);
        }
        !self.config.silent_invalid_keys
    }

    pub(super) fn begin_recording(&mut self) {
        let slot = self.active_slot;
        self.sink.release_all();
        self.cursor = Cursor::recording(&self.buffer, slot);
        self.got_first_keydown = false;
        debug!("Recording macro {}, {} records free", slot, self.cursor.remaining());
        self.hooks.on_record_start(slot);
    }

    pub(crate) fn record_event(&mut self, keycode: KeyCode, pressed: bool) {
        if !pressed && !self.got_first_keydown {
            debug!("Ignoring a leading key up of {:?}", keycode);
            return;
        }
        self.got_first_keydown = true;

        let slot = self.cursor.slot();
        if self.cursor.at_end() {
            warn!("Macro {} reached the neighbor macro, stop recording", slot);
            let _ = self.transition(MacroState::Idle);
            return;
        }

        *self.buffer.get_mut(slot, self.cursor.position()) = Keypress::new(keycode, pressed);
        self.cursor.advance();
        if !self.cursor.at_end() {
            self.buffer.get_mut(slot, self.cursor.position()).clear();
        }
        trace!("Recorded {:?}, pressed: {} into macro {}", keycode, pressed, slot);
        self.hooks.on_record_key(slot, keycode, pressed);
    }

    /// Drop the held keys at the tail and store the end of the recorded macro
    pub(super) fn end_recording(&mut self) {
        let slot = self.cursor.slot();
        while let Some(pos) = self.cursor.behind() {
            let record = self.buffer.get(slot, pos);
            if !is_trimmable_tail(record) {
                break;
            }
            debug!("Trimming {:?}, pressed: {} from macro {}", record.keycode, record.pressed(), slot);
            self.cursor.retreat();
        }

        if let Err(e) = self.buffer.set_end(slot, self.cursor.position()) {
            error!("Failed to store the end of macro {}: {:?}", slot, e);
        }
        let len = self.buffer.len(slot);
        info!("Macro {} recorded, {} records", slot, len);
        self.hooks.on_record_end(slot, len);
    }
}
