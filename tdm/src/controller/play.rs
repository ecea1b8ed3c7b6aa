use embassy_time::Duration;

use super::MacroController;
use crate::cursor::Cursor;
use crate::hooks::MacroHooks;
use crate::scheduler::{Continuation, Rearm, Scheduler, TimerToken};
use crate::sink::KeySink;
use crate::state::MacroState;

/// Result of running the playback until it has to wait
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// The cursor reached the end of the macro
    Finished,
    /// The last emitted key asks for a pause
    Paused(Duration),
}

impl<S: KeySink, T: Scheduler, H: MacroHooks, const NUM_REGIONS: usize, const REGION_SIZE: usize>
    MacroController<S, T, H, NUM_REGIONS, REGION_SIZE>
{
    pub(super) fn start_playing(&mut self) {
        let slot = self.active_slot;
        self.sink.release_all();
        self.hooks.on_play(slot);
        self.clear_tokens();
        self.cursor = Cursor::playback(&self.buffer, slot);
        match self.step() {
            Step::Finished => {
                let _ = self.transition(MacroState::Idle);
            }
            Step::Paused(delay) => self.pause(delay, Continuation::Play { slot }),
        }
    }

    /// Start a loop, or restart the running one from the beginning
    pub(super) fn start_looping(&mut self) {
        let slot = self.active_slot;
        self.hooks.on_play(slot);
        self.sink.release_all();
        self.clear_tokens();
        self.cursor = Cursor::playback(&self.buffer, slot);
        match self.scheduler.schedule(self.config.loop_debounce, Continuation::Loop { slot }) {
            Ok(token) => self.loop_token = Some(token),
            Err(e) => {
                error!("Failed to schedule the loop of macro {}: {:?}", slot, e);
                self.abandon_playback();
            }
        }
    }

    pub(super) fn stop_playing(&mut self) {
        self.sink.release_all();
        self.clear_tokens();
        self.hooks.on_play_stop(self.cursor.slot());
    }

    /// Emit records until the macro ends or a record carries a delay
    fn step(&mut self) -> Step {
        let slot = self.cursor.slot();
        while !self.cursor.at_end() {
            let record = *self.buffer.get(slot, self.cursor.position());
            if record.pressed() {
                self.sink.press(record.keycode);
            } else {
                self.sink.release(record.keycode);
            }
            trace!("Played {:?}, pressed: {}", record.keycode, record.pressed());
            self.cursor.advance();
            if record.delay_ms > 0 {
                return Step::Paused(Duration::from_millis(record.delay_ms as u64));
            }
        }
        Step::Finished
    }

    fn pause(&mut self, delay: Duration, continuation: Continuation) {
        match self.scheduler.schedule(delay, continuation) {
            Ok(token) => {
                debug!("Macro paused for {}ms", delay.as_millis());
                self.delay_token = Some(token);
            }
            Err(e) => {
                error!("Failed to schedule the macro resumption: {:?}", e);
                self.abandon_playback();
            }
        }
    }

    /// Timer callback. Continues the playback the timer belongs to and tells the scheduler
    /// whether to fire again. Timers of a cancelled or finished playback are ignored.
    pub fn on_timer(&mut self, token: TimerToken, continuation: Continuation) -> Rearm {
        if self.delay_token == Some(token) {
            self.delay_token = None;
        } else if self.loop_token == Some(token) {
            self.loop_token = None;
        } else {
            debug!("Ignoring stale macro timer {:?}", token);
            return Rearm::Done;
        }

        match (continuation, self.state) {
            (Continuation::Play { slot }, MacroState::Playing) if slot == self.cursor.slot() => {
                match self.step() {
                    Step::Finished => {
                        let _ = self.transition(MacroState::Idle);
                    }
                    Step::Paused(delay) => self.pause(delay, continuation),
                }
                Rearm::Done
            }
            (Continuation::Loop { slot }, MacroState::Looping) if slot == self.cursor.slot() => match self.step() {
                Step::Finished => {
                    self.cursor.rewind();
                    self.loop_token = Some(token);
                    Rearm::After(self.config.loop_debounce)
                }
                Step::Paused(delay) => {
                    self.pause(delay, continuation);
                    Rearm::Done
                }
            },
            _ => {
                debug!("Macro timer {:?} doesn't match state {}", token, self.state.as_str());
                Rearm::Done
            }
        }
    }

    /// Give up the running playback, e.g. because its timer couldn't be scheduled. The stored
    /// macro is kept.
    pub fn abandon_playback(&mut self) {
        let slot = self.cursor.slot();
        if self.state.is_playing() {
            let _ = self.transition(MacroState::Idle);
        } else {
            self.sink.release_all();
            self.clear_tokens();
        }
        warn!("Playback of macro {} abandoned", slot);
        self.hooks.on_play_abort(slot);
    }
}
