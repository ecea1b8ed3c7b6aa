//! The macro engine: owns the buffer, runs the state machine and drives playback.

mod delay;
mod play;
mod record;
mod select;

use tdm_types::keycode::KeyCode;

use crate::buffer::MacroBuffer;
use crate::classifier::KeyClass;
use crate::config::{DEFAULT_NUM_REGIONS, DEFAULT_REGION_SIZE, TdmConfig};
use crate::cursor::Cursor;
use crate::hooks::{LogHooks, MacroHooks};
use crate::scheduler::{Scheduler, TimerToken};
use crate::sink::KeySink;
use crate::state::{MacroState, Transition, TransitionError};

/// Temporal dynamic macro engine.
///
/// Feed every key event to [`MacroController::process_key`] and every fired timer to
/// [`MacroController::on_timer`]. Both take `&mut self`, the owner decides how the two are
/// serialized (see [`MacroRunner`](crate::runner::MacroRunner)).
///
/// The storage holds `2 * NUM_REGIONS` macros, each pair shares `REGION_SIZE` records.
pub struct MacroController<
    S: KeySink,
    T: Scheduler,
    H: MacroHooks = LogHooks,
    const NUM_REGIONS: usize = { DEFAULT_NUM_REGIONS },
    const REGION_SIZE: usize = { DEFAULT_REGION_SIZE },
> {
    buffer: MacroBuffer<NUM_REGIONS, REGION_SIZE>,
    /// Position of the running recording or playback
    cursor: Cursor,
    state: MacroState,
    /// Slot used by the next record, play or loop
    active_slot: u8,
    /// Milliseconds typed so far in delay entry
    delay_acc: u32,
    /// Number typed so far in selection
    selection: u32,
    /// A key down was recorded in this session, key ups before it are dropped
    got_first_keydown: bool,
    /// Pending resumption after a delay inside the macro
    delay_token: Option<TimerToken>,
    /// Pending restart of a looping macro
    loop_token: Option<TimerToken>,
    config: TdmConfig,
    sink: S,
    scheduler: T,
    hooks: H,
}

impl<S: KeySink, T: Scheduler, H: MacroHooks, const NUM_REGIONS: usize, const REGION_SIZE: usize>
    MacroController<S, T, H, NUM_REGIONS, REGION_SIZE>
{
    /// Number of macro slots
    pub const NUM_SLOTS: usize = MacroBuffer::<NUM_REGIONS, REGION_SIZE>::NUM_SLOTS;

    pub fn new(sink: S, scheduler: T, hooks: H, config: TdmConfig) -> Self {
        const {
            assert!(NUM_REGIONS > 0, "at least one region is required");
            assert!(2 * NUM_REGIONS <= u8::MAX as usize, "too many regions");
        }
        Self {
            buffer: MacroBuffer::new(),
            cursor: Cursor::default(),
            state: MacroState::Idle,
            active_slot: 0,
            delay_acc: 0,
            selection: 0,
            got_first_keydown: false,
            delay_token: None,
            loop_token: None,
            config,
            sink,
            scheduler,
            hooks,
        }
    }

    /// Empty all slots, go back to idle and fire the init hook
    pub fn init(&mut self) {
        self.clear_tokens();
        self.buffer.reset();
        self.cursor = Cursor::default();
        self.state = MacroState::Idle;
        self.active_slot = 0;
        self.delay_acc = 0;
        self.selection = 0;
        self.got_first_keydown = false;
        self.hooks.on_init();
    }

    pub fn state(&self) -> MacroState {
        self.state
    }

    pub fn active_slot(&self) -> u8 {
        self.active_slot
    }

    pub fn buffer(&self) -> &MacroBuffer<NUM_REGIONS, REGION_SIZE> {
        &self.buffer
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn config(&self) -> &TdmConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Make `slot` the active slot. Only possible while idle, returns `false` for an unknown slot
    /// or a busy engine.
    pub fn select_slot(&mut self, slot: u8) -> bool {
        if slot as usize >= Self::NUM_SLOTS || self.state != MacroState::Idle {
            return false;
        }
        self.active_slot = slot;
        true
    }

    fn last_slot() -> u8 {
        (Self::NUM_SLOTS - 1) as u8
    }

    /// Handle a key event. Returns `true` if the event should continue down the key pipeline.
    ///
    /// Control keys act on release and are never propagated, unless they request a transition
    /// the current state doesn't allow and `silent_invalid_keys` is off. Layer keys always pass.
    pub fn process_key(&mut self, keycode: KeyCode, pressed: bool) -> bool {
        match KeyClass::of(keycode) {
            KeyClass::Control(control) => {
                if pressed {
                    return false;
                }
                match self.transition(MacroState::requested_by(control)) {
                    Ok(()) => false,
                    Err(_) => !self.config.silent_invalid_keys,
                }
            }
            KeyClass::Layer => true,
            class => match self.state {
                MacroState::Idle | MacroState::Playing | MacroState::Looping => true,
                MacroState::Recording => self.process_recording_key(keycode, pressed),
                MacroState::RecordingDelay => self.process_delay_key(class, pressed),
                MacroState::Selecting => self.process_selection_key(class, pressed),
            },
        }
    }

    /// Move the state machine to `to`, running the entry action of the transition.
    ///
    /// The new state is set before the entry action runs, so the action may request another
    /// transition. A transition that isn't allowed leaves everything untouched.
    pub fn transition(&mut self, to: MacroState) -> Result<(), TransitionError> {
        let from = self.state;
        let Some(transition) = Transition::between(from, to) else {
            warn!("Invalid macro transition: {} -> {}", from.as_str(), to.as_str());
            return Err(TransitionError { from, to });
        };

        info!("Macro transition: {} -> {}", from.as_str(), to.as_str());
        self.state = to;
        match transition {
            Transition::StartRecording => self.begin_recording(),
            Transition::EndRecording => self.end_recording(),
            Transition::StartDelayEntry => self.begin_delay_entry(),
            Transition::EndDelayEntry => self.end_delay_entry(),
            Transition::StartPlaying => self.start_playing(),
            Transition::StartLooping | Transition::RestartLooping => self.start_looping(),
            Transition::StopPlaying => self.stop_playing(),
            Transition::StartSelecting => self.begin_selection(),
            Transition::EndSelecting => self.end_selection(),
        }
        Ok(())
    }

    /// Cancel both pending timers, if any
    fn clear_tokens(&mut self) {
        if let Some(token) = self.delay_token.take() {
            self.scheduler.cancel(token);
        }
        if let Some(token) = self.loop_token.take() {
            self.scheduler.cancel(token);
        }
    }

    /// Log the state and the content of every slot
    pub fn dump(&self) {
        debug!(
            "Macro engine: state {}, active slot {}",
            self.state.as_str(),
            self.active_slot
        );
        for slot in 0..Self::NUM_SLOTS as u8 {
            debug!(
                "Macro {}: end {}, {} records, {} free",
                slot,
                self.buffer.current_end(slot),
                self.buffer.len(slot),
                self.buffer.capacity_remaining(slot) - self.buffer.len(slot)
            );
            for record in self.buffer.records(slot) {
                debug!(
                    "  {:?} pressed: {}, delay: {}ms",
                    record.keycode,
                    record.pressed(),
                    record.delay_ms
                );
            }
        }
    }
}
