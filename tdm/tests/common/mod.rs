#![allow(dead_code)]

use embassy_time::Duration;
use tdm::config::TdmConfig;
use tdm::controller::MacroController;
use tdm::hooks::MacroHooks;
use tdm::scheduler::{Continuation, Rearm, ScheduleError, Scheduler, TimerToken};
use tdm::sink::KeySink;
use tdm::types::keycode::{KeyCode, MacroControl};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Press(KeyCode),
    Release(KeyCode),
    ReleaseAll,
}

/// Sink that remembers everything it was asked to do
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Presses and releases, without the release-all calls
    pub fn keys(&self) -> Vec<SinkEvent> {
        self.events
            .iter()
            .copied()
            .filter(|e| *e != SinkEvent::ReleaseAll)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl KeySink for RecordingSink {
    fn press(&mut self, keycode: KeyCode) {
        self.events.push(SinkEvent::Press(keycode));
    }

    fn release(&mut self, keycode: KeyCode) {
        self.events.push(SinkEvent::Release(keycode));
    }

    fn release_all(&mut self) {
        self.events.push(SinkEvent::ReleaseAll);
    }
}

/// Scheduler whose timers only fire when the test says so
#[derive(Default)]
pub struct ManualScheduler {
    pub pending: Vec<(TimerToken, Duration, Continuation)>,
    pub cancelled: Vec<TimerToken>,
    /// Refuse every new timer
    pub fail: bool,
    next_token: u16,
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, continuation: Continuation) -> Result<TimerToken, ScheduleError> {
        if self.fail {
            return Err(ScheduleError::Full);
        }
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push((token, delay, continuation));
        Ok(token)
    }

    fn cancel(&mut self, token: TimerToken) {
        self.cancelled.push(token);
        self.pending.retain(|(t, _, _)| *t != token);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Init,
    RecordStart(u8),
    RecordEnd(u8, usize),
    Play(u8),
    PlayStop(u8),
    PlayAbort(u8),
}

/// Hooks that log which callbacks ran
#[derive(Default)]
pub struct HookLog {
    pub events: Vec<HookEvent>,
}

impl MacroHooks for HookLog {
    fn on_init(&mut self) {
        self.events.push(HookEvent::Init);
    }

    fn on_record_start(&mut self, slot: u8) {
        self.events.push(HookEvent::RecordStart(slot));
    }

    fn on_record_end(&mut self, slot: u8, len: usize) {
        self.events.push(HookEvent::RecordEnd(slot, len));
    }

    fn on_play(&mut self, slot: u8) {
        self.events.push(HookEvent::Play(slot));
    }

    fn on_play_stop(&mut self, slot: u8) {
        self.events.push(HookEvent::PlayStop(slot));
    }

    fn on_play_abort(&mut self, slot: u8) {
        self.events.push(HookEvent::PlayAbort(slot));
    }
}

pub type TestController<const NUM_REGIONS: usize, const REGION_SIZE: usize> =
    MacroController<RecordingSink, ManualScheduler, HookLog, NUM_REGIONS, REGION_SIZE>;

pub fn new_controller<const NUM_REGIONS: usize, const REGION_SIZE: usize>() -> TestController<NUM_REGIONS, REGION_SIZE> {
    with_config(TdmConfig::default())
}

pub fn with_config<const NUM_REGIONS: usize, const REGION_SIZE: usize>(
    config: TdmConfig,
) -> TestController<NUM_REGIONS, REGION_SIZE> {
    let mut controller = MacroController::new(
        RecordingSink::default(),
        ManualScheduler::default(),
        HookLog::default(),
        config,
    );
    controller.init();
    controller
}

/// Press and release a key, returns whether each event propagates
pub fn tap<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>, key: impl Into<KeyCode>) -> (bool, bool) {
    let key = key.into();
    (c.process_key(key, true), c.process_key(key, false))
}

pub fn press<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>, key: impl Into<KeyCode>) -> bool {
    c.process_key(key.into(), true)
}

pub fn release<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>, key: impl Into<KeyCode>) -> bool {
    c.process_key(key.into(), false)
}

/// Type a number on the number row
pub fn type_number<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>, digits: &str) {
    use tdm::types::keycode::HidKeyCode;
    for d in digits.bytes() {
        let key = match d {
            b'0' => HidKeyCode::KC_0,
            b'1'..=b'9' => HidKeyCode(HidKeyCode::KC_1.0 + d - b'1'),
            _ => panic!("not a digit: {}", d),
        };
        tap(c, key);
    }
}

/// Select `slot`, record `events` into it and stop the recording
pub fn record<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>, slot: u8, events: &[(KeyCode, bool)]) {
    assert!(c.select_slot(slot));
    tap(c, MacroControl::Record);
    for (key, pressed) in events {
        c.process_key(*key, *pressed);
    }
    tap(c, MacroControl::End);
}

/// Fire the oldest pending timer, re-arming it if the controller asks to. Returns the delay the
/// timer was scheduled with.
pub fn fire_next<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>) -> Option<Duration> {
    if c.scheduler().pending.is_empty() {
        return None;
    }
    let (token, delay, continuation) = c.scheduler_mut().pending.remove(0);
    if let Rearm::After(interval) = c.on_timer(token, continuation) {
        c.scheduler_mut().pending.push((token, interval, continuation));
    }
    Some(delay)
}

/// Press and release events of a tap
pub fn tap_events(key: impl Into<KeyCode>) -> [(KeyCode, bool); 2] {
    let key = key.into();
    [(key, true), (key, false)]
}

/// What a sink sees when the events of a tap are replayed
pub fn played_tap(key: impl Into<KeyCode>) -> [SinkEvent; 2] {
    let key = key.into();
    [SinkEvent::Press(key), SinkEvent::Release(key)]
}
