pub mod common;

use common::*;
use embassy_time::Duration;
use tdm::TdmConfig;
use tdm::scheduler::{Continuation, Rearm};
use tdm::state::{MacroState, TransitionError};
use tdm::types::keycode::{HidKeyCode, KeyCode, MacroControl};

/// Record `A`, a delay of `delay` ms, then `B` into `slot`
fn record_with_delay<const NR: usize, const RS: usize>(c: &mut TestController<NR, RS>, slot: u8, delay: &str) {
    assert!(c.select_slot(slot));
    tap(c, MacroControl::Record);
    tap(c, HidKeyCode::A);
    tap(c, MacroControl::Delay);
    assert_eq!(c.state(), MacroState::RecordingDelay);
    type_number(c, delay);
    tap(c, MacroControl::Record);
    assert_eq!(c.state(), MacroState::Recording);
    tap(c, HidKeyCode::B);
    tap(c, MacroControl::End);
    assert_eq!(c.state(), MacroState::Idle);
    c.sink_mut().clear();
}

#[test]
fn test_delay_fidelity() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "150");
    let delays: Vec<u32> = c.buffer().records(0).map(|r| r.delay_ms).collect();
    assert_eq!(delays, [0, 150, 0, 0]);

    tap(&mut c, MacroControl::Play);
    assert_eq!(c.state(), MacroState::Playing);
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));
    assert_eq!(c.scheduler().pending.len(), 1);
    assert_eq!(c.scheduler().pending[0].2, Continuation::Play { slot: 0 });

    assert_eq!(fire_next(&mut c), Some(Duration::from_millis(150)));
    assert_eq!(
        c.sink().keys(),
        [played_tap(HidKeyCode::A), played_tap(HidKeyCode::B)].concat()
    );
    assert_eq!(c.state(), MacroState::Idle);
    assert!(c.scheduler().pending.is_empty());
    assert_eq!(c.hooks().events.last(), Some(&HookEvent::PlayStop(0)));
}

#[test]
fn test_keys_pass_while_playing() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "1000");
    tap(&mut c, MacroControl::Play);
    assert_eq!(tap(&mut c, HidKeyCode::X), (true, true));
    assert_eq!(tap(&mut c, HidKeyCode::KC_1), (true, true));
    assert_eq!(c.state(), MacroState::Playing);
}

#[test]
fn test_trailing_delay_is_honoured() {
    let mut c = new_controller::<1, 20>();
    tap(&mut c, MacroControl::Record);
    tap(&mut c, HidKeyCode::A);
    tap(&mut c, MacroControl::Delay);
    type_number(&mut c, "40");
    tap(&mut c, MacroControl::Record);
    tap(&mut c, MacroControl::End);
    c.sink_mut().clear();

    tap(&mut c, MacroControl::Play);
    assert_eq!(c.state(), MacroState::Playing);
    assert_eq!(fire_next(&mut c), Some(Duration::from_millis(40)));
    assert_eq!(c.state(), MacroState::Idle);
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));
}

#[test]
fn test_stop_is_idempotent() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "500");
    tap(&mut c, MacroControl::Play);
    let token = c.scheduler().pending[0].0;

    tap(&mut c, MacroControl::End);
    assert_eq!(c.state(), MacroState::Idle);
    assert!(c.scheduler().pending.is_empty());
    assert!(c.scheduler().cancelled.contains(&token));
    assert_eq!(c.sink().events.last(), Some(&SinkEvent::ReleaseAll));

    let sink_events = c.sink().events.len();
    let hook_events = c.hooks().events.len();
    assert_eq!(
        c.transition(MacroState::Idle),
        Err(TransitionError {
            from: MacroState::Idle,
            to: MacroState::Idle
        })
    );
    tap(&mut c, MacroControl::End);
    assert_eq!(c.state(), MacroState::Idle);
    assert_eq!(c.sink().events.len(), sink_events);
    assert_eq!(c.hooks().events.len(), hook_events);
}

#[test]
fn test_stale_timer_is_ignored() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "500");
    tap(&mut c, MacroControl::Play);
    let (token, _, continuation) = c.scheduler().pending[0];
    tap(&mut c, MacroControl::End);
    c.sink_mut().clear();

    assert_eq!(c.on_timer(token, continuation), Rearm::Done);
    assert!(c.sink().events.is_empty());

    // A new session doesn't accept the timer of the old one either
    tap(&mut c, MacroControl::Play);
    assert_eq!(c.on_timer(token, continuation), Rearm::Done);
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));
    assert_eq!(c.state(), MacroState::Playing);
}

#[test]
fn test_loop_never_ends_by_itself() {
    let mut c = new_controller::<1, 20>();
    record(&mut c, 0, &tap_events(HidKeyCode::A));
    c.sink_mut().clear();

    tap(&mut c, MacroControl::Loop);
    assert_eq!(c.state(), MacroState::Looping);
    // The first iteration starts after the debounce
    assert!(c.sink().keys().is_empty());

    let debounce = TdmConfig::default().loop_debounce;
    for _ in 0..20 {
        assert_eq!(fire_next(&mut c), Some(debounce));
        assert_eq!(c.state(), MacroState::Looping);
        assert_eq!(c.scheduler().pending.len(), 1);
    }
    let expected: Vec<SinkEvent> = (0..20).flat_map(|_| played_tap(HidKeyCode::A)).collect();
    assert_eq!(c.sink().keys(), expected);

    tap(&mut c, MacroControl::End);
    assert_eq!(c.state(), MacroState::Idle);
    assert!(c.scheduler().pending.is_empty());
}

#[test]
fn test_loop_with_delays() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "30");

    tap(&mut c, MacroControl::Loop);
    let debounce = TdmConfig::default().loop_debounce;
    for _ in 0..3 {
        assert_eq!(fire_next(&mut c), Some(debounce));
        assert_eq!(fire_next(&mut c), Some(Duration::from_millis(30)));
    }
    assert_eq!(c.state(), MacroState::Looping);
    assert_eq!(c.sink().keys().len(), 12);
}

#[test]
fn test_loop_restart() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "30");
    tap(&mut c, MacroControl::Loop);
    fire_next(&mut c);
    let first = c.scheduler().pending[0].0;
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));

    // Loop again while looping starts over from the first key
    tap(&mut c, MacroControl::Loop);
    assert_eq!(c.state(), MacroState::Looping);
    assert!(c.scheduler().cancelled.contains(&first));
    assert_eq!(c.scheduler().pending.len(), 1);
    assert!(c.cursor().at_start());
    assert_eq!(
        c.hooks().events.iter().filter(|e| **e == HookEvent::Play(0)).count(),
        2
    );
}

#[test]
fn test_scheduler_failure_aborts_playback() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "150");
    c.scheduler_mut().fail = true;

    tap(&mut c, MacroControl::Play);
    assert_eq!(c.state(), MacroState::Idle);
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));
    assert_eq!(c.sink().events.last(), Some(&SinkEvent::ReleaseAll));
    assert_eq!(c.hooks().events.last(), Some(&HookEvent::PlayAbort(0)));
    // The macro is untouched
    assert_eq!(c.buffer().len(0), 4);

    tap(&mut c, MacroControl::Loop);
    assert_eq!(c.state(), MacroState::Idle);
    assert_eq!(c.hooks().events.last(), Some(&HookEvent::PlayAbort(0)));

    // Playback works again once the scheduler recovers
    c.scheduler_mut().fail = false;
    c.sink_mut().clear();
    tap(&mut c, MacroControl::Play);
    fire_next(&mut c);
    assert_eq!(c.sink().keys().len(), 4);
}

#[test]
fn test_scheduler_failure_inside_loop() {
    let mut c = new_controller::<1, 20>();
    record_with_delay(&mut c, 0, "30");
    tap(&mut c, MacroControl::Loop);
    assert_eq!(c.state(), MacroState::Looping);

    // The first iteration pauses after `A` and can't schedule the rest
    c.scheduler_mut().fail = true;
    fire_next(&mut c);
    assert_eq!(c.state(), MacroState::Idle);
    assert!(c.scheduler().pending.is_empty());
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));
    assert_eq!(c.sink().events.last(), Some(&SinkEvent::ReleaseAll));
    assert_eq!(c.hooks().events.last(), Some(&HookEvent::PlayAbort(0)));
    assert_eq!(c.buffer().len(0), 4);
}

#[test]
fn test_selection_is_clamped() {
    let mut c = new_controller::<1, 20>();
    tap(&mut c, MacroControl::Select);
    assert_eq!(c.state(), MacroState::Selecting);
    type_number(&mut c, "5");
    tap(&mut c, MacroControl::End);
    assert_eq!(c.active_slot(), 1);

    tap(&mut c, MacroControl::Select);
    type_number(&mut c, "0");
    tap(&mut c, MacroControl::End);
    assert_eq!(c.active_slot(), 0);

    // A huge number saturates instead of wrapping around to a valid slot
    tap(&mut c, MacroControl::Select);
    type_number(&mut c, "4294967296");
    tap(&mut c, MacroControl::End);
    assert_eq!(c.active_slot(), 1);
}

#[test]
fn test_play_selected_slot() {
    let mut c = new_controller::<1, 20>();
    record(&mut c, 0, &tap_events(HidKeyCode::A));
    record(&mut c, 1, &tap_events(HidKeyCode::B));
    c.sink_mut().clear();

    tap(&mut c, MacroControl::Select);
    type_number(&mut c, "0");
    tap(&mut c, MacroControl::End);
    tap(&mut c, MacroControl::Play);
    assert_eq!(c.sink().keys(), played_tap(HidKeyCode::A));
}

#[test]
fn test_invalid_transitions() {
    let mut c = new_controller::<1, 20>();
    // Delay and end only make sense while recording
    assert_eq!(tap(&mut c, MacroControl::Delay), (false, false));
    assert_eq!(c.state(), MacroState::Idle);
    assert_eq!(c.hooks().events, [HookEvent::Init]);

    let mut loud = with_config::<1, 20>(TdmConfig {
        silent_invalid_keys: false,
        ..Default::default()
    });
    assert_eq!(tap(&mut loud, MacroControl::End), (false, true));

    tap(&mut c, MacroControl::Record);
    tap(&mut c, MacroControl::Play);
    assert_eq!(c.state(), MacroState::Recording);
    tap(&mut c, MacroControl::Delay);
    tap(&mut c, MacroControl::Loop);
    assert_eq!(c.state(), MacroState::RecordingDelay);
    tap(&mut c, MacroControl::Select);
    assert_eq!(c.state(), MacroState::RecordingDelay);
}

#[test]
fn test_invalid_key_in_delay_entry() {
    let mut c = new_controller::<1, 20>();
    tap(&mut c, MacroControl::Record);
    tap(&mut c, HidKeyCode::A);
    tap(&mut c, MacroControl::Delay);
    type_number(&mut c, "25");
    // Any other key goes back to recording when released
    assert!(!c.process_key(KeyCode::Hid(HidKeyCode::SPACE), true));
    assert!(!c.process_key(KeyCode::Hid(HidKeyCode::SPACE), false));
    assert_eq!(c.state(), MacroState::Recording);
    tap(&mut c, MacroControl::End);

    let delays: Vec<u32> = c.buffer().records(0).map(|r| r.delay_ms).collect();
    assert_eq!(delays, [0, 25]);
}
