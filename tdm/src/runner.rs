//! Async task around a [`MacroController`].
//!
//! Key events and expired timers are handled in one task, so the controller is never touched
//! from two places at once.

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{Instant, Timer};

use crate::controller::MacroController;
use crate::event::KeyEvent;
use crate::hooks::MacroHooks;
use crate::scheduler::{DeferredExecutor, Rearm, TIMER_SLOTS};
use crate::sink::KeySink;

/// Runs a [`MacroController`] with its own timer table.
///
/// Key events are read from `events`, the ones that should continue down the key pipeline are
/// forwarded to `passthrough`.
pub struct MacroRunner<
    'a,
    M: RawMutex,
    S: KeySink,
    H: MacroHooks,
    const N: usize,
    const NUM_REGIONS: usize,
    const REGION_SIZE: usize,
> {
    controller: MacroController<S, DeferredExecutor<TIMER_SLOTS>, H, NUM_REGIONS, REGION_SIZE>,
    events: Receiver<'a, M, KeyEvent, N>,
    passthrough: Sender<'a, M, KeyEvent, N>,
}

impl<'a, M: RawMutex, S: KeySink, H: MacroHooks, const N: usize, const NUM_REGIONS: usize, const REGION_SIZE: usize>
    MacroRunner<'a, M, S, H, N, NUM_REGIONS, REGION_SIZE>
{
    pub fn new(
        controller: MacroController<S, DeferredExecutor<TIMER_SLOTS>, H, NUM_REGIONS, REGION_SIZE>,
        events: Receiver<'a, M, KeyEvent, N>,
        passthrough: Sender<'a, M, KeyEvent, N>,
    ) -> Self {
        Self {
            controller,
            events,
            passthrough,
        }
    }

    pub fn controller(&self) -> &MacroController<S, DeferredExecutor<TIMER_SLOTS>, H, NUM_REGIONS, REGION_SIZE> {
        &self.controller
    }

    pub fn controller_mut(
        &mut self,
    ) -> &mut MacroController<S, DeferredExecutor<TIMER_SLOTS>, H, NUM_REGIONS, REGION_SIZE> {
        &mut self.controller
    }

    /// Run the macro engine forever
    pub async fn run(&mut self) {
        self.controller.init();
        loop {
            let deadline = self.controller.scheduler().next_deadline();
            let timeout = async {
                match deadline {
                    Some(at) => Timer::at(at).await,
                    None => core::future::pending::<()>().await,
                }
            };

            let result = select(self.events.receive(), timeout).await;
            match result {
                Either::First(event) => self.process_event(event).await,
                Either::Second(()) => {
                    self.fire_expired(Instant::now());
                }
            }
            self.controller.sink_mut().flush().await;
        }
    }

    /// Hand one key event to the controller and forward it if it should propagate
    pub async fn process_event(&mut self, event: KeyEvent) {
        self.controller.scheduler_mut().set_now(Instant::now());
        if self.controller.process_key(event.keycode, event.pressed) {
            self.passthrough.send(event).await;
        }
    }

    /// Run the timers that expired at `now`, returns how many fired.
    ///
    /// Timers re-armed with a zero interval fire on the next call, not in this one.
    pub fn fire_expired(&mut self, now: Instant) -> usize {
        self.controller.scheduler_mut().set_now(now);
        let mut fired = 0;
        for _ in 0..TIMER_SLOTS {
            let Some((token, continuation)) = self.controller.scheduler_mut().pop_expired(now) else {
                break;
            };
            fired += 1;
            if let Rearm::After(interval) = self.controller.on_timer(token, continuation) {
                if let Err(e) = self
                    .controller
                    .scheduler_mut()
                    .rearm(token, continuation, now, interval)
                {
                    error!("Failed to re-arm macro timer: {:?}", e);
                    self.controller.abandon_playback();
                }
            }
        }
        fired
    }
}
