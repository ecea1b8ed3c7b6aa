//! One-shot deferred callbacks used to resume playback after a delay.

use embassy_time::{Duration, Instant};
use heapless::Vec;

/// Timers a controller needs at most: one for the delay inside a macro, one for the loop restart
pub const TIMER_SLOTS: usize = 2;

/// Handle of a scheduled callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerToken(pub u16);

/// What to do when a timer fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Continuation {
    /// Continue a single playback of the slot
    Play { slot: u8 },
    /// Continue or restart a looping playback of the slot
    Loop { slot: u8 },
}

/// Answer of a timer callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rearm {
    Done,
    /// Fire the same token and continuation again after the interval
    After(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// No free timer slot
    Full,
}

/// Single-shot delayed callbacks.
pub trait Scheduler {
    /// Run `continuation` once after `delay`
    fn schedule(&mut self, delay: Duration, continuation: Continuation) -> Result<TimerToken, ScheduleError>;

    /// Drop a pending callback. Unknown or already fired tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    token: TimerToken,
    deadline: Instant,
    continuation: Continuation,
}

/// A fixed-size timer table driven by the caller's clock.
///
/// The executor never waits by itself: the owner asks for [`DeferredExecutor::next_deadline`],
/// sleeps until then, updates the clock with [`DeferredExecutor::set_now`] and collects the
/// expired entries with [`DeferredExecutor::pop_expired`].
pub struct DeferredExecutor<const N: usize> {
    entries: Vec<Entry, N>,
    next_token: u16,
    now: Instant,
}

impl<const N: usize> Default for DeferredExecutor<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeferredExecutor<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_token: 0,
            now: Instant::from_ticks(0),
        }
    }

    /// Base time for the delays of following [`Scheduler::schedule`] calls
    pub fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Number of pending callbacks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.entries.iter().any(|e| e.token == token)
    }

    /// Earliest deadline of all pending callbacks
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest callback whose deadline is not after `now`
    pub fn pop_expired(&mut self, now: Instant) -> Option<(TimerToken, Continuation)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| e.deadline)
            .map(|(i, _)| i)?;
        let entry = self.entries.swap_remove(index);
        Some((entry.token, entry.continuation))
    }

    /// Put a fired callback back with its original token, `delay` after `now`
    pub fn rearm(
        &mut self,
        token: TimerToken,
        continuation: Continuation,
        now: Instant,
        delay: Duration,
    ) -> Result<(), ScheduleError> {
        self.entries
            .push(Entry {
                token,
                deadline: now + delay,
                continuation,
            })
            .map_err(|_| ScheduleError::Full)
    }
}

impl<const N: usize> Scheduler for DeferredExecutor<N> {
    fn schedule(&mut self, delay: Duration, continuation: Continuation) -> Result<TimerToken, ScheduleError> {
        let token = TimerToken(self.next_token);
        let entry = Entry {
            token,
            deadline: self.now + delay,
            continuation,
        };
        self.entries.push(entry).map_err(|_| ScheduleError::Full)?;
        self.next_token = self.next_token.wrapping_add(1);
        Ok(token)
    }

    fn cancel(&mut self, token: TimerToken) {
        self.entries.retain(|e| e.token != token);
    }
}
