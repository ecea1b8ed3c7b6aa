//! Where recorded keys go when a macro is replayed.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use heapless::Deque;
use tdm_types::keycode::{HidKeyCode, KeyCode};
use usbd_hid::descriptor::KeyboardReport;

/// Key emission as seen by the host.
///
/// `press`, `release` and `release_all` are called from the synchronous key and timer paths, so
/// they must not block. Sinks that need to await a transport buffer the change and deliver it in
/// [`KeySink::flush`], which the runner calls after each event.
pub trait KeySink {
    fn press(&mut self, keycode: KeyCode);

    fn release(&mut self, keycode: KeyCode);

    /// Release every key that is currently held
    fn release_all(&mut self);

    /// Deliver the buffered changes
    fn flush(&mut self) -> impl Future<Output = ()> {
        async {}
    }
}

/// Snapshot of a 6KRO keyboard report: modifier bits and six keycode slots
type ReportState = (u8, [u8; 6]);

/// A [`KeySink`] that keeps a 6KRO keyboard report and sends every change of it to a channel.
///
/// Reports are queued until [`KeySink::flush`]. If more than `N` changes pile up without a
/// flush, the oldest ones are dropped.
pub struct HidReportSink<'a, M: RawMutex, const CAP: usize, const N: usize = 8> {
    sender: Sender<'a, M, KeyboardReport, CAP>,
    /// Modifier bits
    held_modifiers: u8,
    /// Six keycode slots, 0 is free
    held_keycodes: [u8; 6],
    pending: Deque<ReportState, N>,
}

impl<'a, M: RawMutex, const CAP: usize, const N: usize> HidReportSink<'a, M, CAP, N> {
    pub fn new(sender: Sender<'a, M, KeyboardReport, CAP>) -> Self {
        Self {
            sender,
            held_modifiers: 0,
            held_keycodes: [0; 6],
            pending: Deque::new(),
        }
    }

    pub fn held_modifiers(&self) -> u8 {
        self.held_modifiers
    }

    pub fn held_keycodes(&self) -> [u8; 6] {
        self.held_keycodes
    }

    /// Number of reports waiting for a flush
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn hid_keycode(keycode: KeyCode) -> Option<HidKeyCode> {
        match keycode {
            KeyCode::Hid(k) if k != HidKeyCode::NO => Some(k),
            _ => {
                warn!("Keycode {:?} has no HID usage, skipped", keycode);
                None
            }
        }
    }

    fn push_report(&mut self) {
        let state = (self.held_modifiers, self.held_keycodes);
        if self.pending.is_full() {
            warn!("HID report queue full, dropping the oldest report");
            self.pending.pop_front();
        }
        // The queue has room after popping
        let _ = self.pending.push_back(state);
    }
}

impl<M: RawMutex, const CAP: usize, const N: usize> KeySink for HidReportSink<'_, M, CAP, N> {
    fn press(&mut self, keycode: KeyCode) {
        let Some(key) = Self::hid_keycode(keycode) else {
            return;
        };
        if key.is_modifier() {
            self.held_modifiers |= key.modifier_bit();
        } else if self.held_keycodes.contains(&key.0) {
            return;
        } else if let Some(index) = self.held_keycodes.iter().position(|&k| k == 0) {
            self.held_keycodes[index] = key.0;
        } else {
            warn!("All 6 keycode slots are in use, {:?} is not sent", key);
            return;
        }
        self.push_report();
    }

    fn release(&mut self, keycode: KeyCode) {
        let Some(key) = Self::hid_keycode(keycode) else {
            return;
        };
        if key.is_modifier() {
            self.held_modifiers &= !key.modifier_bit();
        } else if let Some(index) = self.held_keycodes.iter().position(|&k| k == key.0) {
            self.held_keycodes[index] = 0;
        } else {
            return;
        }
        self.push_report();
    }

    fn release_all(&mut self) {
        if self.held_modifiers == 0 && self.held_keycodes == [0; 6] {
            return;
        }
        self.held_modifiers = 0;
        self.held_keycodes = [0; 6];
        self.push_report();
    }

    async fn flush(&mut self) {
        while let Some((modifier, keycodes)) = self.pending.pop_front() {
            self.sender
                .send(KeyboardReport {
                    modifier,
                    reserved: 0,
                    leds: 0,
                    keycodes,
                })
                .await;
        }
    }
}
