use crate::buffer::{Direction, MacroBuffer};

/// Read/write position inside one slot, rebuilt every time a recording or a playback starts.
///
/// `start` and `end` are boundaries as described in [`crate::buffer`]. While recording, `end` is
/// the neighbor's end, so the cursor stops where the free space stops. While playing, `end` is
/// the slot's own end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub(crate) slot: u8,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) position: usize,
    pub(crate) direction: Direction,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            slot: 0,
            start: 0,
            end: 0,
            position: 0,
            direction: Direction::Forward,
        }
    }
}

impl Cursor {
    /// Cursor for recording into `slot`, limited by the space the neighbor leaves free
    pub fn recording<const NUM_REGIONS: usize, const REGION_SIZE: usize>(
        buffer: &MacroBuffer<NUM_REGIONS, REGION_SIZE>,
        slot: u8,
    ) -> Self {
        let start = MacroBuffer::<NUM_REGIONS, REGION_SIZE>::start_of(slot);
        let neighbor = MacroBuffer::<NUM_REGIONS, REGION_SIZE>::neighbor_of(slot);
        Self {
            slot,
            start,
            end: buffer.current_end(neighbor),
            position: start,
            direction: Direction::of(slot),
        }
    }

    /// Cursor for replaying the records of `slot`
    pub fn playback<const NUM_REGIONS: usize, const REGION_SIZE: usize>(
        buffer: &MacroBuffer<NUM_REGIONS, REGION_SIZE>,
        slot: u8,
    ) -> Self {
        let start = MacroBuffer::<NUM_REGIONS, REGION_SIZE>::start_of(slot);
        Self {
            slot,
            start,
            end: buffer.current_end(slot),
            position: start,
            direction: Direction::of(slot),
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn rewind(&mut self) {
        self.position = self.start;
    }

    pub fn at_start(&self) -> bool {
        self.position == self.start
    }

    pub fn at_end(&self) -> bool {
        self.position == self.end
    }

    /// Number of records between the cursor and its end
    pub fn remaining(&self) -> usize {
        self.position.abs_diff(self.end)
    }

    /// Step one record forward in the slot's direction, saturating at the end
    pub fn advance(&mut self) {
        if !self.at_end() {
            self.position = self.direction.advance(self.position);
        }
    }

    /// Step one record back toward the start, saturating at the start
    pub fn retreat(&mut self) {
        if !self.at_start() {
            self.position = self.direction.retreat(self.position);
        }
    }

    /// Boundary position of the record just behind the cursor, `None` at the start
    pub fn behind(&self) -> Option<usize> {
        if self.at_start() {
            None
        } else {
            Some(self.direction.retreat(self.position))
        }
    }
}
