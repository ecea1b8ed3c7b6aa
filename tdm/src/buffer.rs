//! Dual-growth storage for recorded macros.
//!
//! The storage is a fixed array of regions. Each region is shared by two macro slots: the even
//! slot is written left-to-right from the start of the region, its odd neighbor right-to-left
//! from the end.
//!
//! ```text
//!  start(0)      end(0)                end(1)                 start(1)
//!  v             v                     v                      v
//! +------------------------------------------------------------+
//! |>>>>> slot 0 >>>>>                  <<<<<<<<<<< slot 1 <<<<<<|
//! +------------------------------------------------------------+
//! ```
//!
//! Positions are boundaries in `0..=REGION_SIZE`, a slot occupies the records between its start
//! and its end boundary. When a recording reaches its neighbor's end, the region is full. There is
//! no other limit: a region can hold two medium sized macros, or one long and one short, or one
//! that fills everything while the other is empty.

use core::ops::Range;

use tdm_types::keypress::Keypress;

/// Growth direction of a slot inside its region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Low to high index, used by even slots
    Forward,
    /// High to low index, used by odd slots
    Backward,
}

impl Direction {
    pub fn of(slot: u8) -> Self {
        if slot & 1 == 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// `+1` for forward, `-1` for backward
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Move a boundary one record in this direction
    pub(crate) fn advance(self, pos: usize) -> usize {
        match self {
            Direction::Forward => pos + 1,
            Direction::Backward => pos - 1,
        }
    }

    /// Move a boundary one record against this direction
    pub(crate) fn retreat(self, pos: usize) -> usize {
        match self {
            Direction::Forward => pos - 1,
            Direction::Backward => pos + 1,
        }
    }

    /// Index of the record that is written when a cursor at `pos` advances
    pub(crate) fn index(self, pos: usize) -> usize {
        match self {
            Direction::Forward => pos,
            Direction::Backward => pos - 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// The requested end would overlap the neighbor slot or leave the region
    Overlap { slot: u8, end: usize },
}

/// A block of records shared by two slots
struct Region<const N: usize> {
    records: [Keypress; N],
    /// End boundaries of the even and the odd slot
    ends: [usize; 2],
}

impl<const N: usize> Region<N> {
    const fn new() -> Self {
        Self {
            records: [Keypress::EMPTY; N],
            ends: [0, N],
        }
    }
}

/// Fixed-capacity macro storage, `NUM_REGIONS` regions of `REGION_SIZE` records each.
///
/// Slots are numbered `0..2 * NUM_REGIONS`. All methods taking a slot panic if it is out of
/// range, use [`MacroBuffer::NUM_SLOTS`] to validate ids coming from outside.
pub struct MacroBuffer<const NUM_REGIONS: usize, const REGION_SIZE: usize> {
    regions: [Region<REGION_SIZE>; NUM_REGIONS],
}

impl<const NUM_REGIONS: usize, const REGION_SIZE: usize> Default for MacroBuffer<NUM_REGIONS, REGION_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const NUM_REGIONS: usize, const REGION_SIZE: usize> MacroBuffer<NUM_REGIONS, REGION_SIZE> {
    /// Number of macro slots
    pub const NUM_SLOTS: usize = 2 * NUM_REGIONS;

    pub const fn new() -> Self {
        Self {
            regions: [const { Region::new() }; NUM_REGIONS],
        }
    }

    /// The slot sharing a region with `slot`
    pub fn neighbor_of(slot: u8) -> u8 {
        slot ^ 1
    }

    /// The boundary `slot` grows from
    pub fn start_of(slot: u8) -> usize {
        match Direction::of(slot) {
            Direction::Forward => 0,
            Direction::Backward => REGION_SIZE,
        }
    }

    fn region(&self, slot: u8) -> &Region<REGION_SIZE> {
        &self.regions[slot as usize / 2]
    }

    fn region_mut(&mut self, slot: u8) -> &mut Region<REGION_SIZE> {
        &mut self.regions[slot as usize / 2]
    }

    /// The boundary one past the last record of `slot`
    pub fn current_end(&self, slot: u8) -> usize {
        self.region(slot).ends[(slot & 1) as usize]
    }

    /// The number of records `slot` can hold with its neighbor's current content: the distance
    /// between its start and the neighbor's end.
    pub fn capacity_remaining(&self, slot: u8) -> usize {
        Self::start_of(slot).abs_diff(self.current_end(Self::neighbor_of(slot)))
    }

    /// Number of records stored in `slot`
    pub fn len(&self, slot: u8) -> usize {
        Self::start_of(slot).abs_diff(self.current_end(slot))
    }

    pub fn is_empty(&self, slot: u8) -> bool {
        self.len(slot) == 0
    }

    /// Indices of the records `slot` occupies in its region
    pub fn occupied_range(&self, slot: u8) -> Range<usize> {
        let start = Self::start_of(slot);
        let end = self.current_end(slot);
        match Direction::of(slot) {
            Direction::Forward => start..end,
            Direction::Backward => end..start,
        }
    }

    /// Empty every slot
    pub fn reset(&mut self) {
        for region in self.regions.iter_mut() {
            region.ends = [0, REGION_SIZE];
        }
    }

    /// Empty one slot
    pub fn clear(&mut self, slot: u8) {
        self.region_mut(slot).ends[(slot & 1) as usize] = Self::start_of(slot);
    }

    /// Move the end of `slot`.
    ///
    /// The new end must lie between the slot's start and its neighbor's end, otherwise the two
    /// slots would overlap and nothing is changed.
    pub fn set_end(&mut self, slot: u8, end: usize) -> Result<(), BufferError> {
        let start = Self::start_of(slot);
        let limit = self.current_end(Self::neighbor_of(slot));
        let valid = match Direction::of(slot) {
            Direction::Forward => start <= end && end <= limit,
            Direction::Backward => limit <= end && end <= start,
        };
        if !valid {
            return Err(BufferError::Overlap { slot, end });
        }
        self.region_mut(slot).ends[(slot & 1) as usize] = end;
        Ok(())
    }

    /// The record a cursor of `slot` at boundary `pos` reads or writes next
    pub fn get(&self, slot: u8, pos: usize) -> &Keypress {
        &self.region(slot).records[Direction::of(slot).index(pos)]
    }

    pub fn get_mut(&mut self, slot: u8, pos: usize) -> &mut Keypress {
        &mut self.region_mut(slot).records[Direction::of(slot).index(pos)]
    }

    /// Records of `slot` in playback order
    pub fn records(&self, slot: u8) -> impl Iterator<Item = &Keypress> + '_ {
        let dir = Direction::of(slot);
        let start = Self::start_of(slot);
        let records = &self.region(slot).records;
        (0..self.len(slot)).map(move |i| {
            let pos = match dir {
                Direction::Forward => start + i,
                Direction::Backward => start - i,
            };
            &records[dir.index(pos)]
        })
    }
}
