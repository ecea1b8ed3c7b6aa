use embassy_time::Duration;

/// Default number of buffer regions, every region holds two macro slots
pub const DEFAULT_NUM_REGIONS: usize = 1;

/// Default number of keypress records in one region.
///
/// Each key stroke takes two records, one for the key down and one for the key up, so a region
/// of 50 holds 25 taps shared between its two slots.
pub const DEFAULT_REGION_SIZE: usize = 50;

/// Longest delay that can be typed in during delay entry: 2 hours
pub const MAX_DELAY_MS: u32 = 2 * 60 * 60 * 1000;

/// Default pause between two iterations of a looping macro
pub const DEFAULT_LOOP_DEBOUNCE: Duration = Duration::from_millis(100);

/// Config for the temporal dynamic macro engine.
///
/// The storage geometry is fixed at compile time through the const generics of
/// [`MacroController`](crate::controller::MacroController), this struct carries the rest.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TdmConfig {
    /// Keys captured while recording are not sent to the rest of the pipeline
    pub silent_recorded_keys: bool,
    /// Keys that the current mode doesn't accept are not sent to the rest of the pipeline
    pub silent_invalid_keys: bool,
    /// Pause between two iterations of a looping macro
    pub loop_debounce: Duration,
}

impl Default for TdmConfig {
    fn default() -> Self {
        Self {
            silent_recorded_keys: false,
            silent_invalid_keys: true,
            loop_debounce: DEFAULT_LOOP_DEBOUNCE,
        }
    }
}
