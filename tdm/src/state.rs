use tdm_types::keycode::MacroControl;

/// Mode of the macro engine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroState {
    #[default]
    Idle,
    Recording,
    RecordingDelay,
    Playing,
    Looping,
    Selecting,
}

impl MacroState {
    pub fn as_str(self) -> &'static str {
        match self {
            MacroState::Idle => "idle",
            MacroState::Recording => "recording",
            MacroState::RecordingDelay => "recording_delay",
            MacroState::Playing => "playing",
            MacroState::Looping => "looping",
            MacroState::Selecting => "selecting",
        }
    }

    /// The state a control key asks for when released
    pub fn requested_by(control: MacroControl) -> Self {
        match control {
            MacroControl::Record => MacroState::Recording,
            MacroControl::Delay => MacroState::RecordingDelay,
            MacroControl::End => MacroState::Idle,
            MacroControl::Play => MacroState::Playing,
            MacroControl::Loop => MacroState::Looping,
            MacroControl::Select => MacroState::Selecting,
        }
    }

    /// Playback is running, either once or in a loop
    pub fn is_playing(self) -> bool {
        matches!(self, MacroState::Playing | MacroState::Looping)
    }
}

/// Entry actions of the legal transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    StartRecording,
    StartPlaying,
    StartLooping,
    StartSelecting,
    StartDelayEntry,
    EndRecording,
    EndDelayEntry,
    StopPlaying,
    RestartLooping,
    EndSelecting,
}

impl Transition {
    /// Look up the transition table. `None` means the move is not allowed.
    pub fn between(from: MacroState, to: MacroState) -> Option<Self> {
        use MacroState::*;
        match (from, to) {
            (Idle, Recording) => Some(Transition::StartRecording),
            (Idle, Playing) => Some(Transition::StartPlaying),
            (Idle, Looping) => Some(Transition::StartLooping),
            (Idle, Selecting) => Some(Transition::StartSelecting),
            (Recording, RecordingDelay) => Some(Transition::StartDelayEntry),
            (Recording, Idle) => Some(Transition::EndRecording),
            (RecordingDelay, Recording) => Some(Transition::EndDelayEntry),
            (Playing, Idle) => Some(Transition::StopPlaying),
            (Looping, Looping) => Some(Transition::RestartLooping),
            (Looping, Idle) => Some(Transition::StopPlaying),
            (Selecting, Idle) => Some(Transition::EndSelecting),
            _ => None,
        }
    }
}

/// A transition that isn't in the table was requested
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitionError {
    pub from: MacroState,
    pub to: MacroState,
}
