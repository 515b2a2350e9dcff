//! Playback-facing value types: repeat mode, derived state and the snapshot
//! handed to display code.

use crate::library::Track;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Advance through the playlist, wrapping to the first track.
    #[default]
    NoRepeat,
    /// Replay the current track every time it ends.
    RepeatAll,
    /// Replay the current track once more, then stop and fall back to `NoRepeat`.
    RepeatOne,
}

impl RepeatMode {
    /// Next mode in the `NoRepeat -> RepeatAll -> RepeatOne` cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::NoRepeat => Self::RepeatAll,
            Self::RepeatAll => Self::RepeatOne,
            Self::RepeatOne => Self::NoRepeat,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoRepeat => "no repeat",
            Self::RepeatAll => "repeat",
            Self::RepeatOne => "repeat one",
        }
    }
}

/// Engine state, derived from the current track and the play flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing queued.
    Idle,
    /// A track was assigned and the device has not started it yet.
    Loading,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Read-only copy of the session for display consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub state: PlaybackState,
    pub is_playing: bool,
    pub repeat_mode: RepeatMode,
    /// Seconds; 0 when unknown.
    pub duration: f64,
    /// Seconds.
    pub current_time: f64,
}

impl PlaybackSnapshot {
    /// Progress through the current track in percent, 0 when the duration is
    /// unknown.
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}
