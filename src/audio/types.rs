//! Messages exchanged with the output device.
//!
//! Commands flow from the device handle to the audio thread; events flow
//! back to whoever drives the playback engine. Every event names the source
//! it originated from so stale notifications can be told apart from current
//! ones.

use crate::error::DeviceError;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Source decoded; `duration` is in seconds, 0 when unknown.
    MetadataLoaded { source: String, duration: f64 },
    /// Playback progressed to `position` seconds.
    TimeUpdate { source: String, position: f64 },
    /// A play request succeeded.
    PlayStarted { source: String },
    /// A load or play request failed.
    Failed { source: String, error: DeviceError },
    /// The source played through to its natural end.
    Ended { source: String },
}

impl DeviceEvent {
    /// The source this event originated from.
    pub fn source(&self) -> &str {
        match self {
            Self::MetadataLoaded { source, .. }
            | Self::TimeUpdate { source, .. }
            | Self::PlayStarted { source }
            | Self::Failed { source, .. }
            | Self::Ended { source } => source,
        }
    }
}

#[derive(Debug)]
pub(super) enum DeviceCmd {
    /// Replace whatever is loaded with the given source (left paused).
    Load(String),
    /// Start or resume playback.
    Play,
    /// Pause, keeping the position.
    Pause,
    /// Move to the given position in seconds.
    Seek(f64),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
