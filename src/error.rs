//! Error types shared by the output device and the library loaders.
//!
//! None of these ever escape the playback engine: device errors are folded
//! into a paused state, library errors only matter at startup.

use thiserror::Error;

/// Failures reported by an output device, always asynchronously via
/// `DeviceEvent::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The source could not be opened or decoded.
    #[error("failed to load source: {0}")]
    LoadFailure(String),

    /// The device refused to start playback.
    #[error("playback rejected: {0}")]
    PlayRejected(String),

    /// No audio output could be opened at all.
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

/// Failures while building the track library.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
}
