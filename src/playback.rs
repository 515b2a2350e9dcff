//! Playback engine: the playlist, the current position within it, repeat
//! semantics, and the state machine that turns transport controls and device
//! events into requests against the single output device.

mod engine;
mod state;

pub use engine::PlaybackEngine;
pub use state::{PlaybackSnapshot, PlaybackState, RepeatMode};

#[cfg(test)]
mod tests;
