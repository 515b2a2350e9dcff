use tracing::{debug, info, warn};

use crate::audio::{DeviceEvent, OutputDevice};
use crate::library::{MediaOrigin, Track};

use super::state::{PlaybackSnapshot, PlaybackState, RepeatMode};

/// Owns the playback session and the one output device.
///
/// All transitions happen on the caller's thread: either through a control
/// method or through [`handle_event`](Self::handle_event) when the device
/// reports something. Nothing here blocks and nothing here returns an error;
/// device failures settle into a paused state.
pub struct PlaybackEngine<D: OutputDevice> {
    device: D,
    origin: MediaOrigin,
    playlist: Vec<Track>,
    current_index: Option<usize>,
    is_playing: bool,
    /// A load+play was requested and the device has not confirmed it yet.
    loading: bool,
    /// The device reported a failure for the current source; the next
    /// selection or play request reloads it instead of resuming.
    failed: bool,
    repeat_mode: RepeatMode,
    /// The single repeat-one replay was used up for the current track.
    repeat_one_armed: bool,
    duration: f64,
    current_time: f64,
}

impl<D: OutputDevice> PlaybackEngine<D> {
    /// Create an idle engine around `device`.
    pub fn new(device: D, origin: MediaOrigin) -> Self {
        Self {
            device,
            origin,
            playlist: Vec::new(),
            current_index: None,
            is_playing: false,
            loading: false,
            failed: false,
            repeat_mode: RepeatMode::NoRepeat,
            repeat_one_armed: false,
            duration: 0.0,
            current_time: 0.0,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Give the device back, e.g. to shut it down.
    pub fn into_device(self) -> D {
        self.device
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// `playlist[current_index]`, never tracked separately.
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn state(&self) -> PlaybackState {
        if self.current_track().is_none() {
            PlaybackState::Idle
        } else if self.loading {
            PlaybackState::Loading
        } else if self.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.current_track().cloned(),
            current_index: self.current_index,
            state: self.state(),
            is_playing: self.is_playing,
            repeat_mode: self.repeat_mode,
            duration: self.duration,
            current_time: self.current_time,
        }
    }

    fn current_source(&self) -> Option<String> {
        self.current_track().map(|t| self.origin.resolve(t))
    }

    /// Replace the playlist wholesale.
    ///
    /// The current index keeps following the track the device has loaded: it
    /// stays put when that track is still at the same position, moves to the
    /// track's new position otherwise, and is cleared (stopping playback)
    /// when the new playlist no longer contains it.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        let previous = self.current_track().cloned();
        let loaded = self.current_source();
        self.playlist = tracks;

        let index = match loaded {
            None => None,
            Some(loaded) if self.current_source().as_deref() == Some(loaded.as_str()) => {
                self.current_index
            }
            Some(loaded) => {
                let found = self
                    .playlist
                    .iter()
                    .position(|t| self.origin.resolve(t) == loaded);
                if found.is_none() {
                    debug!(source = %loaded, "loaded track left the playlist; stopping");
                    if self.is_playing || self.loading {
                        self.device.pause();
                    }
                    self.is_playing = false;
                    self.loading = false;
                }
                found
            }
        };
        self.current_index = index;
        self.forget_repeat_if_changed(previous.as_ref());
    }

    /// Move to `index`, dropping the repeat-one bonus if that changes the
    /// current track.
    fn set_current(&mut self, index: Option<usize>) {
        let previous = self.current_track().cloned();
        self.current_index = index;
        self.forget_repeat_if_changed(previous.as_ref());
    }

    fn forget_repeat_if_changed(&mut self, previous: Option<&Track>) {
        if self.current_track() != previous {
            self.repeat_one_armed = false;
        }
    }

    /// Make `track` the current track and start it.
    ///
    /// The track is looked up in the playlist by resolved source; a track that
    /// is not part of the playlist becomes a playlist of its own. Selecting the
    /// source the device already has is a no-op.
    pub fn select_track(&mut self, track: &Track) {
        let previous = self.current_track().cloned();
        let source = self.origin.resolve(track);
        let index = match self
            .playlist
            .iter()
            .position(|t| self.origin.resolve(t) == source)
        {
            Some(i) => i,
            None => {
                debug!(%source, "selected track is not in the playlist; playing it alone");
                self.playlist = vec![track.clone()];
                0
            }
        };
        self.current_index = Some(index);
        self.forget_repeat_if_changed(previous.as_ref());
        self.start_current();
    }

    /// Select the playlist entry at `index`. Out-of-range indices are ignored.
    pub fn select_index(&mut self, index: usize) {
        if index >= self.playlist.len() {
            debug!(index, len = self.playlist.len(), "select_index out of range");
            return;
        }
        self.set_current(Some(index));
        self.start_current();
    }

    /// Point the device at the current track and request load + play, unless
    /// the device already has that source loaded.
    fn start_current(&mut self) {
        let Some(source) = self.current_source() else {
            return;
        };
        if !self.failed && self.device.source() == Some(source.as_str()) {
            debug!(%source, "already loaded; reselect ignored");
            return;
        }

        info!(%source, "loading track");
        self.repeat_one_armed = false;
        self.duration = 0.0;
        self.current_time = 0.0;
        self.is_playing = false;
        self.loading = true;
        self.failed = false;
        self.device.set_source(&source);
        self.device.load();
        self.device.play();
    }

    pub fn toggle_play_pause(&mut self) {
        let Some(source) = self.current_source() else {
            return;
        };

        if self.is_playing {
            self.device.pause();
            self.is_playing = false;
        } else if self.loading {
            // Cancels the pending autoplay; the load itself still completes.
            self.device.pause();
            self.loading = false;
        } else if self.failed || self.device.source() != Some(source.as_str()) {
            self.start_current();
        } else {
            if self.duration > 0.0 && self.current_time >= self.duration {
                // Parked at the end; resuming starts the track over.
                self.device.set_position(0.0);
                self.current_time = 0.0;
            }
            self.device.play();
            self.is_playing = true;
        }
    }

    /// Advance one track, wrapping to the first. No-op on an empty playlist.
    pub fn play_next(&mut self) {
        let len = self.playlist.len();
        if len == 0 {
            debug!("next on empty playlist ignored");
            return;
        }
        let next = self.current_index.map_or(0, |i| (i + 1) % len);
        self.set_current(Some(next));
        self.start_current();
    }

    /// Go back one track, wrapping to the last. No-op on an empty playlist.
    pub fn play_prev(&mut self) {
        let len = self.playlist.len();
        if len == 0 {
            debug!("prev on empty playlist ignored");
            return;
        }
        let prev = match self.current_index {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.set_current(Some(prev));
        self.start_current();
    }

    /// Move to `percent` (0..=100, clamped) of the current track.
    /// Ignored while the duration is unknown.
    pub fn seek(&mut self, percent: f64) {
        if !(self.duration > 0.0) || !percent.is_finite() {
            debug!(percent, duration = self.duration, "seek ignored");
            return;
        }
        let position = percent.clamp(0.0, 100.0) / 100.0 * self.duration;
        self.device.set_position(position);
        self.current_time = position;
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Switch to the next repeat mode in the cycle and return it.
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.cycled();
        self.repeat_mode
    }

    /// The event comes from the source that is both assigned to the device
    /// and the current track; anything else is a leftover from a superseded
    /// selection.
    fn accepts(&self, source: &str) -> bool {
        self.device.source() == Some(source) && self.current_source().as_deref() == Some(source)
    }

    /// Apply one device notification.
    pub fn handle_event(&mut self, event: DeviceEvent) {
        if !self.accepts(event.source()) {
            debug!(source = event.source(), "stale device event ignored");
            return;
        }

        match event {
            DeviceEvent::MetadataLoaded { duration, .. } => {
                self.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
            }
            DeviceEvent::TimeUpdate { position, .. } => {
                if position.is_finite() && position >= 0.0 {
                    self.current_time = position;
                }
            }
            DeviceEvent::PlayStarted { .. } => {
                if self.loading {
                    self.loading = false;
                    self.is_playing = true;
                }
            }
            DeviceEvent::Failed { source, error } => {
                warn!(%source, %error, "playback failed");
                self.loading = false;
                self.is_playing = false;
                self.failed = true;
            }
            DeviceEvent::Ended { .. } => self.on_ended(),
        }
    }

    fn replay_from_start(&mut self) {
        self.device.set_position(0.0);
        self.current_time = 0.0;
        self.device.play();
        self.is_playing = true;
    }

    /// Natural end of the current track.
    fn on_ended(&mut self) {
        let Some(track) = self.current_track().cloned() else {
            return;
        };

        match self.repeat_mode {
            RepeatMode::RepeatAll => self.replay_from_start(),
            RepeatMode::RepeatOne if !self.repeat_one_armed => {
                self.repeat_one_armed = true;
                self.replay_from_start();
            }
            RepeatMode::RepeatOne => {
                self.repeat_one_armed = false;
                self.device.pause();
                self.device.set_position(self.duration);
                self.current_time = self.duration;
                self.is_playing = false;
                self.repeat_mode = RepeatMode::NoRepeat;
            }
            RepeatMode::NoRepeat => {
                // First track with the same name wins.
                let Some(i) = self.playlist.iter().position(|t| t.name == track.name) else {
                    return;
                };
                let next = (i + 1) % self.playlist.len();
                self.set_current(Some(next));
                if self.current_source() == self.device.source().map(str::to_string) {
                    // Wrapped onto the same source (single-track playlist).
                    self.replay_from_start();
                } else {
                    self.start_current();
                }
            }
        }
    }
}
