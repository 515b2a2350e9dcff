use std::path::Path;

use tracing::{info, warn};

use crate::audio::OutputDevice;
use crate::config;
use crate::library::{Track, load_catalog, scan};
use crate::playback::{PlaybackEngine, RepeatMode};

/// Build the library from the configured catalog, or by scanning `origin`.
/// A catalog that cannot be read falls back to scanning.
pub fn load_library(origin: &str, settings: &config::Settings) -> Vec<Track> {
    if let Some(path) = settings.library.catalog.as_deref() {
        match load_catalog(path) {
            Ok(tracks) => {
                info!(path = %path.display(), tracks = tracks.len(), "catalog loaded");
                return tracks;
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "catalog unreadable; scanning media origin");
            }
        }
    }
    scan(Path::new(origin), &settings.library)
}

pub fn repeat_mode_from(setting: config::RepeatModeSetting) -> RepeatMode {
    match setting {
        config::RepeatModeSetting::NoRepeat => RepeatMode::NoRepeat,
        config::RepeatModeSetting::RepeatAll => RepeatMode::RepeatAll,
        config::RepeatModeSetting::RepeatOne => RepeatMode::RepeatOne,
    }
}

/// Seed the engine: repeat mode, the whole library as the playlist, and
/// optionally start the first track.
pub fn apply_playback_defaults<D: OutputDevice>(
    engine: &mut PlaybackEngine<D>,
    library: &[Track],
    settings: &config::Settings,
) {
    engine.set_repeat_mode(repeat_mode_from(settings.playback.repeat_mode));
    engine.set_playlist(library.to_vec());

    if settings.playback.autoplay && !library.is_empty() {
        engine.select_index(0);
    }
}
