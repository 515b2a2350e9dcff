use serde::Deserialize;

/// Album a track belongs to. Lookup only: albums do not own their tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlbumRef {
    pub folder: String,
    pub title: String,
    pub cover: Option<String>,
}

/// One playable media item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Display title.
    pub name: String,
    /// Locator relative to the media origin, e.g. `/album/01 - intro.mp3`.
    pub file_path: String,
    #[serde(default)]
    pub album: AlbumRef,
}

/// Base locator that track paths are appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaOrigin {
    base: String,
}

impl MediaOrigin {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve `track` to the source handed to the output device.
    ///
    /// Plain concatenation of origin and `file_path`; two tracks are the same
    /// source exactly when their resolved strings are equal.
    pub fn resolve(&self, track: &Track) -> String {
        format!("{}{}", self.base, track.file_path)
    }
}
