use std::path::Path;

use serde::Deserialize;

use crate::error::LibraryError;

use super::model::Track;

/// Song listing as served by the music backend (`GET /api/songs`).
#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    songs: Vec<Track>,
}

/// Parse a catalog document. A missing `songs` key is an empty library.
pub fn parse_catalog(json: &str) -> Result<Vec<Track>, LibraryError> {
    let catalog: Catalog = serde_json::from_str(json)?;
    Ok(catalog.songs)
}

/// Read and parse the catalog stored at `path`.
pub fn load_catalog(path: &Path) -> Result<Vec<Track>, LibraryError> {
    let raw = std::fs::read_to_string(path)?;
    parse_catalog(&raw)
}
