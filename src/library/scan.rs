use std::path::{Component, Path};

use lofty::prelude::{ItemKey, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{AlbumRef, Track};

const COVER_STEMS: [&str; 2] = ["cover", "folder"];
const COVER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Turn a path relative to the origin into a `/`-prefixed locator.
fn to_locator(relative: &Path) -> String {
    let mut out = String::new();
    for part in relative.components() {
        if let Component::Normal(p) = part {
            out.push('/');
            out.push_str(&p.to_string_lossy());
        }
    }
    out
}

/// Find a cover image next to the album's tracks, returned as a locator.
fn find_cover(dir: &Path, folder_locator: &str) -> Option<String> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| {
            let p = Path::new(name);
            let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
            COVER_STEMS.iter().any(|c| stem.eq_ignore_ascii_case(c))
                && COVER_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c))
        })
        .collect();
    names.sort();
    names
        .into_iter()
        .next()
        .map(|name| format!("{folder_locator}/{name}"))
}

/// Walk the media origin `dir` and build one `Track` per audio file.
///
/// Track locators are relative to `dir`, so resolving them against an origin
/// equal to `dir` yields the file path again. The album is the containing
/// folder; its title comes from the album tag when present.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };

        let mut name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let parent = path.parent().unwrap_or(dir);
        let folder = to_locator(relative.parent().unwrap_or(Path::new("")));
        let mut album_title = parent
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if let Ok(tagged) = lofty::read_from_path(path) {
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                    if !v.trim().is_empty() {
                        name = v.trim().to_string();
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                    if !v.trim().is_empty() {
                        album_title = v.trim().to_string();
                    }
                }
            }
        }

        let cover = find_cover(parent, &folder);
        tracks.push(Track {
            name,
            file_path: to_locator(relative),
            album: AlbumRef {
                folder,
                title: album_title,
                cover,
            },
        });
    }

    tracks.sort_by(|a, b| {
        a.album
            .folder
            .to_lowercase()
            .cmp(&b.album.folder.to_lowercase())
            .then_with(|| a.file_path.to_lowercase().cmp(&b.file_path.to_lowercase()))
    });
    tracks
}
