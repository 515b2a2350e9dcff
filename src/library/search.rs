use super::model::Track;

/// `needle` appears in `haystack` in order, not necessarily contiguously.
/// Case-insensitive.
pub fn is_subsequence(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let mut rest = haystack.chars();
    needle
        .to_lowercase()
        .chars()
        .all(|c| rest.by_ref().any(|h| h == c))
}

/// Tracks whose name or album title fuzzy-matches `query`, in library order.
/// A blank query matches everything.
pub fn search(tracks: &[Track], query: &str) -> Vec<Track> {
    let query = query.trim();
    tracks
        .iter()
        .filter(|t| is_subsequence(&t.name, query) || is_subsequence(&t.album.title, query))
        .cloned()
        .collect()
}
