//! One-line now-playing summary printed under the cursor.

use crate::playback::PlaybackSnapshot;

/// `mm:ss`, with unknown or negative times shown as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Render the status line, or the search prompt while a query is being typed.
pub fn status_line(snapshot: &PlaybackSnapshot, search: Option<&str>) -> String {
    if let Some(query) = search {
        return format!("search: {query}_");
    }

    let name = snapshot
        .current_track
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("No song playing");

    format!(
        "{name} | {} | {} / {} ({:.0}%) | {}",
        snapshot.state.label(),
        format_time(snapshot.current_time),
        format_time(snapshot.duration),
        snapshot.progress_percent(),
        snapshot.repeat_mode.label(),
    )
}
