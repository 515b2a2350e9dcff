use std::io::Write;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use tracing::debug;

use crate::audio::{DeviceEvent, OutputDevice};
use crate::config;
use crate::library::{Album, Track, group_albums, search};
use crate::playback::PlaybackEngine;

use super::status::status_line;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Every known track; the album browser and search draw from it.
    library: Vec<Track>,
    albums: Vec<Album>,
    /// Album most recently opened with `a`.
    album_cursor: Option<usize>,
    /// Query being typed, while in search mode.
    search: Option<String>,
    last_status: String,
}

impl EventLoopState {
    pub fn new(library: Vec<Track>) -> Self {
        let albums = group_albums(&library);
        Self {
            library,
            albums,
            album_cursor: None,
            search: None,
            last_status: String::new(),
        }
    }
}

/// Main terminal loop: applies device events to the engine, redraws the
/// status line when it changes and dispatches key presses. Returns `Ok(())`
/// when the user quits.
pub fn run<W: Write, D: OutputDevice>(
    out: &mut W,
    settings: &config::Settings,
    engine: &mut PlaybackEngine<D>,
    events: &Receiver<DeviceEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        loop {
            match events.try_recv() {
                Ok(ev) => engine.handle_event(ev),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err("audio thread stopped".into()),
            }
        }

        let line = status_line(&engine.snapshot(), state.search.as_deref());
        if line != state.last_status {
            queue!(
                out,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(&line)
            )?;
            out.flush()?;
            state.last_status = line;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, engine, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event<D: OutputDevice>(
    key: KeyEvent,
    settings: &config::Settings,
    engine: &mut PlaybackEngine<D>,
    state: &mut EventLoopState,
) -> bool {
    if let Some(query) = state.search.as_mut() {
        match key.code {
            KeyCode::Esc => state.search = None,
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Enter => {
                let results = search(&state.library, query);
                if let Some(first) = results.first().cloned() {
                    engine.set_playlist(results);
                    engine.select_track(&first);
                    state.album_cursor = None;
                    state.search = None;
                } else {
                    debug!(query = %query, "search found nothing");
                }
            }
            KeyCode::Char(c) if !c.is_control() => query.push(c),
            _ => {}
        }
        return false;
    }

    let step = settings.controls.seek_step_percent;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => engine.toggle_play_pause(),
        KeyCode::Char('l') | KeyCode::Right => engine.play_next(),
        KeyCode::Char('h') | KeyCode::Left => engine.play_prev(),
        KeyCode::Char('L') => {
            let at = engine.snapshot().progress_percent();
            engine.seek(at + step);
        }
        KeyCode::Char('H') => {
            let at = engine.snapshot().progress_percent();
            engine.seek(at - step);
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0);
            engine.seek(f64::from(tenth * 10));
        }
        KeyCode::Char('r') => {
            engine.cycle_repeat_mode();
        }
        KeyCode::Char('a') => open_next_album(engine, state),
        KeyCode::Char('A') => {
            engine.set_playlist(state.library.clone());
            state.album_cursor = None;
            if engine.current_index().is_none() && !engine.playlist().is_empty() {
                engine.select_index(0);
            }
            debug!(
                tracks = engine.playlist().len(),
                current = ?engine.current_index(),
                "playing whole library"
            );
        }
        KeyCode::Char('/') => state.search = Some(String::new()),
        _ => {}
    }

    false
}

/// Album browser: make the next album the playlist and start its first track.
fn open_next_album<D: OutputDevice>(engine: &mut PlaybackEngine<D>, state: &mut EventLoopState) {
    if state.albums.is_empty() {
        return;
    }
    let next = state
        .album_cursor
        .map_or(0, |i| (i + 1) % state.albums.len());
    state.album_cursor = Some(next);

    let tracks = state.albums[next].tracks.clone();
    if let Some(first) = tracks.first().cloned() {
        debug!(album = %state.albums[next].album.title, "opening album");
        engine.set_playlist(tracks);
        engine.select_track(&first);
    }
}
