use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use super::*;
use crate::audio::{DeviceEvent, OutputDevice};
use crate::error::DeviceError;
use crate::library::{AlbumRef, MediaOrigin, Track};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SetSource(String),
    Load,
    Play,
    Pause,
    SetPosition(f64),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

/// Output device double that records every request.
#[derive(Default)]
struct RecordingDevice {
    source: Option<String>,
    calls: CallLog,
}

impl OutputDevice for RecordingDevice {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, source: &str) {
        self.source = Some(source.to_string());
        self.calls.borrow_mut().push(Call::SetSource(source.to_string()));
    }

    fn load(&mut self) {
        self.calls.borrow_mut().push(Call::Load);
    }

    fn play(&mut self) {
        self.calls.borrow_mut().push(Call::Play);
    }

    fn pause(&mut self) {
        self.calls.borrow_mut().push(Call::Pause);
    }

    fn set_position(&mut self, seconds: f64) {
        self.calls.borrow_mut().push(Call::SetPosition(seconds));
    }
}

fn track(name: &str) -> Track {
    Track {
        name: name.to_string(),
        file_path: format!("/{name}.mp3"),
        album: AlbumRef::default(),
    }
}

fn src(name: &str) -> String {
    format!("/music/{name}.mp3")
}

fn engine_with(names: &[&str]) -> (PlaybackEngine<RecordingDevice>, CallLog) {
    let calls = CallLog::default();
    let device = RecordingDevice {
        source: None,
        calls: calls.clone(),
    };
    let mut engine = PlaybackEngine::new(device, MediaOrigin::new("/music"));
    engine.set_playlist(names.iter().map(|n| track(n)).collect());
    (engine, calls)
}

/// Let the device report a successful load + play of `name`.
fn confirm(engine: &mut PlaybackEngine<RecordingDevice>, name: &str, duration: f64) {
    engine.handle_event(DeviceEvent::MetadataLoaded {
        source: src(name),
        duration,
    });
    engine.handle_event(DeviceEvent::PlayStarted { source: src(name) });
}

fn start(names: &[&str], name: &str) -> (PlaybackEngine<RecordingDevice>, CallLog) {
    let (mut engine, calls) = engine_with(names);
    engine.select_track(&track(name));
    confirm(&mut engine, name, 180.0);
    calls.borrow_mut().clear();
    (engine, calls)
}

fn ended(engine: &mut PlaybackEngine<RecordingDevice>, name: &str) {
    engine.handle_event(DeviceEvent::Ended { source: src(name) });
}

fn load_calls(name: &str) -> Vec<Call> {
    vec![Call::SetSource(src(name)), Call::Load, Call::Play]
}

#[test]
fn new_engine_is_idle() {
    let (engine, calls) = engine_with(&[]);
    let snap = engine.snapshot();
    assert_eq!(snap.state, PlaybackState::Idle);
    assert_eq!(snap.current_index, None);
    assert_eq!(snap.current_track, None);
    assert!(!snap.is_playing);
    assert_eq!(snap.repeat_mode, RepeatMode::NoRepeat);
    assert_eq!(snap.duration, 0.0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn select_track_loads_then_plays_once_device_confirms() {
    let (mut engine, calls) = engine_with(&["S1", "S2"]);

    engine.select_track(&track("S2"));
    assert_eq!(*calls.borrow(), load_calls("S2"));
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert_eq!(engine.current_index(), Some(1));
    assert!(!engine.is_playing());

    confirm(&mut engine, "S2", 200.0);
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert!(engine.is_playing());
    assert_eq!(engine.duration(), 200.0);

    engine.handle_event(DeviceEvent::TimeUpdate {
        source: src("S2"),
        position: 12.5,
    });
    assert_eq!(engine.current_time(), 12.5);
}

#[test]
fn reselecting_the_loaded_source_is_a_no_op() {
    let (mut engine, calls) = start(&["S1", "S2"], "S1");
    engine.handle_event(DeviceEvent::TimeUpdate {
        source: src("S1"),
        position: 42.0,
    });

    // Different object, same resolved source.
    let same = Track {
        name: "S1 (from search)".to_string(),
        ..track("S1")
    };
    engine.select_track(&same);

    assert!(calls.borrow().is_empty());
    assert_eq!(engine.current_time(), 42.0);
    assert_eq!(engine.state(), PlaybackState::Playing);
}

#[test]
fn late_events_for_a_superseded_selection_are_ignored() {
    let (mut engine, calls) = engine_with(&["A", "B"]);
    engine.select_track(&track("A"));
    engine.select_track(&track("B"));

    engine.handle_event(DeviceEvent::MetadataLoaded {
        source: src("A"),
        duration: 99.0,
    });
    engine.handle_event(DeviceEvent::PlayStarted { source: src("A") });
    engine.handle_event(DeviceEvent::Ended { source: src("A") });

    assert_eq!(engine.device().source(), Some(src("B").as_str()));
    assert_eq!(engine.current_index(), Some(1));
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert_eq!(engine.duration(), 0.0);

    let mut expected = load_calls("A");
    expected.extend(load_calls("B"));
    assert_eq!(*calls.borrow(), expected);

    confirm(&mut engine, "B", 10.0);
    assert_eq!(engine.state(), PlaybackState::Playing);
}

#[test]
fn selecting_a_track_outside_the_playlist_plays_it_alone() {
    let (mut engine, _calls) = engine_with(&["S1", "S2"]);
    engine.select_track(&track("Elsewhere"));
    assert_eq!(engine.playlist().len(), 1);
    assert_eq!(engine.current_index(), Some(0));
    assert_eq!(engine.current_track().map(|t| t.name.as_str()), Some("Elsewhere"));
}

#[test]
fn select_index_ignores_out_of_range() {
    let (mut engine, calls) = engine_with(&["S1"]);
    engine.select_index(3);
    assert_eq!(engine.current_index(), None);
    assert!(calls.borrow().is_empty());

    engine.select_index(0);
    assert_eq!(*calls.borrow(), load_calls("S1"));
}

#[test]
fn toggle_pauses_and_resumes_without_reloading() {
    let (mut engine, calls) = start(&["S1"], "S1");
    engine.handle_event(DeviceEvent::TimeUpdate {
        source: src("S1"),
        position: 30.0,
    });

    engine.toggle_play_pause();
    assert_eq!(engine.state(), PlaybackState::Paused);
    engine.toggle_play_pause();
    assert_eq!(engine.state(), PlaybackState::Playing);

    assert_eq!(*calls.borrow(), vec![Call::Pause, Call::Play]);
    assert_eq!(engine.current_time(), 30.0);
}

#[test]
fn toggle_without_a_track_does_nothing() {
    let (mut engine, calls) = engine_with(&["S1"]);
    engine.toggle_play_pause();
    assert!(calls.borrow().is_empty());
    assert_eq!(engine.state(), PlaybackState::Idle);
}

#[test]
fn toggle_while_loading_cancels_autoplay() {
    let (mut engine, calls) = engine_with(&["S1"]);
    engine.select_track(&track("S1"));
    engine.toggle_play_pause();
    assert_eq!(engine.state(), PlaybackState::Paused);

    // The play request queued before the pause still reports success.
    confirm(&mut engine, "S1", 100.0);
    assert_eq!(engine.state(), PlaybackState::Paused);
    assert!(!engine.is_playing());
    assert_eq!(engine.duration(), 100.0);
    assert_eq!(calls.borrow().last(), Some(&Call::Pause));
}

#[test]
fn load_failure_degrades_to_paused_and_toggle_retries() {
    let (mut engine, calls) = engine_with(&["S1"]);
    engine.select_track(&track("S1"));
    engine.handle_event(DeviceEvent::Failed {
        source: src("S1"),
        error: DeviceError::LoadFailure("404".to_string()),
    });

    assert_eq!(engine.state(), PlaybackState::Paused);
    assert!(!engine.is_playing());
    assert_eq!(engine.current_index(), Some(0));

    calls.borrow_mut().clear();
    engine.toggle_play_pause();
    assert_eq!(*calls.borrow(), load_calls("S1"));
    assert_eq!(engine.state(), PlaybackState::Loading);
}

#[test]
fn play_rejected_on_resume_reverts_is_playing() {
    let (mut engine, calls) = start(&["S1"], "S1");
    engine.toggle_play_pause();
    engine.toggle_play_pause();
    assert!(engine.is_playing());

    engine.handle_event(DeviceEvent::Failed {
        source: src("S1"),
        error: DeviceError::PlayRejected("no user gesture".to_string()),
    });
    assert!(!engine.is_playing());

    // A fresh selection of the same track retries after a failure.
    calls.borrow_mut().clear();
    engine.select_track(&track("S1"));
    assert_eq!(*calls.borrow(), load_calls("S1"));
}

#[test]
fn next_and_prev_wrap_around() {
    let (mut engine, _calls) = start(&["S1", "S2", "S3"], "S3");

    engine.play_next();
    assert_eq!(engine.current_index(), Some(0));

    engine.play_prev();
    assert_eq!(engine.current_index(), Some(2));

    engine.play_prev();
    assert_eq!(engine.current_index(), Some(1));
}

#[test]
fn next_and_prev_from_nothing_queued() {
    let (mut engine, _calls) = engine_with(&["S1", "S2", "S3"]);
    engine.play_next();
    assert_eq!(engine.current_index(), Some(0));

    let (mut engine, calls) = engine_with(&["S1", "S2", "S3"]);
    engine.play_prev();
    assert_eq!(engine.current_index(), Some(2));
    assert_eq!(*calls.borrow(), load_calls("S3"));
}

#[test]
fn next_and_prev_on_empty_playlist_are_no_ops() {
    let (mut engine, calls) = engine_with(&[]);
    engine.play_next();
    engine.play_prev();
    assert_eq!(engine.current_index(), None);
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(calls.borrow().is_empty());
}

#[test]
fn skipping_changes_track_and_loads_it() {
    let (mut engine, calls) = start(&["S1", "S2"], "S1");
    engine.play_next();
    assert_eq!(*calls.borrow(), load_calls("S2"));
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert_eq!(engine.current_time(), 0.0);
}

#[test]
fn seek_maps_percent_onto_duration() {
    let (mut engine, calls) = start(&["S1"], "S1");
    engine.handle_event(DeviceEvent::MetadataLoaded {
        source: src("S1"),
        duration: 200.0,
    });

    engine.seek(0.0);
    assert_eq!(engine.current_time(), 0.0);
    engine.seek(100.0);
    assert_eq!(engine.current_time(), 200.0);
    engine.seek(25.0);
    assert_eq!(engine.current_time(), 50.0);
    engine.seek(150.0);
    assert_eq!(engine.current_time(), 200.0);
    engine.seek(-3.0);
    assert_eq!(engine.current_time(), 0.0);

    assert_eq!(
        *calls.borrow(),
        vec![
            Call::SetPosition(0.0),
            Call::SetPosition(200.0),
            Call::SetPosition(50.0),
            Call::SetPosition(200.0),
            Call::SetPosition(0.0),
        ]
    );
    assert_eq!(engine.state(), PlaybackState::Playing);
}

#[test]
fn seek_without_known_duration_is_ignored() {
    let (mut engine, calls) = engine_with(&["S1"]);
    engine.seek(50.0);
    engine.select_track(&track("S1"));
    calls.borrow_mut().clear();

    engine.seek(50.0);
    engine.handle_event(DeviceEvent::MetadataLoaded {
        source: src("S1"),
        duration: 0.0,
    });
    engine.seek(50.0);
    engine.handle_event(DeviceEvent::MetadataLoaded {
        source: src("S1"),
        duration: f64::NAN,
    });
    engine.seek(50.0);

    assert!(calls.borrow().is_empty());
    assert_eq!(engine.current_time(), 0.0);
}

#[test]
fn repeat_all_replays_the_same_track_indefinitely() {
    let (mut engine, calls) = start(&["S1", "S2"], "S1");
    engine.set_repeat_mode(RepeatMode::RepeatAll);

    for _ in 0..5 {
        ended(&mut engine, "S1");
        assert_eq!(engine.current_index(), Some(0));
        assert!(engine.is_playing());
        assert_eq!(engine.current_time(), 0.0);
    }

    let expected: Vec<Call> = (0..5)
        .flat_map(|_| [Call::SetPosition(0.0), Call::Play])
        .collect();
    assert_eq!(*calls.borrow(), expected);
    assert_eq!(engine.repeat_mode(), RepeatMode::RepeatAll);
}

#[test]
fn repeat_one_replays_exactly_once_then_stops() {
    let (mut engine, calls) = start(&["S1"], "S1");
    engine.set_repeat_mode(RepeatMode::RepeatOne);

    ended(&mut engine, "S1");
    assert!(engine.is_playing());
    assert_eq!(engine.current_time(), 0.0);
    assert_eq!(engine.repeat_mode(), RepeatMode::RepeatOne);
    assert_eq!(*calls.borrow(), vec![Call::SetPosition(0.0), Call::Play]);

    calls.borrow_mut().clear();
    ended(&mut engine, "S1");
    assert!(!engine.is_playing());
    assert_eq!(engine.state(), PlaybackState::Paused);
    assert_eq!(engine.repeat_mode(), RepeatMode::NoRepeat);
    assert_eq!(engine.current_time(), 180.0);
    assert_eq!(engine.current_index(), Some(0));
    assert_eq!(*calls.borrow(), vec![Call::Pause, Call::SetPosition(180.0)]);
}

#[test]
fn repeat_one_bonus_is_rearmed_by_a_track_change() {
    let (mut engine, _calls) = start(&["S1", "S2"], "S1");
    engine.set_repeat_mode(RepeatMode::RepeatOne);

    ended(&mut engine, "S1");
    engine.play_next();
    confirm(&mut engine, "S2", 90.0);

    // S2 gets its own bonus replay instead of stopping.
    ended(&mut engine, "S2");
    assert!(engine.is_playing());
    assert_eq!(engine.repeat_mode(), RepeatMode::RepeatOne);
    assert_eq!(engine.current_index(), Some(1));
}

#[test]
fn repeat_one_bonus_is_rearmed_after_track_leaves_and_returns() {
    let (mut engine, calls) = start(&["X"], "X");
    engine.set_repeat_mode(RepeatMode::RepeatOne);
    ended(&mut engine, "X");

    engine.set_playlist(vec![track("Y")]);
    assert_eq!(engine.current_track(), None);
    engine.set_playlist(vec![track("X"), track("Y")]);
    engine.select_track(&track("X"));
    engine.toggle_play_pause();
    assert!(engine.is_playing());

    calls.borrow_mut().clear();
    ended(&mut engine, "X");
    assert!(engine.is_playing());
    assert_eq!(engine.repeat_mode(), RepeatMode::RepeatOne);
    assert_eq!(*calls.borrow(), vec![Call::SetPosition(0.0), Call::Play]);
}

#[test]
fn resuming_after_repeat_one_stop_starts_over() {
    let (mut engine, calls) = start(&["S1", "S2"], "S1");
    engine.set_repeat_mode(RepeatMode::RepeatOne);
    ended(&mut engine, "S1");
    ended(&mut engine, "S1");
    assert_eq!(engine.current_time(), 180.0);

    calls.borrow_mut().clear();
    engine.toggle_play_pause();
    assert_eq!(*calls.borrow(), vec![Call::SetPosition(0.0), Call::Play]);
    assert_eq!(engine.current_index(), Some(0));
    assert_eq!(engine.current_time(), 0.0);
    assert!(engine.is_playing());
}

#[test]
fn end_of_last_track_wraps_to_first() {
    let (mut engine, calls) = start(&["S1", "S2", "S3"], "S3");
    assert_eq!(engine.current_index(), Some(2));

    ended(&mut engine, "S3");
    assert_eq!(engine.current_index(), Some(0));
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert_eq!(*calls.borrow(), load_calls("S1"));

    confirm(&mut engine, "S1", 120.0);
    assert_eq!(engine.state(), PlaybackState::Playing);
}

#[test]
fn end_of_track_advances_by_first_name_match() {
    let dup_a = Track {
        name: "Same".to_string(),
        file_path: "/a.mp3".to_string(),
        album: AlbumRef::default(),
    };
    let other = track("Other");
    let dup_c = Track {
        file_path: "/c.mp3".to_string(),
        ..dup_a.clone()
    };

    let (mut engine, _calls) = engine_with(&[]);
    engine.set_playlist(vec![dup_a, other, dup_c.clone()]);
    engine.select_track(&dup_c);
    engine.handle_event(DeviceEvent::PlayStarted {
        source: "/music/c.mp3".to_string(),
    });
    assert_eq!(engine.current_index(), Some(2));

    engine.handle_event(DeviceEvent::Ended {
        source: "/music/c.mp3".to_string(),
    });
    assert_eq!(engine.current_index(), Some(1));
}

#[test]
fn single_track_playlist_loops_without_reloading() {
    let (mut engine, calls) = start(&["S1"], "S1");
    ended(&mut engine, "S1");
    assert_eq!(engine.current_index(), Some(0));
    assert!(engine.is_playing());
    assert_eq!(*calls.borrow(), vec![Call::SetPosition(0.0), Call::Play]);
}

#[test]
fn set_playlist_follows_the_loaded_track() {
    let (mut engine, _calls) = start(&["S1", "S2"], "S2");

    // Same track, same position: nothing moves.
    engine.set_playlist(vec![track("X"), track("S2")]);
    assert_eq!(engine.current_index(), Some(1));

    // Same track, new position.
    engine.set_playlist(vec![track("S2"), track("X"), track("Y")]);
    assert_eq!(engine.current_index(), Some(0));
    assert!(engine.is_playing());
    assert_eq!(engine.current_track().map(|t| t.name.as_str()), Some("S2"));
}

#[test]
fn set_playlist_without_the_loaded_track_stops_playback() {
    let (mut engine, calls) = start(&["S1", "S2"], "S2");

    engine.set_playlist(vec![track("X")]);
    assert_eq!(engine.current_index(), None);
    assert!(!engine.is_playing());
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(*calls.borrow(), vec![Call::Pause]);

    // Events from the old source no longer apply.
    ended(&mut engine, "S2");
    assert_eq!(engine.current_index(), None);
}

#[test]
fn set_playlist_keeps_nothing_queued_when_idle() {
    let (mut engine, calls) = engine_with(&["S1"]);
    engine.set_playlist(vec![track("S2"), track("S3")]);
    assert_eq!(engine.current_index(), None);
    assert!(calls.borrow().is_empty());
}

#[test]
fn repeat_mode_changes_do_not_touch_playback() {
    let (mut engine, calls) = start(&["S1"], "S1");
    assert_eq!(engine.cycle_repeat_mode(), RepeatMode::RepeatAll);
    assert_eq!(engine.cycle_repeat_mode(), RepeatMode::RepeatOne);
    assert_eq!(engine.cycle_repeat_mode(), RepeatMode::NoRepeat);
    engine.set_repeat_mode(RepeatMode::RepeatOne);
    assert_eq!(engine.repeat_mode(), RepeatMode::RepeatOne);
    assert!(calls.borrow().is_empty());
    assert_eq!(engine.state(), PlaybackState::Playing);
}

#[test]
fn snapshot_reports_progress() {
    let (mut engine, _calls) = start(&["S1"], "S1");
    engine.handle_event(DeviceEvent::TimeUpdate {
        source: src("S1"),
        position: 45.0,
    });
    let snap = engine.snapshot();
    assert_eq!(snap.progress_percent(), 25.0);
    assert_eq!(snap.current_track.map(|t| t.name), Some("S1".to_string()));

    let (idle, _calls) = engine_with(&[]);
    assert_eq!(idle.snapshot().progress_percent(), 0.0);
}

proptest! {
    /// Any sequence of skips keeps the index in bounds and matches a simple
    /// wrap-around model.
    #[test]
    fn skipping_keeps_index_in_bounds(
        len in 1usize..12,
        ops in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        let names: Vec<String> = (0..len).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (mut engine, _calls) = engine_with(&refs);

        let mut model: Option<usize> = None;
        for forward in ops {
            if forward {
                engine.play_next();
                model = Some(model.map_or(0, |i| (i + 1) % len));
            } else {
                engine.play_prev();
                model = Some(match model {
                    Some(0) | None => len - 1,
                    Some(i) => i - 1,
                });
            }
            let idx = engine.current_index();
            prop_assert!(idx.is_some_and(|i| i < len));
            prop_assert_eq!(idx, model);
        }
    }

    /// `is_playing` never holds without a current track, whatever the mix of
    /// controls and device events.
    #[test]
    fn playing_implies_a_current_track(
        ops in prop::collection::vec(0u8..8, 1..60),
    ) {
        let (mut engine, _calls) = engine_with(&["A", "B", "C"]);
        for op in ops {
            let current = engine.device().source().map(str::to_string);
            match op {
                0 => engine.play_next(),
                1 => engine.play_prev(),
                2 => engine.toggle_play_pause(),
                3 => engine.set_playlist(vec![track("A"), track("C")]),
                4 => engine.set_playlist(vec![track("B")]),
                5 => {
                    engine.cycle_repeat_mode();
                }
                6 => {
                    if let Some(source) = current {
                        engine.handle_event(DeviceEvent::PlayStarted { source });
                    }
                }
                _ => {
                    if let Some(source) = current {
                        engine.handle_event(DeviceEvent::Ended { source });
                    }
                }
            }
            prop_assert!(!engine.is_playing() || engine.current_track().is_some());
            prop_assert!(engine.current_index().is_none_or(|i| i < engine.playlist().len()));
        }
    }
}
