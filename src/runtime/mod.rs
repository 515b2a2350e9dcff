use std::env;
use std::io::Write;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{info, warn};

use crate::audio::RodioDevice;
use crate::library::MediaOrigin;
use crate::playback::PlaybackEngine;

mod event_loop;
mod logging;
mod settings;
mod startup;
mod status;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();
    logging::init(&settings.log);
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let origin = env::args()
        .nth(1)
        .unwrap_or_else(|| settings.media.origin.clone());

    let library = startup::load_library(&origin, &settings);
    info!(%origin, tracks = library.len(), "library ready");

    let (device, events) = RodioDevice::open(&settings.audio)?;
    let mut engine = PlaybackEngine::new(device, MediaOrigin::new(origin));
    startup::apply_playback_defaults(&mut engine, &library, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, Hide)?;

    let mut state = event_loop::EventLoopState::new(library);
    let run_result = event_loop::run(&mut stdout, &settings, &mut engine, &events, &mut state);

    disable_raw_mode()?;
    execute!(stdout, Show)?;
    writeln!(stdout)?;

    engine
        .into_device()
        .shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));

    run_result
}
