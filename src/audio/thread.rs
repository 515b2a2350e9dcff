use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::config::AudioSettings;
use crate::error::DeviceError;

use super::sink::open_source;
use super::types::{DeviceCmd, DeviceEvent};

/// State owned by the audio thread: one sink, reused for every source.
struct AudioThread {
    sink: Sink,
    events: Sender<DeviceEvent>,
    source: Option<String>,
    /// The current source decoded successfully at least once.
    loaded: bool,
    playing: bool,
    /// `Ended` was already reported for the current pass through the source.
    ended: bool,
}

impl AudioThread {
    fn emit(&self, event: DeviceEvent) {
        // The receiver only disappears during shutdown.
        let _ = self.events.send(event);
    }

    fn load(&mut self, source: String) {
        self.sink.clear();
        self.playing = false;
        self.ended = false;
        self.loaded = false;

        match open_source(&source) {
            Ok((decoder, duration)) => {
                self.sink.append(decoder);
                self.loaded = true;
                debug!(%source, duration, "source loaded");
                self.emit(DeviceEvent::MetadataLoaded {
                    source: source.clone(),
                    duration,
                });
            }
            Err(error) => {
                warn!(%source, %error, "load failed");
                self.emit(DeviceEvent::Failed {
                    source: source.clone(),
                    error,
                });
            }
        }
        self.source = Some(source);
    }

    /// Make sure the sink has something to play, re-decoding the current
    /// source after it drained. The sink is left paused when refilled.
    fn ensure_appended(&mut self) -> Result<(), DeviceError> {
        if !self.sink.empty() {
            return Ok(());
        }
        let Some(source) = self.source.as_deref() else {
            return Err(DeviceError::PlayRejected("nothing loaded".to_string()));
        };
        if !self.loaded {
            return Err(DeviceError::PlayRejected(format!(
                "{source} did not load"
            )));
        }
        let (decoder, _) = open_source(source)?;
        self.sink.pause();
        self.sink.append(decoder);
        Ok(())
    }

    fn play(&mut self) {
        let Some(source) = self.source.clone() else {
            debug!("play requested with no source");
            return;
        };
        match self.ensure_appended() {
            Ok(()) => {
                self.sink.play();
                self.playing = true;
                self.ended = false;
                self.emit(DeviceEvent::PlayStarted { source });
            }
            Err(error) => {
                warn!(%source, %error, "play rejected");
                self.playing = false;
                self.emit(DeviceEvent::Failed { source, error });
            }
        }
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        if let Err(error) = self.ensure_appended() {
            debug!(%error, "seek ignored");
            return;
        }
        let target = Duration::from_secs_f64(seconds.max(0.0));
        if let Err(error) = self.sink.try_seek(target) {
            debug!(?error, seconds, "seek failed");
        }
        self.ended = false;
    }

    /// Periodic progress report and end-of-media detection.
    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(source) = self.source.clone() else {
            return;
        };

        if self.sink.empty() {
            if !self.ended {
                self.ended = true;
                self.playing = false;
                self.sink.pause();
                self.emit(DeviceEvent::Ended { source });
            }
        } else {
            self.emit(DeviceEvent::TimeUpdate {
                source,
                position: self.sink.get_pos().as_secs_f64(),
            });
        }
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Spawn the thread that owns the process-wide audio output.
///
/// The outcome of opening the output stream is reported once on `ready`
/// before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<DeviceCmd>,
    events: Sender<DeviceEvent>,
    ready: SyncSender<Result<(), DeviceError>>,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(DeviceError::Unavailable(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the status line.
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        let mut audio = AudioThread {
            sink,
            events,
            source: None,
            loaded: false,
            playing: false,
            ended: false,
        };
        let _ = ready.send(Ok(()));
        info!("audio output opened");

        let tick = Duration::from_millis(settings.tick_ms.max(1));
        loop {
            match rx.recv_timeout(tick) {
                Ok(DeviceCmd::Load(source)) => audio.load(source),
                Ok(DeviceCmd::Play) => audio.play(),
                Ok(DeviceCmd::Pause) => audio.pause(),
                Ok(DeviceCmd::Seek(seconds)) => audio.seek(seconds),
                Ok(DeviceCmd::Quit { fade_out_ms }) => {
                    if audio.playing {
                        fade_out_sink(&audio.sink, fade_out_ms);
                    }
                    audio.sink.stop();
                    break;
                }
                Err(RecvTimeoutError::Timeout) => audio.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("audio output closed");
    })
}
