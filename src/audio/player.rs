use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::error::DeviceError;

use super::device::OutputDevice;
use super::thread::spawn_audio_thread;
use super::types::{DeviceCmd, DeviceEvent};

/// Handle to the rodio-backed output device.
///
/// The audio thread owns the output stream and a single sink for the whole
/// process; this handle only forwards requests and remembers which source was
/// assigned last, which is what stale events are checked against.
pub struct RodioDevice {
    tx: Sender<DeviceCmd>,
    source: Option<String>,
    join: Option<JoinHandle<()>>,
}

impl RodioDevice {
    /// Open the default audio output. Device events are delivered, in
    /// emission order, on the returned receiver.
    pub fn open(settings: &AudioSettings) -> Result<(Self, Receiver<DeviceEvent>), DeviceError> {
        let (tx, rx) = mpsc::channel::<DeviceCmd>();
        let (event_tx, event_rx) = mpsc::channel::<DeviceEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), DeviceError>>(1);

        let join = spawn_audio_thread(rx, event_tx, ready_tx, settings.clone());

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = join.join();
                return Err(e);
            }
            Err(_) => {
                return Err(DeviceError::Unavailable(
                    "audio thread exited during startup".to_string(),
                ));
            }
        }

        Ok((
            Self {
                tx,
                source: None,
                join: Some(join),
            },
            event_rx,
        ))
    }

    fn send(&self, cmd: DeviceCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone; request dropped");
        }
    }

    /// Stop the audio thread, fading out over `fade_out` first.
    pub fn shutdown(mut self, fade_out: Duration) {
        self.send(DeviceCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl OutputDevice for RodioDevice {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, source: &str) {
        self.source = Some(source.to_string());
    }

    fn load(&mut self) {
        if let Some(source) = self.source.clone() {
            self.send(DeviceCmd::Load(source));
        }
    }

    fn play(&mut self) {
        self.send(DeviceCmd::Play);
    }

    fn pause(&mut self) {
        self.send(DeviceCmd::Pause);
    }

    fn set_position(&mut self, seconds: f64) {
        self.send(DeviceCmd::Seek(seconds));
    }
}
