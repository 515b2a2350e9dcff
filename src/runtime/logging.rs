use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install the global `tracing` subscriber. `RUST_LOG` takes precedence over
/// `log.filter`.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(path) = settings.file.as_deref() else {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    };

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        Err(error) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
            warn!(path = %path.display(), %error, "cannot open log file; logging to stderr");
        }
    }
}
