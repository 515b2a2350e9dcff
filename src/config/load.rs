use std::env;
use std::path::{Path, PathBuf};

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

const ENV_PREFIX: &str = "GEETH";
const CONFIG_PATH_VAR: &str = "GEETH_CONFIG_PATH";

impl Settings {
    /// Load settings from the resolved config file (if any) with `GEETH__*`
    /// environment variables layered on top.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Same as [`load`](Self::load) with an explicit file. A missing file
    /// is not an error.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        let step = self.controls.seek_step_percent;
        if !(step > 0.0 && step <= 100.0) {
            return Err("controls.seek_step_percent must be in (0, 100]".to_string());
        }
        Ok(())
    }
}

/// `GEETH_CONFIG_PATH` when set, else [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `geeth/config.toml` under the user's config home.
pub fn default_config_path() -> Option<PathBuf> {
    config_home().map(|d| d.join("geeth").join("config.toml"))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
fn config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}
