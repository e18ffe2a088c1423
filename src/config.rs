//! Application-level configuration loading, including the broadcast cadences.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_ARENA_BACK_CONFIG_PATH";
/// Poll interval while a broadcast session is tracking an active challenge.
const DEFAULT_ACTIVE_TICK_SECS: u64 = 2;
/// Slower cadence used while no challenge is active.
const DEFAULT_IDLE_TICK_SECS: u64 = 5;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    active_tick: Duration,
    idle_tick: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        active_tick_secs = app_config.active_tick.as_secs(),
                        idle_tick_secs = app_config.idle_tick.as_secs(),
                        "loaded broadcast cadences from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Poll interval between leaderboard recomputations while a challenge is active.
    pub fn active_tick(&self) -> Duration {
        self.active_tick
    }

    /// Poll interval between "no active challenge" notices.
    pub fn idle_tick(&self) -> Duration {
        self.idle_tick
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            active_tick: Duration::from_secs(DEFAULT_ACTIVE_TICK_SECS),
            idle_tick: Duration::from_secs(DEFAULT_IDLE_TICK_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default = "default_active_tick_secs")]
    active_tick_secs: u64,
    #[serde(default = "default_idle_tick_secs")]
    idle_tick_secs: u64,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            // A zero cadence would spin the broadcast loops; clamp to one second.
            active_tick: Duration::from_secs(value.active_tick_secs.max(1)),
            idle_tick: Duration::from_secs(value.idle_tick_secs.max(1)),
        }
    }
}

fn default_active_tick_secs() -> u64 {
    DEFAULT_ACTIVE_TICK_SECS
}

fn default_idle_tick_secs() -> u64 {
    DEFAULT_IDLE_TICK_SECS
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
