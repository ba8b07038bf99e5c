//! Application-level configuration loading: access codes, transition timeout and scoring policy.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::scoring::handicap::AllocationPolicy;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BIRDIFY_BACK_CONFIG_PATH";
const DEFAULT_ACCESS_CODE_LENGTH: usize = 6;
const MIN_ACCESS_CODE_LENGTH: usize = 4;
const MAX_ACCESS_CODE_LENGTH: usize = 16;
const DEFAULT_TRANSITION_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    access_code_length: usize,
    transition_timeout: Option<Duration>,
    handicap_allocation: AllocationPolicy,
    require_finalized_course: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        access_code_length = app_config.access_code_length,
                        allocation = ?app_config.handicap_allocation,
                        "loaded configuration"
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

    /// Parse a configuration document. Missing keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Number of characters in generated group access codes.
    pub fn access_code_length(&self) -> usize {
        self.access_code_length
    }

    /// Upper bound on a single group transaction; `None` disables the limit.
    pub fn transition_timeout(&self) -> Option<Duration> {
        self.transition_timeout
    }

    /// How handicap strokes are spread over holes for per-hole net scores.
    pub fn handicap_allocation(&self) -> AllocationPolicy {
        self.handicap_allocation
    }

    /// Whether tournaments may only be scheduled on finalized courses.
    pub fn require_finalized_course(&self) -> bool {
        self.require_finalized_course
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    access_code_length: Option<usize>,
    transition_timeout_ms: Option<u64>,
    handicap_allocation: Option<AllocationPolicy>,
    require_finalized_course: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let access_code_length = value
            .access_code_length
            .unwrap_or(DEFAULT_ACCESS_CODE_LENGTH)
            .clamp(MIN_ACCESS_CODE_LENGTH, MAX_ACCESS_CODE_LENGTH);
        let transition_timeout = match value
            .transition_timeout_ms
            .unwrap_or(DEFAULT_TRANSITION_TIMEOUT_MS)
        {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        Self {
            access_code_length,
            transition_timeout,
            handicap_allocation: value.handicap_allocation.unwrap_or_default(),
            require_finalized_course: value.require_finalized_course.unwrap_or(true),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
