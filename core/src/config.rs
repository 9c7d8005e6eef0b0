//! Overlay configuration loading
//!
//! The shared `OverlayConfig` type lives in lifeline-types; this module adds
//! TOML parsing, file loading and validation on top of it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lifeline_types::OverlayConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Extension trait for OverlayConfig loading
pub trait OverlayConfigExt: Sized {
    fn from_toml_str(source: &str) -> Result<Self, ConfigError>;
    fn load(path: &Path) -> Result<Self, ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
    fn hold_duration(&self) -> Duration;
}

impl OverlayConfigExt for OverlayConfig {
    /// Parse and validate a TOML document; omitted keys take their defaults
    fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: OverlayConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(source) => {
                let config = Self::from_toml_str(&source)?;
                tracing::debug!(path = %path.display(), "configuration loaded");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                reason: reason.to_string(),
            })
        };
        if self.hold.duration_ms == 0 {
            return invalid("hold.duration_ms must be greater than zero");
        }
        if self.hold.dispatch_event.is_empty() {
            return invalid("hold.dispatch_event must not be empty");
        }
        if self.keys.call.is_empty() || self.keys.local.is_empty() {
            return invalid("key bindings must not be empty");
        }
        if self.keys.call.eq_ignore_ascii_case(&self.keys.local) {
            return invalid("call and local must be bound to different keys");
        }
        if self.injuries.max_entries == 0 || self.injuries.max_text_len == 0 {
            return invalid("injury limits must be greater than zero");
        }
        if self.notifications.max_visible == 0 {
            return invalid("notifications.max_visible must be greater than zero");
        }
        Ok(())
    }

    fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold.duration_ms)
    }
}
