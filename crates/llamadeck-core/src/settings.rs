//! Controller settings and validation.
//!
//! Pure configuration types. Adapters fill them from flags, environment and
//! `.env`, then call [`validate_settings`] before building a controller.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default port the inference server listens on (llama.cpp's own default).
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default interface the inference server binds.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Settings for the server lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Directory scanned for `*.gguf` models. `None` = llama.cpp cache.
    pub models_dir: Option<PathBuf>,

    /// Explicit llama-server binary. `None` = search well-known locations.
    pub llama_server_path: Option<PathBuf>,

    /// Interface the server binds.
    pub host: String,

    /// Port the server listens on.
    pub port: u16,

    /// Context size passed as `-c` (e.g., 4096, 8192).
    pub context_size: Option<u64>,

    /// Extra arguments appended to the server command line.
    pub extra_args: Vec<String>,

    /// Poll period while stopped, running or failed.
    pub poll_interval_ms: u64,

    /// Poll period while starting or stopping.
    pub fast_poll_interval_ms: u64,

    /// Timeout of a single readiness probe.
    pub probe_timeout_ms: u64,

    /// Timeout of the spawn call.
    pub spawn_timeout_ms: u64,

    /// How long a started server may stay unready before it is failed.
    pub max_unready_ms: u64,

    /// Grace period between SIGTERM and SIGKILL on stop.
    pub stop_grace_ms: u64,

    /// Persist the spawned server to the state file for later recovery.
    pub persist_state: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            models_dir: None,
            llama_server_path: None,
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            context_size: None,
            extra_args: Vec::new(),
            poll_interval_ms: 5_000,
            fast_poll_interval_ms: 500,
            probe_timeout_ms: 2_000,
            spawn_timeout_ms: 10_000,
            max_unready_ms: 120_000,
            stop_grace_ms: 5_000,
            persist_state: true,
        }
    }
}

impl ControllerSettings {
    /// `host:port` the server will be bound to.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn fast_poll_interval(&self) -> Duration {
        Duration::from_millis(self.fast_poll_interval_ms)
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub const fn spawn_timeout(&self) -> Duration {
        Duration::from_millis(self.spawn_timeout_ms)
    }

    #[must_use]
    pub const fn max_unready(&self) -> Duration {
        Duration::from_millis(self.max_unready_ms)
    }

    #[must_use]
    pub const fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Port {0} is a privileged port. Please use a port >= 1024.")]
    PrivilegedPort(u16),

    #[error("Host cannot be empty")]
    EmptyHost,

    #[error("Context size must be between 512 and 1,000,000, got {0}")]
    InvalidContextSize(u64),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Probe timeout ({probe_ms}ms) must be shorter than max unready time ({max_unready_ms}ms)")]
    ProbeExceedsUnready { probe_ms: u64, max_unready_ms: u64 },
}

/// Validate controller settings.
pub fn validate_settings(settings: &ControllerSettings) -> Result<(), SettingsError> {
    if settings.host.trim().is_empty() {
        return Err(SettingsError::EmptyHost);
    }

    if settings.port < 1024 {
        return Err(SettingsError::PrivilegedPort(settings.port));
    }

    if let Some(ctx) = settings.context_size {
        if !(512..=1_000_000).contains(&ctx) {
            return Err(SettingsError::InvalidContextSize(ctx));
        }
    }

    let durations = [
        ("poll interval", settings.poll_interval_ms),
        ("fast poll interval", settings.fast_poll_interval_ms),
        ("probe timeout", settings.probe_timeout_ms),
        ("spawn timeout", settings.spawn_timeout_ms),
        ("max unready time", settings.max_unready_ms),
        ("stop grace period", settings.stop_grace_ms),
    ];
    if let Some((name, _)) = durations.into_iter().find(|(_, ms)| *ms == 0) {
        return Err(SettingsError::ZeroDuration(name));
    }

    if settings.probe_timeout_ms >= settings.max_unready_ms {
        return Err(SettingsError::ProbeExceedsUnready {
            probe_ms: settings.probe_timeout_ms,
            max_unready_ms: settings.max_unready_ms,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&ControllerSettings::default()).is_ok());
    }

    #[test]
    fn default_poll_is_five_seconds() {
        assert_eq!(
            ControllerSettings::default().poll_interval(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn privileged_port_rejected() {
        let settings = ControllerSettings {
            port: 80,
            ..ControllerSettings::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::PrivilegedPort(80))
        );
    }

    #[test]
    fn context_size_bounds() {
        let settings = ControllerSettings {
            context_size: Some(100),
            ..ControllerSettings::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidContextSize(100))
        );
    }

    #[test]
    fn zero_interval_rejected() {
        let settings = ControllerSettings {
            fast_poll_interval_ms: 0,
            ..ControllerSettings::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::ZeroDuration("fast poll interval"))
        );
    }

    #[test]
    fn probe_must_fit_in_unready_window() {
        let settings = ControllerSettings {
            probe_timeout_ms: 5_000,
            max_unready_ms: 5_000,
            ..ControllerSettings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::ProbeExceedsUnready { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: ControllerSettings = serde_json::from_str(r#"{"port": 9090}"#).unwrap();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.host, DEFAULT_SERVER_HOST);
        assert_eq!(settings.address(), "127.0.0.1:9090");
    }
}
