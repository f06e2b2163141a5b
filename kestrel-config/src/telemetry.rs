//! Tracing subscriber setup driven by the `[logging]` table.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

/// `[logging]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Plain,
        }
    }
}

impl LoggingSettings {
    fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|err| anyhow!("invalid log filter '{}': {err}", self.level))
    }
}

/// Installs the global tracing subscriber. Fails if one is already set.
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let filter = settings.filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let settings = LoggingSettings {
            level: "kestrel=loud".into(),
            format: LogFormat::Json,
        };
        let err = settings.filter().unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }

    #[test]
    fn format_parses_lowercase_names() {
        let settings: LoggingSettings = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.level, "info");
    }

    #[test]
    fn second_install_fails() {
        let settings = LoggingSettings {
            level: "debug".into(),
            format: LogFormat::Plain,
        };
        // Either this call or an earlier test in the same process owns the global slot.
        let _ = init_tracing(&settings);
        assert!(init_tracing(&settings).is_err());
    }
}
