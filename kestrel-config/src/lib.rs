//! Configuration loading and typed settings for Kestrel.

pub mod telemetry;

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use kestrel_indicators::accel::DEFAULT_EPSILON;
use kestrel_indicators::{AdParams, BiasParams, Capabilities, NatrParams, UiParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use telemetry::{init_tracing, LogFormat, LoggingSettings};

/// Prefix for environment overrides, e.g. `KESTREL__RUNTIME__ACCELERATED=false`.
pub const ENV_PREFIX: &str = "KESTREL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KestrelConfig {
    pub runtime: RuntimeSettings,
    pub logging: LoggingSettings,
    pub indicators: IndicatorDefaults,
}

impl KestrelConfig {
    /// Parses configuration from TOML text without consulting the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("failed to parse configuration")
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render configuration")
    }
}

/// Computation settings shared by every indicator call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Allow the accelerated backend.
    pub accelerated: bool,
    /// Substitute for zero denominators.
    pub epsilon: f64,
}

impl RuntimeSettings {
    /// Builds the capabilities value indicators run with.
    pub fn capabilities(&self) -> Capabilities {
        let base = if self.accelerated {
            Capabilities::default()
        } else {
            Capabilities::internal_only()
        };
        base.with_epsilon(self.epsilon)
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            accelerated: true,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Raw parameter tables per indicator, e.g. `[indicators.natr]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorDefaults {
    pub bias: BiasParams,
    pub natr: NatrParams,
    pub ui: UiParams,
    pub ad: AdParams,
}

/// Loads configuration from an optional TOML file, then applies
/// `KESTREL__`-prefixed environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<KestrelConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    let config = builder
        .build()
        .with_context(|| match path {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "failed to load configuration from environment".to_string(),
        })?;
    let parsed: KestrelConfig = config
        .try_deserialize()
        .context("failed to parse configuration")?;
    debug!(
        accelerated = parsed.runtime.accelerated,
        epsilon = parsed.runtime.epsilon,
        "loaded configuration"
    );
    Ok(parsed)
}
