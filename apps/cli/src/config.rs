//! Layered CLI configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `ehr.toml` in the working directory, or the file given with `--config`
//! 3. `EHR__*` environment variables (`EHR__LOGGING__LEVEL=debug`)
//!
//! FHIR credentials are not part of this file; they come from the
//! `FHIR_*` environment and the command line.

use anyhow::Context;
use config::{Environment, File, FileFormat};
use ehr_client::ClientOptions;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "ehr.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default level for the ehr crates when `RUST_LOG` is unset
    pub level: String,
    /// JSON lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_seconds),
            ..Default::default()
        }
    }
}

impl Config {
    /// Load configuration; an explicit `path` must exist, the default file may not
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Self::builder()?
            .add_source(file)
            .add_source(Environment::with_prefix("EHR").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with an in-memory TOML document
    pub fn from_toml(toml: &str) -> anyhow::Result<Self> {
        let config: Self = Self::builder()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("client.timeout_seconds", 30)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client.timeout_seconds == 0 {
            anyhow::bail!("client.timeout_seconds must be greater than zero");
        }
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level must not be empty");
        }
        Ok(())
    }
}
