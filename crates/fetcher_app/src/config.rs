use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use fetcher_store::{Environment, ExportSettings, StorageLayout, DEFAULT_BUCKET};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const CONFIG_ENV_VAR: &str = "FETCHER_CONFIG";
pub const ENVIRONMENT_ENV_VAR: &str = "FETCHER_ENV";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub environment: Environment,
    pub bucket: String,
    /// Directory holding one sub-directory per bucket.
    pub storage_root: PathBuf,
    pub tick_interval_secs: u64,
    pub export_timeout_secs: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            bucket: DEFAULT_BUCKET.to_string(),
            storage_root: PathBuf::from("./storage"),
            tick_interval_secs: 60,
            export_timeout_secs: 30,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl FetcherConfig {
    /// Loads the RON config at `path`, or defaults when there is no file.
    ///
    /// `FETCHER_ENV` overrides the configured environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_environment_override(std::env::var(ENVIRONMENT_ENV_VAR).ok().as_deref())
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read config file {}", path.display()))
            }
        }
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_environment_override(mut self, value: Option<&str>) -> anyhow::Result<Self> {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.environment = value
                .parse()
                .map_err(|err: String| anyhow!("{ENVIRONMENT_ENV_VAR}: {err}"))?;
        }
        Ok(self)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.tick_interval_secs == 0 {
            return Err(anyhow!("tick_interval_secs must be positive"));
        }
        if self.export_timeout_secs == 0 {
            return Err(anyhow!("export_timeout_secs must be positive"));
        }
        if self.bucket.trim().is_empty() {
            return Err(anyhow!("bucket must not be empty"));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow!("unknown log level `{}`", self.log_level))
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(self.bucket.clone(), self.environment)
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            write_timeout: Duration::from_secs(self.export_timeout_secs),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}
