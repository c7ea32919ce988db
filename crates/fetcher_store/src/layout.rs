use std::fmt;
use std::str::FromStr;

use fetcher_core::{SnapshotKind, STATE_VERSION};
use serde::{Deserialize, Serialize};

use crate::codec::CODEC_EXTENSION;

pub const DEFAULT_BUCKET: &str = "fly-xc.appspot.com";

/// Deployment environment; selects the storage folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn folder(self) -> &'static str {
        match self {
            Environment::Development => "fetcher.dev",
            Environment::Production => "fetcher",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where snapshots live: a bucket plus version-qualified object paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    bucket: String,
    folder: String,
    version: u32,
}

impl StorageLayout {
    pub fn new(bucket: impl Into<String>, environment: Environment) -> Self {
        Self {
            bucket: bucket.into(),
            folder: environment.folder().to_string(),
            version: STATE_VERSION,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `<folder>/state_v<version>[.shutdown].<ext>`
    pub fn path(&self, kind: SnapshotKind) -> String {
        match kind {
            SnapshotKind::Periodic => format!(
                "{}/state_v{}.{}",
                self.folder, self.version, CODEC_EXTENSION
            ),
            SnapshotKind::Shutdown => format!(
                "{}/state_v{}.shutdown.{}",
                self.folder, self.version, CODEC_EXTENSION
            ),
        }
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET, Environment::default())
    }
}
