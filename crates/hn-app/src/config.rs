//! Application configuration (YAML).

use std::path::{Path, PathBuf};
use std::time::Duration;

use hn_analysis::{DispatchOptions, ExecutionMode};
use hn_core::BufferType;
use hn_storage::DEFAULT_HEARTBEAT_PREFIX;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Directory name under the platform data dir.
pub const APP_DIR_NAME: &str = "hydronet";

pub const HEARTBEAT_FILE: &str = "heartbeats.json";

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of all application namespaces. Defaults to the platform data dir.
    pub storage_root: Option<PathBuf>,
    /// Heartbeat store. Defaults to `heartbeats.json` beside the storage root.
    pub heartbeat_file: Option<PathBuf>,
    pub heartbeat_prefix: String,
    pub stale_threshold_days: u64,
    pub buffer_type: BufferType,
    pub run_in_worker: bool,
    /// `tracing` filter directives, e.g. `info,hn_storage=debug`.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: None,
            heartbeat_file: None,
            heartbeat_prefix: DEFAULT_HEARTBEAT_PREFIX.to_string(),
            stale_threshold_days: 14,
            buffer_type: BufferType::Array,
            run_in_worker: true,
            log_filter: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Defaults when the file does not exist. A present but invalid file is an error.
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "config not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let content = serde_yaml::to_string(self).map_err(|e| AppError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage_root.clone().unwrap_or_else(default_storage_root)
    }

    pub fn heartbeat_file(&self) -> PathBuf {
        match &self.heartbeat_file {
            Some(path) => path.clone(),
            None => {
                let root = self.storage_root();
                root.parent()
                    .map(|parent| parent.join(HEARTBEAT_FILE))
                    .unwrap_or_else(|| root.join(HEARTBEAT_FILE))
            }
        }
    }

    pub fn stale_threshold(&self) -> Duration {
        DAY * u32::try_from(self.stale_threshold_days).unwrap_or(u32::MAX)
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            buffer_type: self.buffer_type,
            mode: if self.run_in_worker {
                ExecutionMode::Worker
            } else {
                ExecutionMode::Inline
            },
        }
    }
}

/// `<data dir>/hydronet/apps`, or the temp dir when there is no data dir.
pub fn default_storage_root() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join("apps")
}
