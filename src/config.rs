// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{AccelError, Result};
use ::config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "accel-transfer.toml";
const ENV_PREFIX: &str = "ACCEL_TRANSFER";
const LOCKS_DIR_NAME: &str = "locks";

/// Name shared by every process using this library; the lock file is derived from it.
pub const DEFAULT_LOCK_NAME: &str = "accel-transfer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelConfig {
    /// When false the accelerated path is never attempted.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub locking: LockingConfig,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transfer: TransferConfig::default(),
            locking: LockingConfig::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Transfer tuning supplied by the host client.
///
/// Both values are optional; zero or negative values count as unset and leave the
/// decision to the throughput negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransferConfig {
    /// Throughput ceiling in bytes per second.
    #[serde(default)]
    pub max_bandwidth: Option<i64>,

    /// Multipart part size in bytes.
    #[serde(default)]
    pub multipart_chunksize: Option<i64>,
}

impl TransferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bandwidth(mut self, bytes_per_sec: i64) -> Self {
        self.max_bandwidth = Some(bytes_per_sec);
        self
    }

    pub fn with_multipart_chunksize(mut self, bytes: i64) -> Self {
        self.multipart_chunksize = Some(bytes);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockingConfig {
    #[serde(default)]
    pub locks_dir: Option<PathBuf>,

    #[serde(default = "default_lock_name")]
    pub lock_name: String,
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            locks_dir: None,
            lock_name: DEFAULT_LOCK_NAME.to_string(),
        }
    }
}

fn default_lock_name() -> String {
    DEFAULT_LOCK_NAME.to_string()
}

impl LockingConfig {
    /// Directory holding lock files, defaulting to `~/.accel-transfer/locks`.
    ///
    /// The system temp dir is only used when no home directory can be found.
    pub fn resolved_locks_dir(&self) -> PathBuf {
        if let Some(dir) = &self.locks_dir {
            return dir.clone();
        }
        let base = dirs::home_dir()
            .map(|home| home.join(format!(".{DEFAULT_LOCK_NAME}")))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOCK_NAME));
        base.join(LOCKS_DIR_NAME)
    }
}

impl AccelConfig {
    /// Loads `accel-transfer.toml` from `dir` (if present) layered under
    /// `ACCEL_TRANSFER_*` environment variables.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            log::debug!("Loading config from {config_path:?}");
        } else {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = ::config::Config::builder()
            .add_source(
                File::from(config_path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AccelConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| AccelError::ConfigError(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, contents)?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.locking.lock_name.trim();
        if name.is_empty() {
            return Err(AccelError::InvalidConfig(
                "locking.lock_name must not be empty".to_string(),
            ));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(AccelError::InvalidConfig(format!(
                "locking.lock_name '{name}' must be a plain file name"
            )));
        }
        Ok(())
    }
}
