use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::container::ContainerKind;
use crate::fetch::FetchOptions;
use crate::manifest::{DuplicatePolicy, ResourceSelector};
use crate::retry::RetryPolicy;

/// Environment variable that overrides `task_store_url`.
pub const TASK_STORE_URL_ENV: &str = "PKGCHECK_TASK_STORE_URL";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per package fetch (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Transfer timeouts. Every fetch gets all of them; none can be disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    /// Hard wall-clock limit for one transfer attempt.
    pub timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl FetchConfig {
    pub fn to_options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs.max(1)),
        }
    }
}

/// Global configuration loaded from `~/.config/pkgcheck/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkgcheckConfig {
    /// Upper bound on concurrently in-flight fetch+validate units.
    pub max_concurrent_units: usize,
    /// Container type of the packages listed in manifests.
    #[serde(default)]
    pub container: ContainerKind,
    /// Run the record-table scan after the integrity check.
    #[serde(default)]
    pub scan_records: bool,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Connection URL of the task metadata store (e.g. `mysql://...`).
    #[serde(default)]
    pub task_store_url: Option<String>,
    #[serde(default)]
    pub selector: ResourceSelector,
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for PkgcheckConfig {
    fn default() -> Self {
        Self {
            max_concurrent_units: 16,
            container: ContainerKind::default(),
            scan_records: false,
            duplicate_policy: DuplicatePolicy::default(),
            task_store_url: None,
            selector: ResourceSelector::default(),
            fetch: FetchConfig::default(),
            retry: None,
        }
    }
}

impl PkgcheckConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    /// Task store URL from the environment, falling back to the config file.
    pub fn resolved_task_store_url(&self) -> Option<String> {
        std::env::var(TASK_STORE_URL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.task_store_url.clone())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pkgcheck")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PkgcheckConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PkgcheckConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PkgcheckConfig = toml::from_str(&data)?;
    Ok(cfg)
}
