use anyhow::{anyhow, Result};
use chrono::FixedOffset;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration structure containing all config sections
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub app: AppInfo,
}

/// Dispatch scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Tick cadence in seconds. One tick covers one wall-clock minute.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Trading-calendar zone as a fixed UTC offset, e.g. "+03:00". The
    /// scheduler never falls back to the host-local zone.
    #[serde(default = "default_trading_utc_offset")]
    pub trading_utc_offset: String,

    /// Maximum concurrent dispatch workers.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Pacing delay before each gateway call, to smooth bursts within a
    /// minute against the upstream rate limit.
    #[serde(default = "default_dispatch_delay_ms")]
    pub dispatch_delay_ms: u64,

    /// How long shutdown waits for in-flight dispatches before aborting.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_trading_utc_offset() -> String {
    "+03:00".to_string()
}

fn default_worker_count() -> usize {
    8
}

fn default_dispatch_delay_ms() -> u64 {
    200
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            trading_utc_offset: default_trading_utc_offset(),
            worker_count: default_worker_count(),
            dispatch_delay_ms: default_dispatch_delay_ms(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl SchedulerConfig {
    /// Parses the configured trading zone offset.
    pub fn trading_zone(&self) -> Result<FixedOffset> {
        self.trading_utc_offset
            .parse::<FixedOffset>()
            .map_err(|e| {
                anyhow!(
                    "Invalid trading_utc_offset '{}': {}",
                    self.trading_utc_offset,
                    e
                )
            })
    }
}

/// Limits refresh batch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Attempts per instrument before recording a null band.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff between attempts grows as base * attempt index.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Pause between instruments, sequential by design.
    #[serde(default = "default_pause_between_ms")]
    pub pause_between_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    200
}

fn default_pause_between_ms() -> u64 {
    200
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            pause_between_ms: default_pause_between_ms(),
        }
    }
}

/// Application information
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppInfo {
    #[serde(default)]
    pub running_in_docker: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        info!("Loaded configuration from {}", path.display());
        debug!("Running in Docker: {}", config.app.running_in_docker);

        Ok(config)
    }
}
