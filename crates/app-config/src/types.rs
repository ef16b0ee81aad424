// In crates/app-config/src/types.rs

use core_types::Mode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub server: ServerSettings,
    /// Where result files live for each mode.
    pub data: DataSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    #[serde(default)]
    pub ping: PingSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Data directories, one per mode. Each holds `summary/`, `result/` and
/// `processed/` subdirectories.
#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    pub backtest_dir: PathBuf,
    pub live_dir: PathBuf,
    /// Mode used when a request does not name one.
    #[serde(default)]
    pub default_mode: Mode,
}

impl DataSettings {
    pub fn root_for(&self, mode: Mode) -> &Path {
        match mode {
            Mode::Backtest => &self.backtest_dir,
            Mode::Live => &self.live_dir,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnalyticsSettings {
    /// Capital the equity curve starts from.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PingSettings {
    #[serde(default = "default_ping_log_path")]
    pub log_path: PathBuf,
    /// Maximum number of lines the ping log keeps.
    #[serde(default = "default_ping_capacity")]
    pub capacity: usize,
    /// Seconds between heartbeats sent by `app ping`.
    #[serde(default = "default_ping_interval")]
    pub interval_secs: u64,
    /// Offset from UTC, in minutes, used to stamp ping lines.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for PingSettings {
    fn default() -> Self {
        Self {
            log_path: default_ping_log_path(),
            capacity: default_ping_capacity(),
            interval_secs: default_ping_interval(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

// Helper functions for serde defaults.
fn default_initial_capital() -> f64 { 100_000.0 }
fn default_ping_log_path() -> PathBuf { PathBuf::from("logs/ping.txt") }
fn default_ping_capacity() -> usize { 100 }
fn default_ping_interval() -> u64 { 60 }
fn default_utc_offset_minutes() -> i32 { 330 } // IST
