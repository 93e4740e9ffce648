use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::application::services::alert_manager::AlertPolicy;
use crate::domain::entities::alert::DeliveryChannels;
use crate::domain::value_objects::log_level::LogLevel;
use crate::domain::value_objects::rotation::RotationPolicy;
use crate::domain::value_objects::thresholds::ThresholdSet;

/// Ticks a single sample may take before it counts as hung.
pub const SAMPLE_BUDGET_TICKS: u32 = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Top-level agent configuration, loaded from JSON (comments allowed).
/// Immutable once validated; components receive the sub-section they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_cpu_threshold")]
    pub cpu_warning_threshold: f64,
    #[serde(default = "default_memory_threshold")]
    pub memory_warning_threshold: f64,
    #[serde(default = "default_disk_threshold")]
    pub disk_warning_threshold: f64,
    /// Bytes per second
    #[serde(default = "default_network_threshold")]
    pub network_speed_warning: f64,
    #[serde(default = "default_process_cpu_threshold")]
    pub process_cpu_warning: f64,
    #[serde(default = "default_process_memory_threshold")]
    pub process_memory_warning: f64,
    /// Seconds between two ticks
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval: u64,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_true")]
    pub enable_console_output: bool,
    #[serde(default = "default_true")]
    pub enable_file_output: bool,
    #[serde(default)]
    pub log_rotation: LogRotationConfig,
    #[serde(default)]
    pub alert_settings: AlertSettings,
    #[serde(default)]
    pub display_settings: DisplaySettings,
    #[serde(default)]
    pub data_export: DataExportConfig,
}

/// Size-based log rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRotationConfig {
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
    #[serde(default = "default_backup_count")]
    pub backup_count: u32,
}

/// Alert delivery toggles and the per-scope cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default)]
    pub enable_email_alerts: bool,
    #[serde(default = "default_true")]
    pub enable_sound_alerts: bool,
    #[serde(default = "default_cooldown")]
    pub alert_cooldown_seconds: u64,
}

/// Renderer options. The agent never reads them; unknown keys are kept
/// so a round-trip through `save_to` does not lose them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_true")]
    pub show_per_core_cpu: bool,
    #[serde(default = "default_true")]
    pub show_network_interfaces: bool,
    #[serde(default)]
    pub show_process_details: bool,
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Periodic CSV export of buffered snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataExportConfig {
    #[serde(default = "default_true")]
    pub enable_csv_export: bool,
    /// Seconds between two flushes
    #[serde(default = "default_export_interval")]
    pub export_interval: u64,
    // NOTE: Stored raw, may start with `~`; use `directory()` at point of use.
    #[serde(default = "default_csv_directory")]
    pub csv_directory: String,
}

// --- Defaults ---

const fn default_cpu_threshold() -> f64 {
    80.0
}

const fn default_memory_threshold() -> f64 {
    80.0
}

const fn default_disk_threshold() -> f64 {
    90.0
}

const fn default_network_threshold() -> f64 {
    104_857_600.0
}

const fn default_process_cpu_threshold() -> f64 {
    50.0
}

const fn default_process_memory_threshold() -> f64 {
    10.0
}

const fn default_monitor_interval() -> u64 {
    1
}

const fn default_true() -> bool {
    true
}

const fn default_max_size_mb() -> u64 {
    10
}

const fn default_backup_count() -> u32 {
    5
}

const fn default_cooldown() -> u64 {
    300
}

const fn default_refresh_rate() -> u64 {
    1
}

const fn default_export_interval() -> u64 {
    60
}

fn default_csv_directory() -> String {
    "exports".into()
}

// --- Default impls ---

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cpu_warning_threshold: default_cpu_threshold(),
            memory_warning_threshold: default_memory_threshold(),
            disk_warning_threshold: default_disk_threshold(),
            network_speed_warning: default_network_threshold(),
            process_cpu_warning: default_process_cpu_threshold(),
            process_memory_warning: default_process_memory_threshold(),
            monitor_interval: default_monitor_interval(),
            log_level: LogLevel::default(),
            enable_console_output: default_true(),
            enable_file_output: default_true(),
            log_rotation: LogRotationConfig::default(),
            alert_settings: AlertSettings::default(),
            display_settings: DisplaySettings::default(),
            data_export: DataExportConfig::default(),
        }
    }
}

impl Default for LogRotationConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
            backup_count: default_backup_count(),
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enable_email_alerts: false,
            enable_sound_alerts: default_true(),
            alert_cooldown_seconds: default_cooldown(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_per_core_cpu: default_true(),
            show_network_interfaces: default_true(),
            show_process_details: false,
            refresh_rate: default_refresh_rate(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Default for DataExportConfig {
    fn default() -> Self {
        Self {
            enable_csv_export: default_true(),
            export_interval: default_export_interval(),
            csv_directory: default_csv_directory(),
        }
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load and validate from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON
    /// (comments are allowed) or holds out-of-range values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON after comment
    /// stripping, or if validation fails.
    pub fn parse(content: &str) -> Result<Self> {
        let stripped = json_comments::StripComments::new(content.as_bytes());
        let config: Self =
            serde_json::from_reader(stripped).context("Failed to parse config file")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Save config to default path
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Default location of the config file
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("hostwatch").join("config.json"))
    }

    /// Check value ranges. Called on every load.
    ///
    /// # Errors
    ///
    /// Returns the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = ThresholdSet::from(self);
        if let Some(name) = thresholds.first_invalid() {
            return Err(invalid(threshold_key(name), "must be greater than 0"));
        }

        for (key, value) in [
            ("cpu_warning_threshold", self.cpu_warning_threshold),
            ("memory_warning_threshold", self.memory_warning_threshold),
            ("disk_warning_threshold", self.disk_warning_threshold),
            ("process_cpu_warning", self.process_cpu_warning),
            ("process_memory_warning", self.process_memory_warning),
        ] {
            if value > 100.0 {
                return Err(invalid(key, "percentage must not exceed 100"));
            }
        }

        if self.monitor_interval < 1 {
            return Err(invalid("monitor_interval", "must be at least 1 second"));
        }
        if self.log_rotation.max_size_mb < 1 {
            return Err(invalid("log_rotation.max_size_mb", "must be at least 1"));
        }
        if self.data_export.enable_csv_export && self.data_export.export_interval < 1 {
            return Err(invalid(
                "data_export.export_interval",
                "must be at least 1 second",
            ));
        }
        if self.data_export.csv_directory.trim().is_empty() {
            return Err(invalid("data_export.csv_directory", "must not be empty"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        Duration::from_secs(self.monitor_interval)
    }

    /// Time a sample may take before it is abandoned as a timeout. Samples
    /// slower than the tick period but inside this budget are overruns.
    #[must_use]
    pub fn sample_budget(&self) -> Duration {
        self.tick_period() * SAMPLE_BUDGET_TICKS
    }
}

impl DataExportConfig {
    /// Export directory with `~` expanded.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.csv_directory).as_ref())
    }

    #[must_use]
    pub const fn flush_period(&self) -> Duration {
        Duration::from_secs(self.export_interval)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn threshold_key(name: &str) -> &'static str {
    match name {
        "cpu" => "cpu_warning_threshold",
        "memory" => "memory_warning_threshold",
        "disk" => "disk_warning_threshold",
        "network" => "network_speed_warning",
        "process_cpu" => "process_cpu_warning",
        _ => "process_memory_warning",
    }
}

impl From<&AppConfig> for ThresholdSet {
    fn from(config: &AppConfig) -> Self {
        Self {
            cpu: config.cpu_warning_threshold,
            memory: config.memory_warning_threshold,
            disk: config.disk_warning_threshold,
            network: config.network_speed_warning,
            process_cpu: config.process_cpu_warning,
            process_memory: config.process_memory_warning,
        }
    }
}

impl From<&LogRotationConfig> for RotationPolicy {
    fn from(config: &LogRotationConfig) -> Self {
        Self::from_megabytes(config.max_size_mb, config.backup_count)
    }
}

impl From<&AlertSettings> for AlertPolicy {
    fn from(settings: &AlertSettings) -> Self {
        Self {
            cooldown_seconds: settings.alert_cooldown_seconds,
            channels: DeliveryChannels {
                sound: settings.enable_sound_alerts,
                email: settings.enable_email_alerts,
            },
        }
    }
}
