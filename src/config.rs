use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::domain::courier::Transport;
use crate::domain::shared_kernel::Location;
use crate::utils::{CircuitBreakerConfig, RetryConfig};

// ============================================================================
// Configuration
// ============================================================================
//
// Loaded from an optional TOML file. Every section has defaults, so the
// binary also runs with no file at all.
//
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "courier_dispatch")]
#[command(about = "Grid courier dispatch with periodic assignment and movement loops")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Place this many orders on startup using the configured streets
    #[arg(long, default_value_t = 0)]
    pub demo_orders: usize,

    /// Override the metrics port from the config file
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub metrics: MetricsConfig,
    pub geocoding: GeocodingConfig,
    pub couriers: Vec<CourierSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub assign_interval_ms: u64,
    pub move_interval_ms: u64,
    pub health_check_interval_ms: u64,
    pub snapshot_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            assign_interval_ms: 1000,
            move_interval_ms: 2000,
            health_check_interval_ms: 10_000,
            snapshot_interval_ms: 5000,
        }
    }
}

impl SchedulerConfig {
    pub fn assign_interval(&self) -> Duration {
        Duration::from_millis(self.assign_interval_ms)
    }

    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_interval_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Street name -> [x, y]
    pub streets: HashMap<String, [i32; 2]>,
    /// Unknown streets resolve to a random cell instead of failing
    pub fallback_random: bool,
    pub retry: RetrySettings,
    pub circuit_breaker: CircuitBreakerSettings,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            streets: HashMap::new(),
            fallback_random: true,
            retry: RetrySettings::default(),
            circuit_breaker: CircuitBreakerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            multiplier: defaults.multiplier,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub timeout_ms: u64,
    pub success_threshold: u32,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        let defaults = CircuitBreakerConfig::default();
        Self {
            failure_threshold: defaults.failure_threshold,
            timeout_ms: defaults.timeout.as_millis() as u64,
            success_threshold: defaults.success_threshold,
        }
    }
}

impl From<&CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &CircuitBreakerSettings) -> Self {
        CircuitBreakerConfig {
            failure_threshold: settings.failure_threshold,
            timeout: Duration::from_millis(settings.timeout_ms),
            success_threshold: settings.success_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CourierSeed {
    pub name: String,
    pub transport: String,
    pub x: i32,
    pub y: i32,
}

impl AppConfig {
    /// Load from `path`, or fall back to defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheduler = &self.scheduler;
        for (field, value) in [
            ("scheduler.assign_interval_ms", scheduler.assign_interval_ms),
            ("scheduler.move_interval_ms", scheduler.move_interval_ms),
            ("scheduler.health_check_interval_ms", scheduler.health_check_interval_ms),
            ("scheduler.snapshot_interval_ms", scheduler.snapshot_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than 0"));
            }
        }

        let retry = &self.geocoding.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::invalid("geocoding.retry.max_attempts", "must be at least 1"));
        }
        if retry.multiplier < 1.0 {
            return Err(ConfigError::invalid("geocoding.retry.multiplier", "must be at least 1.0"));
        }

        let breaker = &self.geocoding.circuit_breaker;
        if breaker.failure_threshold == 0 || breaker.success_threshold == 0 {
            return Err(ConfigError::invalid(
                "geocoding.circuit_breaker",
                "thresholds must be at least 1",
            ));
        }

        for (street, [x, y]) in &self.geocoding.streets {
            Location::new(*x, *y).map_err(|e| {
                ConfigError::invalid(format!("geocoding.streets.{}", street), e.to_string())
            })?;
        }

        for (index, seed) in self.couriers.iter().enumerate() {
            let field = format!("couriers[{}]", index);
            if seed.name.trim().is_empty() {
                return Err(ConfigError::invalid(format!("{}.name", field), "cannot be empty"));
            }
            Transport::from_name(&seed.transport)
                .map_err(|e| ConfigError::invalid(format!("{}.transport", field), e.to_string()))?;
            Location::new(seed.x, seed.y)
                .map_err(|e| ConfigError::invalid(format!("{}.location", field), e.to_string()))?;
        }

        Ok(())
    }

    /// Street names usable for demo orders, sorted for stable output
    pub fn street_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.geocoding.streets.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [scheduler]
        assign_interval_ms = 500
        move_interval_ms = 1500

        [metrics]
        enabled = false
        port = 9191

        [geocoding]
        fallback_random = false
        streets = { "Tverskaya" = [3, 7], "Arbat" = [9, 2] }

        [geocoding.retry]
        max_attempts = 4

        [geocoding.circuit_breaker]
        failure_threshold = 3
        timeout_ms = 5000

        [[couriers]]
        name = "Ivan"
        transport = "bicycle"
        x = 1
        y = 1

        [[couriers]]
        name = "Olga"
        transport = "car"
        x = 10
        y = 10
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.scheduler.assign_interval(), Duration::from_millis(500));
        assert_eq!(config.scheduler.move_interval(), Duration::from_millis(1500));
        assert_eq!(config.scheduler.snapshot_interval_ms, 5000);
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.port, 9191);
        assert_eq!(config.geocoding.streets["Arbat"], [9, 2]);
        assert_eq!(config.street_names(), vec!["Arbat".to_string(), "Tverskaya".to_string()]);
        assert_eq!(config.couriers.len(), 2);
        assert_eq!(config.couriers[1].transport, "car");

        let retry = RetryConfig::from(&config.geocoding.retry);
        assert_eq!(retry.max_attempts, 4);
        assert_eq!(retry.initial_delay, RetryConfig::default().initial_delay);

        let breaker = CircuitBreakerConfig::from(&config.geocoding.circuit_breaker);
        assert_eq!(breaker.failure_threshold, 3);
        assert_eq!(breaker.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.scheduler.assign_interval_ms, 1000);
        assert_eq!(config.scheduler.move_interval_ms, 2000);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9090);
        assert!(config.geocoding.fallback_random);
        assert!(config.couriers.is_empty());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = AppConfig::from_toml_str("[scheduler]\nmove_interval_ms = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "scheduler.move_interval_ms"));
    }

    #[test]
    fn test_bad_courier_seed_is_rejected() {
        let toml = r#"
            [[couriers]]
            name = "Ivan"
            transport = "scooter"
            x = 1
            y = 1
        "#;
        let err = AppConfig::from_toml_str(toml).unwrap().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "couriers[0].transport"));

        let toml = r#"
            [[couriers]]
            name = "Ivan"
            transport = "car"
            x = 0
            y = 1
        "#;
        let err = AppConfig::from_toml_str(toml).unwrap().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "couriers[0].location"));
    }

    #[test]
    fn test_off_grid_street_is_rejected() {
        let toml = "[geocoding]\nstreets = { \"Ring Road\" = [11, 3] }";
        let err = AppConfig::from_toml_str(toml).unwrap().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "geocoding.streets.Ring Road"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("[scheduler\nassign_interval_ms = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_cli_args() {
        let args = CliArgs::parse_from(["courier_dispatch", "--config", "dispatch.toml", "--demo-orders", "5"]);
        assert_eq!(args.config, Some(PathBuf::from("dispatch.toml")));
        assert_eq!(args.demo_orders, 5);
        assert_eq!(args.metrics_port, None);
    }
}
