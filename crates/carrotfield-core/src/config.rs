//! Configuration loading and validation for the Carrotfield simulation.
//!
//! The canonical configuration lives in `carrotfield-config.yaml`. Every
//! key is optional and falls back to the defaults below. The controller
//! receives the validated struct by value at construction; there is no
//! process-wide configuration instance.

use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use carrotfield_agents::BehaviorConfig;
use carrotfield_world::grid::MAX_GRID_SIZE;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or emit YAML.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// A value is outside its documented range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// The offending key.
        field: &'static str,
        /// What the key must satisfy.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Durations are in milliseconds. Values are read when a run starts;
/// changing them requires [`Simulation::reconfigure`] between runs.
///
/// [`Simulation::reconfigure`]: crate::Simulation::reconfigure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side length of the square grid.
    pub grid_size: u32,

    /// Producers placed at start (each brings a protector).
    pub producer_count: u32,

    /// Interval between world ticks (growth and spawn roll).
    pub growth_interval_ms: u64,

    /// Time a producer spends repairing a damaged cell.
    pub repair_duration_ms: u64,

    /// Time a producer spends planting an empty cell.
    pub plant_duration_ms: u64,

    /// Chebyshev radius of a protector's own scan.
    pub detection_range: u32,

    /// Probability of a consumer spawning on each world tick.
    pub spawn_rate: f64,

    /// Chebyshev radius a producer scans to alert its protector.
    pub alert_radius: u32,

    /// Pause between producer iterations.
    pub patrol_interval_ms: u64,

    /// Pause between consumer iterations.
    pub consumer_move_interval_ms: u64,

    /// Time a consumer spends eating a ready cell.
    pub eating_duration_ms: u64,

    /// Pause between protector iterations.
    pub protector_interval_ms: u64,

    /// Smallest appetite a spawned consumer can have.
    pub appetite_min: u32,

    /// Largest appetite a spawned consumer can have.
    pub appetite_max: u32,

    /// How long `stop()` waits for each task before abandoning it.
    pub shutdown_timeout_ms: u64,

    /// Renderer polling cadence.
    pub refresh_interval_ms: u64,

    /// Seed for the controller's random choices. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            producer_count: 3,
            growth_interval_ms: 1000,
            repair_duration_ms: 3000,
            plant_duration_ms: 2000,
            detection_range: 5,
            spawn_rate: 0.3,
            alert_radius: 3,
            patrol_interval_ms: 1000,
            consumer_move_interval_ms: 1000,
            eating_duration_ms: 500,
            protector_interval_ms: 800,
            appetite_min: 3,
            appetite_max: 7,
            shutdown_timeout_ms: 1000,
            refresh_interval_ms: 100,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Write as YAML, creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Check every value against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(invalid(
                "grid_size",
                format!("must be between 1 and {MAX_GRID_SIZE}"),
            ));
        }
        let cells = u64::from(self.grid_size).saturating_mul(u64::from(self.grid_size));
        if u64::from(self.producer_count) > cells {
            return Err(invalid(
                "producer_count",
                format!("must not exceed the {cells} cells of the grid"),
            ));
        }

        for (field, value) in [
            ("growth_interval_ms", self.growth_interval_ms),
            ("repair_duration_ms", self.repair_duration_ms),
            ("plant_duration_ms", self.plant_duration_ms),
            ("patrol_interval_ms", self.patrol_interval_ms),
            ("consumer_move_interval_ms", self.consumer_move_interval_ms),
            ("eating_duration_ms", self.eating_duration_ms),
            ("protector_interval_ms", self.protector_interval_ms),
            ("shutdown_timeout_ms", self.shutdown_timeout_ms),
            ("refresh_interval_ms", self.refresh_interval_ms),
        ] {
            if value == 0 {
                return Err(invalid(field, "duration must be positive"));
            }
        }

        if self.detection_range == 0 {
            return Err(invalid("detection_range", "must be positive"));
        }
        if self.alert_radius == 0 {
            return Err(invalid("alert_radius", "must be positive"));
        }
        if !self.spawn_rate.is_finite() || !(0.0..=1.0).contains(&self.spawn_rate) {
            return Err(invalid("spawn_rate", "must be within [0, 1]"));
        }
        if self.appetite_min == 0 {
            return Err(invalid("appetite_min", "must be at least 1"));
        }
        if self.appetite_max < self.appetite_min {
            return Err(invalid("appetite_max", "must not be below appetite_min"));
        }
        Ok(())
    }

    /// Think-times and radii for the actor loops.
    pub const fn behavior(&self) -> BehaviorConfig {
        BehaviorConfig {
            repair_duration: Duration::from_millis(self.repair_duration_ms),
            plant_duration: Duration::from_millis(self.plant_duration_ms),
            patrol_interval: Duration::from_millis(self.patrol_interval_ms),
            alert_radius: self.alert_radius,
            eating_duration: Duration::from_millis(self.eating_duration_ms),
            consumer_move_interval: Duration::from_millis(self.consumer_move_interval_ms),
            detection_range: self.detection_range,
            protector_interval: Duration::from_millis(self.protector_interval_ms),
        }
    }

    /// World tick interval.
    pub const fn growth_interval(&self) -> Duration {
        Duration::from_millis(self.growth_interval_ms)
    }

    /// Per-task bound used by `stop()`.
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Renderer polling cadence.
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Appetite range for spawned consumers.
    pub const fn appetite_range(&self) -> RangeInclusive<u32> {
        self.appetite_min..=self.appetite_max
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size, 10);
        assert!((config.spawn_rate - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_partial_yaml_uses_defaults() {
        let yaml = r"
grid_size: 20
spawn_rate: 0.5
seed: 42
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.repair_duration_ms, 3000);
        assert_eq!(config.detection_range, 5);
    }

    #[test]
    fn parse_empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn rejects_spawn_rate_above_one() {
        let err = SimulationConfig::parse("spawn_rate: 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "spawn_rate",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_durations_and_ranges() {
        let cases = [
            ("plant_duration_ms: 0", "plant_duration_ms"),
            ("repair_duration_ms: 0", "repair_duration_ms"),
            ("growth_interval_ms: 0", "growth_interval_ms"),
            ("detection_range: 0", "detection_range"),
            ("grid_size: 0", "grid_size"),
            ("appetite_min: 5\nappetite_max: 2", "appetite_max"),
            ("grid_size: 2\nproducer_count: 5", "producer_count"),
        ];
        for (yaml, expected) in cases {
            match SimulationConfig::parse(yaml) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{yaml}"),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            SimulationConfig::parse("grid_size: [nope"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn yaml_round_trip() {
        let config = SimulationConfig {
            grid_size: 12,
            seed: Some(7),
            ..SimulationConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SimulationConfig::parse(&yaml).unwrap(), config);
    }

    #[test]
    fn behavior_carries_durations() {
        let config = SimulationConfig {
            plant_duration_ms: 1234,
            detection_range: 9,
            ..SimulationConfig::default()
        };
        let behavior = config.behavior();
        assert_eq!(behavior.plant_duration, Duration::from_millis(1234));
        assert_eq!(behavior.detection_range, 9);
        assert_eq!(config.appetite_range(), 3..=7);
    }
}
