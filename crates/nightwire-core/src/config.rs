//! Configuration loading and typed config structures for Nightwire.
//!
//! The configuration lives in `nightwire-config.yaml` next to the binary, or
//! wherever `NIGHTWIRE_CONFIG` points. Every field has a default, so a
//! missing file, an empty file, and a file that sets a single key are all
//! valid.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use nightwire_world::ScanSettings;
use serde::Deserialize;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nightwire-config.yaml";

/// Environment variable that overrides the config path.
pub const CONFIG_ENV_VAR: &str = "NIGHTWIRE_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed, start time, and run-ending policy.
    #[serde(default)]
    pub world: WorldConfig,

    /// Starting resources and focus thresholds.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Hourly decay rates for the player's meters.
    #[serde(default)]
    pub decay: DecayConfig,

    /// Scan sample size and home-region bias.
    #[serde(default)]
    pub scan: ScanSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless session settings, read only by the engine binary.
    #[serde(default)]
    pub autopilot: AutopilotConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. An empty string yields the
    /// defaults.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `NIGHTWIRE_CONFIG` if set, else from [`DEFAULT_CONFIG_FILE`].
    ///
    /// A missing default file is not an error; an explicitly named file that
    /// does not exist is.
    pub fn load() -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            return Ok((Self::from_file(&path)?, Some(path)));
        }
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Ok((Self::from_file(&path)?, Some(path)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("decay.focus_per_hour", self.decay.focus_per_hour),
            ("decay.risk_per_hour", self.decay.risk_per_hour),
            ("decay.addiction_per_hour", self.decay.addiction_per_hour),
            ("player.starting_money", self.player.starting_money),
            ("scan.home_bonus", self.scan.home_bonus),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        let thresholds = [
            ("player.min_focus_study", self.player.min_focus_study),
            ("player.min_focus_work", self.player.min_focus_work),
        ];
        for (field, value) in thresholds {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be within [0, 100], got {value}"),
                });
            }
        }
        if self.player.inventory_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "player.inventory_limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.scan.limit == 0 {
            return Err(ConfigError::Invalid {
                field: "scan.limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// RNG seed. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Simulated start timestamp.
    #[serde(default = "default_start")]
    pub start: NaiveDateTime,

    /// Whether incarceration ends the run.
    #[serde(default = "default_true")]
    pub jail_ends_run: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start: default_start(),
            jail_ends_run: true,
        }
    }
}

/// Player starting conditions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerConfig {
    /// Cash at run start.
    #[serde(default = "default_starting_money")]
    pub starting_money: f64,

    /// Maximum number of held items.
    #[serde(default = "default_inventory_limit")]
    pub inventory_limit: usize,

    /// Focus needed to study.
    #[serde(default = "default_min_focus_study")]
    pub min_focus_study: f64,

    /// Focus needed to take a day job.
    #[serde(default = "default_min_focus_work")]
    pub min_focus_work: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            inventory_limit: default_inventory_limit(),
            min_focus_study: default_min_focus_study(),
            min_focus_work: default_min_focus_work(),
        }
    }
}

/// Hourly decay of focus, risk, and addiction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DecayConfig {
    /// Focus lost per hour (doubled while addicted).
    #[serde(default = "default_focus_per_hour")]
    pub focus_per_hour: f64,

    /// Risk shed per hour.
    #[serde(default = "default_risk_per_hour")]
    pub risk_per_hour: f64,

    /// Addiction shed per hour.
    #[serde(default = "default_addiction_per_hour")]
    pub addiction_per_hour: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            focus_per_hour: default_focus_per_hour(),
            risk_per_hour: default_risk_per_hour(),
            addiction_per_hour: default_addiction_per_hour(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is
    /// unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Headless autopilot session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AutopilotConfig {
    /// Number of world days to play before stopping.
    #[serde(default = "default_autopilot_days")]
    pub days: u32,

    /// Seed override for the session; falls back to `world.seed`.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            days: default_autopilot_days(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2095, 11, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default()
}

const fn default_true() -> bool {
    true
}

const fn default_starting_money() -> f64 {
    75.0
}

const fn default_inventory_limit() -> usize {
    6
}

const fn default_min_focus_study() -> f64 {
    35.0
}

const fn default_min_focus_work() -> f64 {
    25.0
}

const fn default_focus_per_hour() -> f64 {
    0.32231
}

const fn default_risk_per_hour() -> f64 {
    0.17
}

const fn default_addiction_per_hour() -> f64 {
    0.12
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_autopilot_days() -> u32 {
    60
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, None);
        assert!(config.world.jail_ends_run);
        assert_eq!(config.world.start.hour(), 8);
        assert_eq!(config.player.inventory_limit, 6);
        assert_eq!(config.scan.limit, 6);
        assert_eq!(config.autopilot.days, 60);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_only_named_keys() {
        let yaml = r"
world:
  seed: 7
  jail_ends_run: false
decay:
  risk_per_hour: 0.5
scan:
  limit: 3
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert!(!config.world.jail_ends_run);
        assert!((config.decay.risk_per_hour - 0.5).abs() < f64::EPSILON);
        assert!((config.decay.focus_per_hour - 0.32231).abs() < f64::EPSILON);
        assert_eq!(config.scan.limit, 3);
        assert!((config.scan.home_bonus - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn start_timestamp_parses() {
        let yaml = "world:\n  start: \"2100-01-01T00:00:00\"\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.start.hour(), 0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let negative = "decay:\n  focus_per_hour: -1.0\n";
        assert!(matches!(
            SimulationConfig::parse(negative),
            Err(ConfigError::Invalid { field: "decay.focus_per_hour", .. })
        ));
        let zero = "player:\n  inventory_limit: 0\n";
        assert!(matches!(
            SimulationConfig::parse(zero),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn shipped_config_parses() {
        let config = SimulationConfig::parse(include_str!("../../../nightwire-config.yaml")).unwrap();
        assert_eq!(config.world.seed, Some(42));
        assert_eq!(config.autopilot.days, 60);
        assert!((config.scan.home_bonus - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_yaml_is_a_parse_error() {
        assert!(matches!(
            SimulationConfig::parse("world: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
