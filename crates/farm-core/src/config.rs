//! Session configuration, loadable from YAML.

use crate::{ValidationError, Weather, MAX_ENERGY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading configuration or catalog files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Catalog(#[from] ValidationError),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Clock multiplier. Only the four speeds the clock offers are accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum GameSpeed {
    Half,
    #[default]
    Normal,
    Double,
    Triple,
}

impl GameSpeed {
    pub const ALL: [GameSpeed; 4] = [
        GameSpeed::Half,
        GameSpeed::Normal,
        GameSpeed::Double,
        GameSpeed::Triple,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            GameSpeed::Half => 0.5,
            GameSpeed::Normal => 1.0,
            GameSpeed::Double => 2.0,
            GameSpeed::Triple => 3.0,
        }
    }

    /// Timer period for this speed: `base / multiplier`.
    pub fn period(self, base: Duration) -> Duration {
        base.div_f64(self.multiplier())
    }
}

impl TryFrom<f64> for GameSpeed {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        GameSpeed::ALL
            .into_iter()
            .find(|s| (s.multiplier() - value).abs() < f64::EPSILON)
            .ok_or_else(|| format!("unsupported game speed {value}, expected 0.5, 1, 2 or 3"))
    }
}

impl From<GameSpeed> for f64 {
    fn from(speed: GameSpeed) -> Self {
        speed.multiplier()
    }
}

impl fmt::Display for GameSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// Clock driver settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Real time per simulated day at normal speed.
    pub base_interval_ms: u64,
    pub speed: GameSpeed,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 3000,
            speed: GameSpeed::Normal,
        }
    }
}

impl ClockConfig {
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Seed for the deterministic RNG (weather, growth trials, bonuses).
    pub rng_seed: u64,
    pub starting_currency: u64,
    pub starting_energy: u32,
    pub starting_weather: Weather,
    /// Pending notifications kept before the oldest is dropped.
    pub notification_capacity: usize,
    /// How long the presentation layer shows each notification.
    pub notification_display_ms: u64,
    /// Optional catalog file replacing the built-in tables.
    pub catalog: Option<PathBuf>,
    pub clock: ClockConfig,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            starting_currency: 1000,
            starting_energy: MAX_ENERGY,
            starting_weather: Weather::Sunny,
            notification_capacity: 8,
            notification_display_ms: 3000,
            catalog: None,
            clock: ClockConfig::default(),
        }
    }
}

impl FarmConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: FarmConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_yaml_str(&text)?;
        info!(path = %path.display(), seed = cfg.rng_seed, "config loaded");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_energy > MAX_ENERGY {
            return Err(ConfigError::Invalid {
                field: "starting_energy",
                reason: format!("must be at most {MAX_ENERGY}"),
            });
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "notification_capacity",
                reason: "must be at least 1".into(),
            });
        }
        if self.clock.base_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "clock.base_interval_ms",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn notification_display(&self) -> Duration {
        Duration::from_millis(self.notification_display_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_session() {
        let cfg = FarmConfig::default();
        assert_eq!(cfg.starting_currency, 1000);
        assert_eq!(cfg.starting_energy, 100);
        assert_eq!(cfg.starting_weather, Weather::Sunny);
        assert_eq!(cfg.clock.base_interval(), Duration::from_millis(3000));
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = FarmConfig::from_yaml_str("rng_seed: 9\nclock:\n  speed: 2\n").unwrap();
        assert_eq!(cfg.rng_seed, 9);
        assert_eq!(cfg.clock.speed, GameSpeed::Double);
        assert_eq!(cfg.clock.base_interval_ms, 3000);
        assert_eq!(cfg.starting_currency, 1000);
    }

    #[test]
    fn bundled_config_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/farm.yaml");
        let cfg = FarmConfig::load(path).unwrap();
        assert_eq!(cfg.rng_seed, 2024);
        assert_eq!(cfg.clock.speed, GameSpeed::Normal);
        assert!(cfg.catalog.is_none());
    }

    #[test]
    fn rejects_unknown_speed() {
        let err = FarmConfig::from_yaml_str("clock:\n  speed: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn rejects_overfull_energy() {
        let err = FarmConfig::from_yaml_str("starting_energy: 150\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "starting_energy",
                ..
            }
        ));
    }

    #[test]
    fn speed_scales_period() {
        let base = Duration::from_millis(3000);
        assert_eq!(GameSpeed::Half.period(base), Duration::from_millis(6000));
        assert_eq!(GameSpeed::Normal.period(base), Duration::from_millis(3000));
        assert_eq!(GameSpeed::Double.period(base), Duration::from_millis(1500));
        assert_eq!(GameSpeed::Triple.period(base), Duration::from_millis(1000));
        assert_eq!(GameSpeed::try_from(0.5), Ok(GameSpeed::Half));
        assert!(GameSpeed::try_from(4.0).is_err());
    }
}
