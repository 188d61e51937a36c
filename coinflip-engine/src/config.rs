use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub round_duration: Duration,
    pub buy_in: f64,
    /// Fraction of the pot kept by the protocol, e.g. 0.05 for 5%.
    pub rake: f64,
    pub history_limit: usize,
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(60),
            buy_in: 1.0,
            rake: 0.05,
            history_limit: 50,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl EngineConfig {
    pub fn with_round_duration(mut self, round_duration: Duration) -> Self {
        self.round_duration = round_duration;
        self
    }

    pub fn with_buy_in(mut self, buy_in: f64) -> Self {
        self.buy_in = buy_in;
        self
    }

    pub fn with_rake(mut self, rake: f64) -> Self {
        self.rake = rake;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Load a JSON config file; missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.round_duration.is_zero() {
            return Err(EngineError::config("Round duration must be greater than 0"));
        }

        if chrono::Duration::from_std(self.round_duration).is_err() {
            return Err(EngineError::config("Round duration is out of range"));
        }

        if self.tick_interval.is_zero() {
            return Err(EngineError::config("Tick interval must be greater than 0"));
        }

        if !self.buy_in.is_finite() || self.buy_in <= 0.0 {
            return Err(EngineError::config("Buy-in must be a positive amount"));
        }

        if !(0.0..1.0).contains(&self.rake) {
            return Err(EngineError::config("Rake must be within [0, 1)"));
        }

        if self.history_limit == 0 {
            return Err(EngineError::config("History limit must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.round_duration, Duration::from_secs(60));
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(EngineConfig::default().with_rake(1.0).validate().is_err());
        assert!(EngineConfig::default().with_rake(-0.1).validate().is_err());
        assert!(EngineConfig::default().with_buy_in(0.0).validate().is_err());
        assert!(EngineConfig::default()
            .with_buy_in(f64::NAN)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_history_limit(0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_round_duration(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"buy_in": 2.5}"#).unwrap();
        assert_eq!(config.buy_in, 2.5);
        assert_eq!(config.rake, 0.05);
        assert!(config.validate().is_ok());
    }
}
