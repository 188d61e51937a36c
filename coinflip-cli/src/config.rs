use anyhow::Context;
use coinflip_engine::EngineConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command-line overrides applied on top of the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub round_duration_secs: Option<u64>,
    pub buy_in: Option<f64>,
    pub rake: Option<f64>,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coinflip")
        .join("config.json")
}

/// An explicit path must exist; the default path is optional
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                tracing::debug!("Loading config from {}", default_path.display());
                EngineConfig::from_file(&default_path)?
            } else {
                EngineConfig::default()
            }
        }
    };

    if let Some(secs) = overrides.round_duration_secs {
        config.round_duration = Duration::from_secs(secs);
    }
    if let Some(buy_in) = overrides.buy_in {
        config.buy_in = buy_in;
    }
    if let Some(rake) = overrides.rake {
        config.rake = rake;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_then_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"buy_in": 5.0, "history_limit": 10}"#).unwrap();

        let overrides = ConfigOverrides {
            round_duration_secs: Some(30),
            rake: Some(0.1),
            ..Default::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();

        assert_eq!(config.buy_in, 5.0);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.round_duration, Duration::from_secs(30));
        assert_eq!(config.rake, 0.1);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let overrides = ConfigOverrides {
            rake: Some(1.5),
            ..Default::default()
        };
        assert!(load_config(Some(&path), &overrides).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(load_config(Some(&path), &ConfigOverrides::default()).is_err());
    }
}
