use super::schema::TunesmithConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./tunesmith.yaml
    /// 2. ~/.tunesmith/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<TunesmithConfig, ConfigError> {
        let local_config = PathBuf::from("./tunesmith.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".tunesmith").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(TunesmithConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<TunesmithConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: TunesmithConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
