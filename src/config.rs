//! Application configuration: defaults, optional YAML file, environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::ehp::{FormulaVariant, HealStacking, Scorer};

pub const DEFAULT_CONFIG_FILE: &str = "blueroad.yaml";
pub const DEFAULT_BIND: &str = "127.0.0.1:3001";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";

pub const ENV_CONFIG: &str = "BLUEROAD_CONFIG";
pub const ENV_BIND: &str = "BLUEROAD_BIND";
pub const ENV_DATA_DIR: &str = "BLUEROAD_DATA_DIR";
pub const ENV_STATIC_DIR: &str = "BLUEROAD_STATIC_DIR";
pub const ENV_FORMULA: &str = "BLUEROAD_FORMULA";
pub const ENV_HEAL_STACKING: &str = "BLUEROAD_HEAL_STACKING";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub formula: FormulaVariant,
    pub heal_stacking: HealStacking,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            formula: FormulaVariant::default(),
            heal_stacking: HealStacking::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file (path from `BLUEROAD_CONFIG`, else
    /// `blueroad.yaml` when present), then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(ENV_CONFIG) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.checked()
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_FORMULA) {
            self.formula = FormulaVariant::parse(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_FORMULA,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_HEAL_STACKING) {
            self.heal_stacking = HealStacking::parse(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_HEAL_STACKING,
                value,
            })?;
        }
        Ok(())
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                value: self.page_size.to_string(),
            });
        }
        Ok(self)
    }

    pub fn scorer(&self) -> Scorer {
        Scorer::new(self.formula, self.heal_stacking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let config: AppConfig = serde_yaml::from_str("bind: 0.0.0.0:8080\nformula: legacy\n").unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.formula, FormulaVariant::Legacy);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn environment_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/srv/blueroad"),
            (ENV_HEAL_STACKING, "single-source"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/blueroad"));
        assert_eq!(config.scorer().heal_stacking, HealStacking::SingleSource);
    }

    #[test]
    fn bad_formula_override_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_FORMULA).then(|| "quantum".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_FORMULA, .. }));
    }
}
