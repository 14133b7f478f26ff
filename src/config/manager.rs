use super::{
    evolution::EvolutionConfig,
    simulation::SimulationConfig,
    traits::{ConfigManifest, ConfigSection},
};
use crate::error::StridegenError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variables such as `STRIDEGEN_EVOLUTION__MUTATION_RATE=0.2`
/// override file values.
pub const ENV_PREFIX: &str = "STRIDEGEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), StridegenError> {
        self.evolution.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    pub fn manifests(&self) -> Vec<ConfigManifest> {
        vec![self.evolution.to_manifest(), self.simulation.to_manifest()]
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Layer a TOML/JSON file under environment overrides and validate the result.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StridegenError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StridegenError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(Self::environment())
            .build()?;

        self.install(settings.try_deserialize()?)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn load_from_env(&self) -> Result<(), StridegenError> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        self.install(settings.try_deserialize()?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StridegenError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| StridegenError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Apply `f` to a copy and keep it only if it validates.
    pub fn update<F>(&self, f: F) -> Result<(), StridegenError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        self.install(candidate)
    }

    fn install(&self, config: AppConfig) -> Result<(), StridegenError> {
        config.validate()?;
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
        Ok(())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}
