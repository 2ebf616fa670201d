//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! data_dir = "data"
//! model_dir = "models"
//! loader_seed = 42
//!
//! [part_files]
//! Mainboard = "Boards.csv"
//!
//! [sampling]
//! sample_count = 200
//! threads = 4
//!
//! [tables.weights.Gaming.CPU]
//! speed = 0.5
//! price = -0.5
//!
//! [tables.shares.Gaming]
//! GPU = 0.6
//! ```
//!
//! Table keys are plain strings resolved through the same case- and
//! separator-insensitive parsing the CLI uses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use rigsmith_core::domain::{UnknownCategory, UnknownFeature};
use rigsmith_core::scenario::UnknownScenario;
use rigsmith_core::{Category, Feature, FeatureWeights, Scenario, ScenarioTables};

use crate::loader::{default_part_files, LoadOptions};
use crate::sampling::SamplingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Scenario(#[from] UnknownScenario),
    #[error(transparent)]
    Category(#[from] UnknownCategory),
    #[error(transparent)]
    Feature(#[from] UnknownFeature),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Directory of `rf_<scenario>.toml` models. Without one, every scenario
    /// is scored by its built-in heuristic model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,
    /// Per-category file overrides; unlisted categories keep their default.
    pub part_files: BTreeMap<String, String>,
    pub loader_seed: u64,
    pub sampling: SamplingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<TablesOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            model_dir: None,
            part_files: BTreeMap::new(),
            loader_seed: 42,
            sampling: SamplingConfig::default(),
            tables: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.top_n == 0 && self.sampling.sample_count > 0 {
            return Err(ConfigError::Invalid("sampling.top_n must be at least 1".into()));
        }
        self.load_options()?;
        self.scenario_tables()?;
        Ok(())
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        let mut part_files = default_part_files();
        for (key, file) in &self.part_files {
            part_files.insert(Category::from_str(key)?, file.clone());
        }
        Ok(LoadOptions {
            part_files,
            synth_seed: self.loader_seed,
        })
    }

    /// Default tables with the `[tables]` overrides applied.
    pub fn scenario_tables(&self) -> Result<ScenarioTables, ConfigError> {
        let base = ScenarioTables::default();
        match &self.tables {
            Some(overrides) => overrides.apply(base),
            None => Ok(base),
        }
    }
}

/// Replacement rows for the weight and allocation tables.
///
/// A weights entry replaces the whole (scenario, category) weight set; a
/// share entry replaces a single fraction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesOverride {
    pub weights: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
    pub shares: BTreeMap<String, BTreeMap<String, f64>>,
}

impl TablesOverride {
    pub fn apply(&self, mut tables: ScenarioTables) -> Result<ScenarioTables, ConfigError> {
        for (scenario, by_category) in &self.weights {
            let scenario = Scenario::from_str(scenario)?;
            for (category, features) in by_category {
                let category = Category::from_str(category)?;
                let mut weights = FeatureWeights::new();
                for (feature, weight) in features {
                    if !weight.is_finite() {
                        return Err(ConfigError::Invalid(format!(
                            "weight {scenario}/{category}/{feature} is not finite"
                        )));
                    }
                    weights.set(Feature::from_str(feature)?, *weight);
                }
                tables.set_weights(scenario, category, weights);
            }
        }

        for (scenario, by_category) in &self.shares {
            let scenario = Scenario::from_str(scenario)?;
            for (category, share) in by_category {
                let category = Category::from_str(category)?;
                if !(0.0..=1.0).contains(share) {
                    return Err(ConfigError::Invalid(format!(
                        "share {scenario}/{category} must be within [0, 1] (got {share})"
                    )));
                }
                tables.set_share(scenario, category, *share);
            }
        }

        Ok(tables)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.sampling.sample_count, 50);
        assert_eq!(config.sampling.top_n, 3);
        assert_eq!(config.sampling.master_seed, 42);
        assert_eq!(config.sampling.threads, 1);
    }

    #[test]
    fn partial_sampling_section_keeps_other_defaults() {
        let config = EngineConfig::from_toml("[sampling]\nthreads = 4\n").unwrap();
        assert_eq!(config.sampling.threads, 4);
        assert_eq!(config.sampling.sample_count, 50);
    }

    #[test]
    fn part_file_overrides_merge_with_defaults() {
        let config = EngineConfig::from_toml("[part_files]\nmotherboard = \"Boards.csv\"\n").unwrap();
        let options = config.load_options().unwrap();
        assert_eq!(options.part_files[&Category::Mainboard], "Boards.csv");
        assert_eq!(options.part_files[&Category::Cpu], "CPU.csv");
        assert_eq!(options.part_files.len(), 8);
    }

    #[test]
    fn table_overrides_applied() {
        let toml = r#"
            [tables.weights.Gaming.CPU]
            speed = 0.5
            price = -0.5

            [tables.shares."Home Office"]
            GPU = 0.3
        "#;
        let tables = EngineConfig::from_toml(toml).unwrap().scenario_tables().unwrap();
        let cpu = tables.weights(Scenario::Gaming, Category::Cpu);
        assert_eq!(cpu.len(), 2);
        assert_eq!(cpu.get(Feature::Speed), Some(0.5));
        assert_eq!(cpu.get(Feature::CoreCount), None);
        assert_eq!(tables.share(Scenario::HomeOffice, Category::Gpu), 0.3);
        assert_eq!(tables.share(Scenario::Gaming, Category::Gpu), 0.5);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = EngineConfig::from_toml("[tables.shares.Mining]\nGPU = 0.3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Scenario(_)));

        let err = EngineConfig::from_toml("[tables.weights.Gaming.CPU]\nrgb = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Feature(_)));

        let err = EngineConfig::from_toml("[tables.shares.Gaming]\nGPU = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/rigsmith.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
