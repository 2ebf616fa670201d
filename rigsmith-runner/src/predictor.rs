//! Predictive scoring service boundary.
//!
//! One scorer per scenario maps the fixed [`FeatureVector`] of a complete
//! build to a single performance score. The engine only relies on the
//! [`PredictiveScorer`] trait; [`LinearScorer`] is the reference model,
//! stored on disk as `rf_<scenario_slug>.toml`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use rigsmith_core::features::FEATURE_NAMES;
use rigsmith_core::{FeatureVector, Scenario};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("no predictive model loaded for scenario {0}")]
    NoModel(Scenario),
    #[error("scorer returned a non-finite value ({0})")]
    NonFinite(f64),
    #[error("scorer failed: {0}")]
    Failed(String),
    #[error("scorer panicked: {0}")]
    Panicked(String),
}

/// A trained (or hand-written) model for one scenario.
pub trait PredictiveScorer: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError>;
}

impl<F> PredictiveScorer for F
where
    F: Fn(&FeatureVector) -> Result<f64, PredictionError> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        self(features)
    }
}

// ─── Linear reference model ──────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid model file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown feature '{0}' in model coefficients")]
    UnknownFeature(String),
    #[error("coefficient for '{0}' is not finite")]
    NonFiniteCoefficient(String),
}

/// `score = intercept + Σ coefficient[name] * features[name]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearScorer {
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearScorer {
    /// The linear weights the training data for each scenario was
    /// generated with.
    pub fn heuristic(scenario: Scenario) -> Self {
        let pairs: &[(&str, f64)] = match scenario {
            Scenario::Gaming => &[
                ("cpu_speed", 15.0),
                ("cpu_cores", 10.0),
                ("gpu_vram", 20.0),
                ("ram_size", 5.0),
                ("storage_space", 2.0),
            ],
            Scenario::Workstation => &[
                ("cpu_cores", 15.0),
                ("ram_size", 20.0),
                ("storage_space", 10.0),
                ("psu_power", 5.0),
            ],
            Scenario::ContentCreation => &[
                ("cpu_cores", 12.0),
                ("ram_size", 20.0),
                ("storage_space", 10.0),
                ("gpu_vram", 8.0),
            ],
            Scenario::HomeOffice => &[("cpu_speed", 10.0), ("ram_size", 10.0), ("storage_space", 5.0)],
            Scenario::GeneralUse => &[("cpu_speed", 8.0), ("ram_size", 8.0), ("storage_space", 5.0)],
        };
        Self {
            intercept: 0.0,
            coefficients: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ModelError> {
        let model: Self = toml::from_str(s)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// File name looked up for `scenario` in a model directory.
    pub fn file_name(scenario: Scenario) -> String {
        format!("rf_{}.toml", scenario.slug())
    }

    fn validate(&self) -> Result<(), ModelError> {
        for (name, value) in &self.coefficients {
            if !FEATURE_NAMES.contains(&name.as_str()) {
                return Err(ModelError::UnknownFeature(name.clone()));
            }
            if !value.is_finite() {
                return Err(ModelError::NonFiniteCoefficient(name.clone()));
            }
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFiniteCoefficient("intercept".into()));
        }
        Ok(())
    }
}

impl PredictiveScorer for LinearScorer {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let score = self
            .coefficients
            .iter()
            .map(|(name, c)| c * features.get(name).unwrap_or(0.0))
            .sum::<f64>()
            + self.intercept;
        if score.is_finite() {
            Ok(score)
        } else {
            Err(PredictionError::NonFinite(score))
        }
    }
}

// ─── Registry ────────────────────────────────────────────────────────

/// One scorer per scenario. Scenarios without a scorer stay unscored.
#[derive(Clone, Default)]
pub struct ScorerRegistry {
    scorers: HashMap<Scenario, Arc<dyn PredictiveScorer>>,
}

impl std::fmt::Debug for ScorerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut loaded: Vec<_> = self.scorers.keys().collect();
        loaded.sort();
        f.debug_struct("ScorerRegistry").field("loaded", &loaded).finish()
    }
}

impl ScorerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every scenario scored by its [`LinearScorer::heuristic`].
    pub fn with_heuristics() -> Self {
        let mut registry = Self::new();
        for scenario in Scenario::ALL {
            registry.insert(scenario, LinearScorer::heuristic(scenario));
        }
        registry
    }

    /// Load `rf_<slug>.toml` for every scenario found in `dir`.
    ///
    /// A missing file leaves that scenario unscored. A file that exists but
    /// does not parse is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, ModelError> {
        let mut registry = Self::new();
        for scenario in Scenario::ALL {
            let path = dir.join(LinearScorer::file_name(scenario));
            if !path.is_file() {
                tracing::warn!(%scenario, path = %path.display(), "no model file; scenario unscored");
                continue;
            }
            let model = LinearScorer::load(&path)?;
            tracing::debug!(%scenario, coefficients = model.coefficients.len(), "model loaded");
            registry.insert(scenario, model);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, scenario: Scenario, scorer: impl PredictiveScorer + 'static) {
        self.scorers.insert(scenario, Arc::new(scorer));
    }

    pub fn insert_shared(&mut self, scenario: Scenario, scorer: Arc<dyn PredictiveScorer>) {
        self.scorers.insert(scenario, scorer);
    }

    pub fn get(&self, scenario: Scenario) -> Option<&Arc<dyn PredictiveScorer>> {
        self.scorers.get(&scenario)
    }

    pub fn contains(&self, scenario: Scenario) -> bool {
        self.scorers.contains_key(&scenario)
    }

    pub fn predict(&self, scenario: Scenario, features: &FeatureVector) -> Result<f64, PredictionError> {
        self.get(scenario)
            .ok_or(PredictionError::NoModel(scenario))?
            .predict(features)
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
