//! Engine facade: one catalog, its normalization ranges, the scenario
//! tables and the scorer registry, read-only after construction.

use thiserror::Error;

use rigsmith_core::{
    compare_parts, Build, Catalog, Category, FeatureVector, NormalizationRanges, PartComparison,
    Scenario, ScenarioTables,
};

use crate::config::{ConfigError, EngineConfig};
use crate::error::AssemblyError;
use crate::loader::{load_catalog, LoadError};
use crate::predictor::{ModelError, ScorerRegistry};
use crate::sampling::{run_sampling, SamplingConfig, SamplingReport};
use crate::{smart, tiered};

/// Suffix appended to the label of a customized build.
const CUSTOM_SUFFIX: &str = " (custom)";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    ranges: NormalizationRanges,
    tables: ScenarioTables,
    scorers: ScorerRegistry,
    sampling: SamplingConfig,
}

impl Engine {
    /// Normalization ranges are derived from `catalog` here, once.
    pub fn new(catalog: Catalog, tables: ScenarioTables, scorers: ScorerRegistry) -> Self {
        let ranges = NormalizationRanges::compute(&catalog);
        Self {
            catalog,
            ranges,
            tables,
            scorers,
            sampling: SamplingConfig::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Load the catalog, tables and models a config points at.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let catalog = load_catalog(&config.data_dir, &config.load_options()?)?;
        let tables = config.scenario_tables()?;
        let scorers = match &config.model_dir {
            Some(dir) => ScorerRegistry::load_dir(dir)?,
            None => ScorerRegistry::with_heuristics(),
        };
        tracing::info!(
            records = catalog.len(),
            unavailable = catalog.missing().len(),
            models = scorers.len(),
            "engine ready"
        );
        Ok(Self::new(catalog, tables, scorers).with_sampling(config.sampling.clone()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ranges(&self) -> &NormalizationRanges {
        &self.ranges
    }

    pub fn tables(&self) -> &ScenarioTables {
        &self.tables
    }

    pub fn scorers(&self) -> &ScorerRegistry {
        &self.scorers
    }

    pub fn sampling_config(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn scenarios(&self) -> &'static [Scenario] {
        &Scenario::ALL
    }

    pub fn assemble_tiers(&self, budget: f64) -> Result<Vec<Build>, AssemblyError> {
        tiered::assemble_tiers(&self.catalog, budget)
    }

    pub fn assemble_smart(&self, scenario: Scenario, budget: f64) -> Result<Build, AssemblyError> {
        smart::assemble_smart(&self.catalog, &self.ranges, &self.tables, scenario, budget)
    }

    /// Sampling with the engine's configured defaults.
    pub fn assemble_by_sampling(&self, scenario: Scenario, budget: f64) -> Result<Vec<Build>, AssemblyError> {
        self.sample(scenario, budget, &self.sampling).map(|report| report.builds)
    }

    /// Sampling with explicit settings, returning the full report.
    pub fn sample(
        &self,
        scenario: Scenario,
        budget: f64,
        config: &SamplingConfig,
    ) -> Result<SamplingReport, AssemblyError> {
        let scorer = self.scorers.get(scenario).ok_or(AssemblyError::NoModel(scenario))?;
        run_sampling(&self.catalog, &**scorer, scenario, budget, config)
    }

    /// Predicted score of any build holding every core category, clamped to
    /// be non-negative.
    pub fn score_build(&self, scenario: Scenario, build: &Build) -> Result<f64, AssemblyError> {
        let missing = build.missing(&Category::CORE);
        if !missing.is_empty() {
            return Err(AssemblyError::IncompleteBuild { missing });
        }
        let score = self.scorers.predict(scenario, &FeatureVector::from_build(build))?;
        Ok(score.max(0.0))
    }

    /// Copy of `build` with the `category` part swapped for the catalog
    /// record named `part_name`.
    pub fn customize(&self, build: &Build, category: Category, part_name: &str) -> Result<Build, AssemblyError> {
        let part = self
            .catalog
            .find(category, part_name)
            .ok_or_else(|| AssemblyError::UnknownPart {
                category,
                name: part_name.to_string(),
            })?;

        let mut custom = build.clone();
        custom.replace_part(part.clone());
        if !custom.label.ends_with(CUSTOM_SUFFIX) {
            custom.label.push_str(CUSTOM_SUFFIX);
        }
        tracing::debug!(%category, part = part_name, cost = custom.cost, "build customized");
        Ok(custom)
    }

    /// Side-by-side comparison of two catalog records of one category.
    pub fn compare_parts(&self, category: Category, left: &str, right: &str) -> Result<PartComparison, AssemblyError> {
        let find = |name: &str| {
            self.catalog
                .find(category, name)
                .ok_or_else(|| AssemblyError::UnknownPart {
                    category,
                    name: name.to_string(),
                })
        };
        Ok(compare_parts(find(left)?, find(right)?, &self.ranges)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigsmith_core::{Feature, PartRecord};

    fn engine() -> Engine {
        let mut parts = vec![
            PartRecord::new(Category::Cpu, "cpu-a", 150.0)
                .with_socket("AM5")
                .with_feature(Feature::Speed, 4.0)
                .with_feature(Feature::CoreCount, 8.0),
            PartRecord::new(Category::Mainboard, "board-a", 100.0).with_socket("AM5"),
            PartRecord::new(Category::Memory, "ram-16", 50.0).with_feature(Feature::Size, 16.0),
            PartRecord::new(Category::Memory, "ram-32", 90.0).with_feature(Feature::Size, 32.0),
        ];
        for category in [
            Category::Gpu,
            Category::Storage,
            Category::PowerSupply,
            Category::Case,
            Category::Cooler,
        ] {
            parts.push(PartRecord::new(category, format!("{category}-a"), 40.0));
        }
        Engine::new(
            Catalog::from_parts(parts),
            ScenarioTables::default(),
            ScorerRegistry::with_heuristics(),
        )
    }

    #[test]
    fn customize_swaps_and_relabels() {
        let engine = engine();
        let build = engine.assemble_smart(Scenario::GeneralUse, 2000.0).unwrap();
        let scored = build.clone().with_score(12.0);

        let target = if build.part(Category::Memory).unwrap().name == "ram-16" {
            "ram-32"
        } else {
            "ram-16"
        };
        let custom = engine.customize(&scored, Category::Memory, target).unwrap();
        assert_eq!(custom.part(Category::Memory).unwrap().name, target);
        assert_eq!(custom.score, None);
        assert!(custom.label.ends_with(" (custom)"));
        assert_eq!(custom.remaining, custom.budget - custom.cost);

        let again = engine.customize(&custom, Category::Memory, target).unwrap();
        assert!(!again.label.ends_with(" (custom) (custom)"));
    }

    #[test]
    fn customize_unknown_part_fails() {
        let engine = engine();
        let build = engine.assemble_smart(Scenario::Gaming, 2000.0).unwrap();
        let err = engine.customize(&build, Category::Gpu, "nope").unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownPart { category: Category::Gpu, .. }));
    }

    #[test]
    fn score_build_uses_scenario_model() {
        let engine = engine();
        let build = engine.assemble_smart(Scenario::HomeOffice, 2000.0).unwrap();
        let score = engine.score_build(Scenario::HomeOffice, &build).unwrap();
        let ram = build.part(Category::Memory).unwrap().size.unwrap();
        // 10 * speed + 10 * ram + 5 * storage (storage has no space)
        assert_eq!(score, 10.0 * 4.0 + 10.0 * ram);
    }

    #[test]
    fn sampling_without_model_is_no_model() {
        let engine = Engine::new(engine().catalog.clone(), ScenarioTables::default(), ScorerRegistry::new());
        let err = engine.assemble_by_sampling(Scenario::Gaming, 1000.0).unwrap_err();
        assert!(matches!(err, AssemblyError::NoModel(Scenario::Gaming)));
    }

    #[test]
    fn compare_named_parts() {
        let engine = engine();
        let cmp = engine.compare_parts(Category::Memory, "ram-16", "ram-32").unwrap();
        assert_eq!(cmp.right_strengths.first(), Some(&Feature::Size));
        assert!(engine.compare_parts(Category::Memory, "ram-16", "ram-64").is_err());
    }
}
