//! Rigsmith Core: domain types, catalog, normalization, weighted selection.
//!
//! This crate holds everything the assemblers read but never mutate:
//! - Domain types (categories, part records, budgets, builds)
//! - The price-ordered catalog and its per-category failure record
//! - Per-(category, feature) normalization ranges
//! - Scenario weight and budget-allocation tables
//! - The weighted selector and part comparison
//! - The fixed feature vector handed to predictive scorers
//! - A deterministic RNG hierarchy for reproducible sampling

pub mod catalog;
pub mod compare;
pub mod domain;
pub mod features;
pub mod normalization;
pub mod rng;
pub mod scenario;
pub mod selector;

pub use catalog::{Catalog, MissingCategoryError};
pub use compare::{compare_parts, CompareError, PartComparison};
pub use domain::{projected_cost, Budget, Build, BuildWarning, Category, Feature, InvalidBudgetError, PartRecord};
pub use features::FeatureVector;
pub use normalization::{NormalizationRange, NormalizationRanges};
pub use rng::RngHierarchy;
pub use scenario::{FeatureWeights, Scenario, ScenarioTables};
pub use selector::{score_part, select_best};
