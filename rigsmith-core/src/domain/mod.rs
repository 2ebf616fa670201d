//! Domain types for Rigsmith

pub mod budget;
pub mod build;
pub mod category;
pub mod part;

pub use budget::{Budget, InvalidBudgetError};
pub use build::{projected_cost, Build, BuildWarning};
pub use category::{Category, UnknownCategory};
pub use part::{normalize_key, Feature, PartRecord, UnknownFeature};
