//! Errors surfaced by the assemblers to their callers.
//!
//! Everything narrower (a trial that found no compatible mainboard, a
//! scorer that failed for one sample, an optional category that is empty)
//! is absorbed inside the assembler and never reaches this type.

use thiserror::Error;

use rigsmith_core::{Catalog, Category, CompareError, InvalidBudgetError, MissingCategoryError, Scenario};

use crate::predictor::PredictionError;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    InvalidBudget(#[from] InvalidBudgetError),

    #[error("category {category} has no usable records ({reason})")]
    MissingCategory {
        category: Category,
        reason: MissingCategoryError,
    },

    #[error("no mainboard shares the socket of processor '{processor}' ({})", .socket.as_deref().unwrap_or("no socket"))]
    Incompatible {
        processor: String,
        socket: Option<String>,
    },

    #[error("build is missing required categories: {missing:?}")]
    IncompleteBuild { missing: Vec<Category> },

    #[error("no predictive model loaded for scenario {0}")]
    NoModel(Scenario),

    #[error("scoring failed: {0}")]
    Prediction(PredictionError),

    #[error("no {category} named '{name}' in the catalog")]
    UnknownPart { category: Category, name: String },

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error("failed to build sampling thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<PredictionError> for AssemblyError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::NoModel(scenario) => Self::NoModel(scenario),
            other => Self::Prediction(other),
        }
    }
}

/// Fail with `MissingCategory` for the first category in `required` that the
/// catalog cannot supply.
pub(crate) fn require_categories(catalog: &Catalog, required: &[Category]) -> Result<(), AssemblyError> {
    for &category in required {
        if let Err(reason) = catalog.require(category) {
            tracing::warn!(%category, %reason, "required category unavailable");
            return Err(AssemblyError::MissingCategory { category, reason });
        }
    }
    Ok(())
}
