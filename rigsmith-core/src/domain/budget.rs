//! Budget: validated spending limit for one assembly call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("budget must be a positive, finite amount (got {0})")]
pub struct InvalidBudgetError(pub f64);

/// A strictly positive, finite amount of money.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Budget(f64);

impl Budget {
    pub fn new(amount: f64) -> Result<Self, InvalidBudgetError> {
        if amount.is_finite() && amount > 0.0 {
            Ok(Self(amount))
        } else {
            Err(InvalidBudgetError(amount))
        }
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    /// `fraction` of this budget.
    pub fn share(&self, fraction: f64) -> f64 {
        self.0 * fraction
    }
}

impl TryFrom<f64> for Budget {
    type Error = InvalidBudgetError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Budget> for f64 {
    fn from(budget: Budget) -> Self {
        budget.0
    }
}
