//! Side-by-side comparison of two parts from the same category.
//!
//! Values are normalized with the catalog ranges and reported on a 0–10
//! scale. A feature counts as a strength of one part when it leads the other
//! by more than [`STRENGTH_MARGIN`] on that scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Category, Feature, PartRecord};
use crate::normalization::NormalizationRanges;

pub const STRENGTH_MARGIN: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("cannot compare a {left} with a {right}")]
    CategoryMismatch { left: Category, right: Category },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureComparison {
    pub feature: Feature,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartComparison {
    pub category: Category,
    pub left: String,
    pub right: String,
    pub features: Vec<FeatureComparison>,
    pub left_strengths: Vec<Feature>,
    pub right_strengths: Vec<Feature>,
}

impl PartComparison {
    /// Neither part leads on any feature.
    pub fn is_close(&self) -> bool {
        self.left_strengths.is_empty() && self.right_strengths.is_empty()
    }
}

/// Compare the chartable features of two parts.
///
/// Features missing on either part, or without a catalog range, are skipped.
pub fn compare_parts(
    left: &PartRecord,
    right: &PartRecord,
    ranges: &NormalizationRanges,
) -> Result<PartComparison, CompareError> {
    if left.category != right.category {
        return Err(CompareError::CategoryMismatch {
            left: left.category,
            right: right.category,
        });
    }
    let category = left.category;

    let mut features = Vec::new();
    let mut left_strengths = Vec::new();
    let mut right_strengths = Vec::new();

    for &feature in Feature::chartable(category) {
        let (Some(a), Some(b)) = (left.feature(feature), right.feature(feature)) else {
            continue;
        };
        let Some(range) = ranges.get(category, feature) else {
            continue;
        };
        let a = range.normalize(a) * 10.0;
        let b = range.normalize(b) * 10.0;
        if a > b + STRENGTH_MARGIN {
            left_strengths.push(feature);
        } else if b > a + STRENGTH_MARGIN {
            right_strengths.push(feature);
        }
        features.push(FeatureComparison { feature, left: a, right: b });
    }

    Ok(PartComparison {
        category,
        left: left.name.clone(),
        right: right.name.clone(),
        features,
        left_strengths,
        right_strengths,
    })
}
