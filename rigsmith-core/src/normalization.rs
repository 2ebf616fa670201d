//! Per-(category, feature) min/max ranges used to rescale features to [0, 1].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::domain::{Category, Feature};

/// Observed span of one feature within one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    pub min: f64,
    pub max: f64,
}

impl NormalizationRange {
    /// Rescale `value` into the range. A degenerate range maps everything
    /// to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (value - self.min) / span
        } else {
            0.5
        }
    }
}

/// Range table computed once from a catalog.
#[derive(Debug, Clone, Default)]
pub struct NormalizationRanges {
    ranges: HashMap<(Category, Feature), NormalizationRange>,
}

impl NormalizationRanges {
    /// Scan every numeric feature of every category once. Features with no
    /// finite value in a category are absent from the table.
    pub fn compute(catalog: &Catalog) -> Self {
        let mut ranges = HashMap::new();
        for category in catalog.categories() {
            let parts = catalog.parts(category);
            for feature in Feature::ALL {
                let mut values = parts.iter().filter_map(|p| p.feature(feature));
                let Some(first) = values.next() else {
                    continue;
                };
                let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
                ranges.insert((category, feature), NormalizationRange { min, max });
            }
        }
        Self { ranges }
    }

    pub fn get(&self, category: Category, feature: Feature) -> Option<NormalizationRange> {
        self.ranges.get(&(category, feature)).copied()
    }

    /// Normalized value, or the raw value when no range was observed for
    /// this (category, feature).
    pub fn normalize(&self, category: Category, feature: Feature, value: f64) -> f64 {
        match self.get(category, feature) {
            Some(range) => range.normalize(value),
            None => value,
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PartRecord;

    fn gpu(name: &str, price: f64, vram: Option<f64>) -> PartRecord {
        let mut p = PartRecord::new(Category::Gpu, name, price);
        p.vram = vram;
        p
    }

    #[test]
    fn computes_min_max_per_feature() {
        let catalog = Catalog::from_parts(vec![
            gpu("a", 200.0, Some(8.0)),
            gpu("b", 500.0, Some(16.0)),
            gpu("c", 300.0, None),
        ]);
        let ranges = NormalizationRanges::compute(&catalog);
        assert_eq!(
            ranges.get(Category::Gpu, Feature::Vram),
            Some(NormalizationRange { min: 8.0, max: 16.0 })
        );
        assert_eq!(
            ranges.get(Category::Gpu, Feature::Price),
            Some(NormalizationRange { min: 200.0, max: 500.0 })
        );
        assert_eq!(ranges.normalize(Category::Gpu, Feature::Vram, 12.0), 0.5);
    }

    #[test]
    fn feature_without_values_is_absent() {
        let catalog = Catalog::from_parts(vec![gpu("a", 200.0, None)]);
        let ranges = NormalizationRanges::compute(&catalog);
        assert!(ranges.get(Category::Gpu, Feature::Vram).is_none());
        assert!(ranges.get(Category::Gpu, Feature::Power).is_none());
    }

    #[test]
    fn degenerate_range_maps_to_half() {
        let range = NormalizationRange { min: 4.0, max: 4.0 };
        assert_eq!(range.normalize(4.0), 0.5);
        assert_eq!(range.normalize(100.0), 0.5);
    }

    #[test]
    fn missing_range_passes_raw_value_through() {
        let ranges = NormalizationRanges::default();
        assert_eq!(ranges.normalize(Category::Cpu, Feature::Speed, 3.6), 3.6);
    }

    #[test]
    fn nan_values_are_ignored() {
        let catalog = Catalog::from_parts(vec![
            gpu("a", 100.0, Some(f64::NAN)),
            gpu("b", 150.0, Some(6.0)),
        ]);
        let ranges = NormalizationRanges::compute(&catalog);
        assert_eq!(
            ranges.get(Category::Gpu, Feature::Vram),
            Some(NormalizationRange { min: 6.0, max: 6.0 })
        );
    }
}
