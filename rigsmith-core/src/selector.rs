//! Weighted selector: pick the single best candidate by weighted,
//! normalized feature score.

use crate::domain::{Category, PartRecord};
use crate::normalization::NormalizationRanges;
use crate::scenario::FeatureWeights;

/// Weighted score of one part, or `None` when no weighted feature is present
/// on it.
///
/// Each weighted feature contributes `weight * normalize(value)`; a feature
/// that is missing or non-finite on the part contributes nothing.
pub fn score_part(
    part: &PartRecord,
    weights: &FeatureWeights,
    ranges: &NormalizationRanges,
    category: Category,
) -> Option<f64> {
    let mut total = 0.0;
    let mut scored = false;
    for (feature, weight) in weights.iter() {
        if let Some(value) = part.feature(feature) {
            total += weight * ranges.normalize(category, feature, value);
            scored = true;
        }
    }
    scored.then_some(total)
}

/// Return the top-scoring candidate.
///
/// Ties keep the first candidate in input order. When not a single weighted
/// feature could be scored on any candidate, the cheapest candidate (first
/// on price ties) is returned instead. `None` only for an empty input.
pub fn select_best<'a, I>(
    candidates: I,
    weights: &FeatureWeights,
    ranges: &NormalizationRanges,
    category: Category,
) -> Option<&'a PartRecord>
where
    I: IntoIterator<Item = &'a PartRecord>,
{
    let mut best: Option<(&PartRecord, f64)> = None;
    let mut cheapest: Option<&PartRecord> = None;
    let mut any_scored = false;

    for candidate in candidates {
        if cheapest.map_or(true, |c| candidate.price < c.price) {
            cheapest = Some(candidate);
        }

        let score = match score_part(candidate, weights, ranges, category) {
            Some(s) => {
                any_scored = true;
                s
            }
            None => 0.0,
        };
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    if any_scored {
        best.map(|(part, _)| part)
    } else {
        cheapest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::Feature;

    fn cpu(name: &str, price: f64, speed: Option<f64>) -> PartRecord {
        let mut p = PartRecord::new(Category::Cpu, name, price);
        p.speed = speed;
        p
    }

    fn setup(parts: Vec<PartRecord>) -> (Catalog, NormalizationRanges) {
        let catalog = Catalog::from_parts(parts);
        let ranges = NormalizationRanges::compute(&catalog);
        (catalog, ranges)
    }

    #[test]
    fn picks_highest_weighted_score() {
        let (catalog, ranges) = setup(vec![
            cpu("slow", 100.0, Some(3.0)),
            cpu("fast", 200.0, Some(5.0)),
        ]);
        let weights = FeatureWeights::new().with(Feature::Speed, 1.0);
        let best = select_best(catalog.parts(Category::Cpu), &weights, &ranges, Category::Cpu);
        assert_eq!(best.unwrap().name, "fast");
    }

    #[test]
    fn negative_price_weight_prefers_cheaper() {
        let (catalog, ranges) = setup(vec![
            cpu("cheap", 100.0, Some(4.0)),
            cpu("pricey", 400.0, Some(4.0)),
        ]);
        let weights = FeatureWeights::new()
            .with(Feature::Speed, 0.3)
            .with(Feature::Price, -0.7);
        let best = select_best(catalog.parts(Category::Cpu), &weights, &ranges, Category::Cpu);
        assert_eq!(best.unwrap().name, "cheap");
    }

    #[test]
    fn ties_keep_first_candidate() {
        let (catalog, ranges) = setup(vec![
            cpu("first", 100.0, Some(4.0)),
            cpu("second", 150.0, Some(4.0)),
        ]);
        let weights = FeatureWeights::new().with(Feature::Speed, 1.0);
        let best = select_best(catalog.parts(Category::Cpu), &weights, &ranges, Category::Cpu);
        assert_eq!(best.unwrap().name, "first");
    }

    #[test]
    fn empty_weights_fall_back_to_cheapest() {
        let parts = vec![cpu("b", 300.0, None), cpu("a", 100.0, None)];
        let ranges = NormalizationRanges::default();
        // Deliberately unsorted input.
        let best = select_best(&parts, &FeatureWeights::new(), &ranges, Category::Cpu);
        assert_eq!(best.unwrap().name, "a");
    }

    #[test]
    fn unmatched_features_fall_back_to_cheapest() {
        let parts = vec![cpu("b", 300.0, None), cpu("a", 100.0, None)];
        let ranges = NormalizationRanges::default();
        let weights = FeatureWeights::new().with(Feature::Vram, 1.0);
        let best = select_best(&parts, &weights, &ranges, Category::Cpu);
        assert_eq!(best.unwrap().name, "a");
    }

    #[test]
    fn missing_feature_contributes_nothing() {
        let (catalog, ranges) = setup(vec![
            cpu("unknown", 100.0, None),
            cpu("known", 100.0, Some(3.0)),
        ]);
        let weights = FeatureWeights::new().with(Feature::Speed, 1.0);
        // Single speed value gives a degenerate range -> 0.5 * 1.0 beats 0.0.
        let best = select_best(catalog.parts(Category::Cpu), &weights, &ranges, Category::Cpu);
        assert_eq!(best.unwrap().name, "known");
        assert_eq!(
            score_part(&catalog.parts(Category::Cpu)[0], &weights, &ranges, Category::Cpu),
            None
        );
    }

    #[test]
    fn empty_candidates_yield_none() {
        let ranges = NormalizationRanges::default();
        let none: Vec<PartRecord> = Vec::new();
        assert!(select_best(&none, &FeatureWeights::new(), &ranges, Category::Cpu).is_none());
    }

    #[test]
    fn selection_is_idempotent() {
        let (catalog, ranges) = setup(vec![
            cpu("a", 120.0, Some(3.2)),
            cpu("b", 180.0, Some(4.1)),
            cpu("c", 260.0, Some(4.8)),
        ]);
        let weights = FeatureWeights::new()
            .with(Feature::Speed, 0.6)
            .with(Feature::Price, -0.4);
        let first = select_best(catalog.parts(Category::Cpu), &weights, &ranges, Category::Cpu);
        let second = select_best(catalog.parts(Category::Cpu), &weights, &ranges, Category::Cpu);
        assert_eq!(first, second);
    }
}
