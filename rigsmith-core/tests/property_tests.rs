//! Property tests for catalog and selector invariants.
//!
//! Uses proptest to verify:
//! 1. Catalog ordering: records are price-ascending after any insert
//! 2. Normalization bounds: every catalog value maps into [0, 1]
//! 3. Selector membership: the chosen record is one of the candidates
//! 4. Selector idempotence: same input, same choice

use proptest::prelude::*;
use rigsmith_core::{
    select_best, Catalog, Category, Feature, FeatureWeights, NormalizationRanges, PartRecord,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (0.0..5000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_gpu() -> impl Strategy<Value = (f64, Option<f64>, Option<f64>)> {
    (
        arb_price(),
        proptest::option::of(1.0..48.0_f64),
        proptest::option::of(50.0..600.0_f64),
    )
}

fn arb_gpus() -> impl Strategy<Value = Vec<PartRecord>> {
    proptest::collection::vec(arb_gpu(), 1..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (price, vram, power))| {
                let mut p = PartRecord::new(Category::Gpu, format!("gpu-{i}"), price);
                p.vram = vram;
                p.power = power;
                p
            })
            .collect()
    })
}

fn arb_weights() -> impl Strategy<Value = FeatureWeights> {
    (-1.0..1.0_f64, -1.0..1.0_f64, -1.0..0.0_f64).prop_map(|(v, w, p)| {
        FeatureWeights::new()
            .with(Feature::Vram, v)
            .with(Feature::Power, w)
            .with(Feature::Price, p)
    })
}

proptest! {
    #[test]
    fn catalog_is_price_ascending(parts in arb_gpus()) {
        let catalog = Catalog::from_parts(parts);
        let prices: Vec<f64> = catalog.parts(Category::Gpu).iter().map(|p| p.price).collect();
        prop_assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn normalized_catalog_values_are_in_unit_interval(parts in arb_gpus()) {
        let catalog = Catalog::from_parts(parts);
        let ranges = NormalizationRanges::compute(&catalog);
        for part in catalog.parts(Category::Gpu) {
            for feature in [Feature::Price, Feature::Vram, Feature::Power] {
                if let Some(v) = part.feature(feature) {
                    let n = ranges.normalize(Category::Gpu, feature, v);
                    prop_assert!((0.0..=1.0).contains(&n), "{feature} normalized to {n}");
                }
            }
        }
    }

    #[test]
    fn selector_returns_a_candidate(parts in arb_gpus(), weights in arb_weights()) {
        let catalog = Catalog::from_parts(parts);
        let ranges = NormalizationRanges::compute(&catalog);
        let candidates = catalog.parts(Category::Gpu);
        let chosen = select_best(candidates, &weights, &ranges, Category::Gpu);
        let chosen = chosen.expect("non-empty candidates always yield a choice");
        prop_assert!(candidates.iter().any(|c| c.name == chosen.name));
    }

    #[test]
    fn selector_is_idempotent(parts in arb_gpus(), weights in arb_weights()) {
        let catalog = Catalog::from_parts(parts);
        let ranges = NormalizationRanges::compute(&catalog);
        let first = select_best(catalog.parts(Category::Gpu), &weights, &ranges, Category::Gpu);
        let second = select_best(catalog.parts(Category::Gpu), &weights, &ranges, Category::Gpu);
        prop_assert_eq!(first.map(|p| p.name.clone()), second.map(|p| p.name.clone()));
    }
}
