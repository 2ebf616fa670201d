//! Usage scenarios and the static tables keyed by them.
//!
//! `ScenarioTables` holds two read-only tables:
//! - feature weights per (scenario, category), signed; negative means lower
//!   is better
//! - budget allocation shares per (scenario, category), each a fraction of
//!   the budget *remaining* when that category is picked

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{normalize_key, Category, Feature};

/// Share used for a category a scenario's allocation table does not list.
pub const DEFAULT_ALLOCATION_SHARE: f64 = 0.1;

/// Named usage profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Gaming,
    Workstation,
    #[serde(rename = "Content Creation")]
    ContentCreation,
    #[serde(rename = "Home Office")]
    HomeOffice,
    #[serde(rename = "General Use")]
    GeneralUse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario '{0}' (expected one of: Gaming, Workstation, Content Creation, Home Office, General Use)")]
pub struct UnknownScenario(pub String);

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Gaming,
        Scenario::Workstation,
        Scenario::ContentCreation,
        Scenario::HomeOffice,
        Scenario::GeneralUse,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gaming => "Gaming",
            Self::Workstation => "Workstation",
            Self::ContentCreation => "Content Creation",
            Self::HomeOffice => "Home Office",
            Self::GeneralUse => "General Use",
        }
    }

    /// `content_creation`-style identifier, used for file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Gaming => "gaming",
            Self::Workstation => "workstation",
            Self::ContentCreation => "content_creation",
            Self::HomeOffice => "home_office",
            Self::GeneralUse => "general_use",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Scenario::ALL
            .into_iter()
            .find(|sc| normalize_key(sc.display_name()) == key)
            .ok_or_else(|| UnknownScenario(s.to_string()))
    }
}

/// Signed weight per feature for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights(BTreeMap<Feature, f64>);

impl FeatureWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: Feature, weight: f64) -> Self {
        self.0.insert(feature, weight);
        self
    }

    pub fn set(&mut self, feature: Feature, weight: f64) {
        self.0.insert(feature, weight);
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.0.get(&feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(f, w)| (*f, *w))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(Feature, f64)> for FeatureWeights {
    fn from_iter<T: IntoIterator<Item = (Feature, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Both static tables, one entry per scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTables {
    weights: HashMap<Scenario, BTreeMap<Category, FeatureWeights>>,
    shares: HashMap<Scenario, BTreeMap<Category, f64>>,
}

impl Default for ScenarioTables {
    fn default() -> Self {
        let weights = Scenario::ALL
            .into_iter()
            .map(|s| (s, default_weights(s)))
            .collect();
        let shares = Scenario::ALL
            .into_iter()
            .map(|s| (s, default_shares(s)))
            .collect();
        Self { weights, shares }
    }
}

impl ScenarioTables {
    /// Weights for one category. An unlisted category has no weights, which
    /// makes the selector fall back to the cheapest candidate.
    pub fn weights(&self, scenario: Scenario, category: Category) -> &FeatureWeights {
        static EMPTY: FeatureWeights = FeatureWeights(BTreeMap::new());
        self.weights
            .get(&scenario)
            .and_then(|by_cat| by_cat.get(&category))
            .unwrap_or(&EMPTY)
    }

    /// Fraction of the remaining budget to spend on `category`.
    pub fn share(&self, scenario: Scenario, category: Category) -> f64 {
        self.shares
            .get(&scenario)
            .and_then(|by_cat| by_cat.get(&category))
            .copied()
            .unwrap_or(DEFAULT_ALLOCATION_SHARE)
    }

    /// Replace the weights for one (scenario, category).
    pub fn set_weights(&mut self, scenario: Scenario, category: Category, weights: FeatureWeights) {
        self.weights.entry(scenario).or_default().insert(category, weights);
    }

    pub fn set_share(&mut self, scenario: Scenario, category: Category, share: f64) {
        self.shares.entry(scenario).or_default().insert(category, share);
    }
}

fn price_only() -> FeatureWeights {
    FeatureWeights::new().with(Feature::Price, -1.0)
}

fn default_weights(scenario: Scenario) -> BTreeMap<Category, FeatureWeights> {
    use Feature::*;

    let (cpu, gpu, memory, storage, psu) = match scenario {
        Scenario::Gaming => (
            FeatureWeights::from_iter([(Speed, 0.3), (CoreCount, 0.2), (Power, 0.1), (Price, -0.4)]),
            FeatureWeights::from_iter([(Vram, 0.4), (Power, 0.2), (Price, -0.4)]),
            FeatureWeights::from_iter([(Size, 0.3), (Price, -0.7)]),
            FeatureWeights::from_iter([(Space, 0.1), (Price, -0.9)]),
            FeatureWeights::from_iter([(Power, 0.3), (Price, -0.7)]),
        ),
        Scenario::Workstation => (
            FeatureWeights::from_iter([
                (CoreCount, 0.4),
                (ThreadCount, 0.3),
                (Speed, 0.2),
                (Power, 0.1),
                (Price, -0.5),
            ]),
            FeatureWeights::from_iter([(Vram, 0.2), (Price, -0.8)]),
            FeatureWeights::from_iter([(Size, 0.6), (Price, -0.4)]),
            FeatureWeights::from_iter([(Space, 0.5), (Price, -0.5)]),
            FeatureWeights::from_iter([(Power, 0.2), (Price, -0.8)]),
        ),
        Scenario::ContentCreation => (
            FeatureWeights::from_iter([
                (CoreCount, 0.35),
                (ThreadCount, 0.35),
                (Speed, 0.1),
                (Price, -0.4),
            ]),
            FeatureWeights::from_iter([(Vram, 0.3), (Price, -0.7)]),
            FeatureWeights::from_iter([(Size, 0.5), (Price, -0.5)]),
            FeatureWeights::from_iter([(Space, 0.4), (Price, -0.6)]),
            FeatureWeights::from_iter([(Power, 0.2), (Price, -0.8)]),
        ),
        Scenario::HomeOffice | Scenario::GeneralUse => (
            FeatureWeights::from_iter([(Speed, 0.2), (CoreCount, 0.1), (Price, -0.7)]),
            price_only(),
            FeatureWeights::from_iter([(Size, 0.3), (Price, -0.7)]),
            FeatureWeights::from_iter([(Space, 0.2), (Price, -0.8)]),
            FeatureWeights::from_iter([(Power, 0.1), (Price, -0.9)]),
        ),
    };

    BTreeMap::from([
        (Category::Cpu, cpu),
        (Category::Gpu, gpu),
        (Category::Memory, memory),
        (Category::Storage, storage),
        (Category::PowerSupply, psu),
        (Category::Mainboard, price_only()),
        (Category::Case, price_only()),
        (Category::Cooler, price_only()),
    ])
}

fn default_shares(scenario: Scenario) -> BTreeMap<Category, f64> {
    // GPU, Memory, Storage, PowerSupply, Case, Cooler
    let row: [f64; 6] = match scenario {
        Scenario::Gaming => [0.5, 0.2, 0.15, 0.1, 0.05, 0.0],
        Scenario::Workstation => [0.15, 0.3, 0.3, 0.15, 0.05, 0.05],
        Scenario::ContentCreation => [0.25, 0.25, 0.25, 0.15, 0.05, 0.05],
        Scenario::HomeOffice => [0.05, 0.2, 0.2, 0.1, 0.1, 0.05],
        Scenario::GeneralUse => [0.1, 0.25, 0.25, 0.15, 0.1, 0.05],
    };
    Category::SECONDARY.into_iter().zip(row).collect()
}
