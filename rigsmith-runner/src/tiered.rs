//! Tiered rule assembler: three naive baseline builds.
//!
//! Each tier walks the categories in catalog-declaration order against the
//! money not yet spent and picks by position in the affordable,
//! price-sorted list. No feature scoring, no compatibility checks. A tier
//! that runs out of money for any category produces no build at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use rigsmith_core::{Budget, Build, Catalog, Category, PartRecord};

use crate::error::{require_categories, AssemblyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Budget,
    Balanced,
    Performance,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Budget, Tier::Balanced, Tier::Performance];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Budget => "Budget",
            Self::Balanced => "Balanced",
            Self::Performance => "Performance",
        }
    }

    /// Pick from a non-empty, price-ascending slice of affordable records.
    ///
    /// Balanced takes the positional middle (`len / 2`), not a scored one.
    fn pick<'a>(&self, affordable: &'a [PartRecord]) -> Option<&'a PartRecord> {
        match self {
            Self::Budget => affordable.first(),
            Self::Balanced if affordable.len() > 1 => affordable.get(affordable.len() / 2),
            Self::Balanced => affordable.first(),
            Self::Performance => affordable.last(),
        }
    }
}

/// Assemble one build per tier, in tier order. Tiers that cannot be
/// completed are omitted, so the result holds zero to three builds.
pub fn assemble_tiers(catalog: &Catalog, budget: f64) -> Result<Vec<Build>, AssemblyError> {
    let budget = Budget::new(budget)?;
    require_categories(catalog, &Category::ALL)?;

    let builds: Vec<Build> = Tier::ALL
        .iter()
        .filter_map(|tier| assemble_tier(catalog, *tier, budget))
        .collect();

    tracing::info!(budget = budget.amount(), builds = builds.len(), "tiered assembly finished");
    Ok(builds)
}

/// Assemble a single tier. `None` when some category has nothing affordable
/// (or nothing at all).
pub fn assemble_tier(catalog: &Catalog, tier: Tier, budget: Budget) -> Option<Build> {
    let limit = budget.amount();
    let mut cost = 0.0;
    let mut parts = BTreeMap::new();

    // Category::ALL is the build's own summation order, so `cost` tracks
    // Build::new exactly.
    for category in Category::ALL {
        let records = catalog.parts(category);
        let affordable = &records[..records.partition_point(|p| cost + p.price <= limit)];

        let Some(part) = tier.pick(affordable) else {
            tracing::debug!(tier = tier.label(), %category, cost, "tier aborted: nothing affordable");
            return None;
        };

        cost += part.price;
        parts.insert(category, part.clone());
    }

    Some(Build::new(tier.label(), budget, parts))
}
