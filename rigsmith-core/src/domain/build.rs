//! Build: one part per category plus derived cost figures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Budget, Category, PartRecord};

/// Non-fatal conditions attached to a finished build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// Nothing in `category` fit the money left, so the cheapest record was
    /// taken anyway. `available` is what remained before the pick.
    BudgetOverrunByFallback {
        category: Category,
        price: f64,
        available: f64,
    },
}

/// A complete (or customized) assignment of parts.
///
/// `cost` and `remaining` are derived at construction and recomputed by every
/// mutating method; nothing else writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub label: String,
    pub budget: f64,
    pub parts: BTreeMap<Category, PartRecord>,
    pub cost: f64,
    pub remaining: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<BuildWarning>,
}

impl Build {
    pub fn new(label: impl Into<String>, budget: Budget, parts: BTreeMap<Category, PartRecord>) -> Self {
        let cost = total_cost(parts.values());
        Self {
            label: label.into(),
            budget: budget.amount(),
            remaining: budget.amount() - cost,
            parts,
            cost,
            score: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<BuildWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn part(&self, category: Category) -> Option<&PartRecord> {
        self.parts.get(&category)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.parts.contains_key(&category)
    }

    /// Categories from `required` that this build lacks.
    pub fn missing(&self, required: &[Category]) -> Vec<Category> {
        required.iter().copied().filter(|c| !self.contains(*c)).collect()
    }

    pub fn is_over_budget(&self) -> bool {
        self.cost > self.budget
    }

    /// Replace (or add) the part in `part.category`, recomputing cost.
    /// The score no longer describes this build, so it is cleared, as are
    /// fallback warnings for the replaced category.
    pub fn replace_part(&mut self, part: PartRecord) {
        let category = part.category;
        self.parts.insert(category, part);
        self.cost = total_cost(self.parts.values());
        self.remaining = self.budget - self.cost;
        self.score = None;
        self.warnings.retain(|w| match w {
            BuildWarning::BudgetOverrunByFallback { category: c, .. } => *c != category,
        });
    }
}

/// Sum of prices in the order given. Builds always sum in category order.
fn total_cost<'a>(parts: impl IntoIterator<Item = &'a PartRecord>) -> f64 {
    parts.into_iter().map(|p| p.price).sum()
}

/// Cost a build of `picked` plus `candidate` would report.
///
/// Prices are added in category order regardless of the order parts were
/// picked in, so comparing the result to the budget agrees exactly with
/// [`Build::is_over_budget`] for the same parts.
pub fn projected_cost<'a>(picked: impl IntoIterator<Item = &'a PartRecord>, candidate: &PartRecord) -> f64 {
    let mut parts: Vec<&PartRecord> = picked
        .into_iter()
        .filter(|p| p.category != candidate.category)
        .collect();
    parts.push(candidate);
    parts.sort_by_key(|p| p.category);
    total_cost(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_build() -> Build {
        let mut parts = BTreeMap::new();
        parts.insert(Category::Cpu, PartRecord::new(Category::Cpu, "cpu", 200.0));
        parts.insert(Category::Mainboard, PartRecord::new(Category::Mainboard, "mb", 120.0));
        Build::new("Test", Budget::new(500.0).unwrap(), parts)
    }

    #[test]
    fn cost_and_remaining_are_derived() {
        let build = sample_build();
        assert_eq!(build.cost, 320.0);
        assert_eq!(build.remaining, 180.0);
        assert!(!build.is_over_budget());
    }

    #[test]
    fn missing_lists_absent_categories() {
        let build = sample_build();
        assert_eq!(
            build.missing(&[Category::Cpu, Category::Gpu, Category::Memory]),
            vec![Category::Gpu, Category::Memory]
        );
    }

    #[test]
    fn replace_part_recomputes_and_clears_score() {
        let mut build = sample_build().with_score(42.0).with_warnings(vec![
            BuildWarning::BudgetOverrunByFallback {
                category: Category::Cpu,
                price: 200.0,
                available: 150.0,
            },
        ]);
        build.replace_part(PartRecord::new(Category::Cpu, "cheaper", 100.0));
        assert_eq!(build.cost, 220.0);
        assert_eq!(build.remaining, 280.0);
        assert_eq!(build.score, None);
        assert!(build.warnings.is_empty());
        assert_eq!(build.part(Category::Cpu).unwrap().name, "cheaper");
    }

    #[test]
    fn projected_cost_matches_build_cost() {
        // 0.6 - 0.07 leaves exactly 0.53, yet 0.07 + 0.53 sums past 0.6
        let cpu = PartRecord::new(Category::Cpu, "cpu", 0.07);
        let board = PartRecord::new(Category::Mainboard, "mb", 0.0);
        let gpu = PartRecord::new(Category::Gpu, "gpu", 0.53);
        let projected = projected_cost([&cpu, &board], &gpu);

        let parts = BTreeMap::from([
            (Category::Cpu, cpu.clone()),
            (Category::Mainboard, board.clone()),
            (Category::Gpu, gpu.clone()),
        ]);
        let build = Build::new("Drift", Budget::new(0.6).unwrap(), parts);
        assert!(gpu.price <= 0.6 - cpu.price);
        assert_eq!(projected, build.cost);
        assert!(projected > 0.6);
        assert!(build.is_over_budget());

        // a candidate replaces any picked part of its category
        let cheaper = PartRecord::new(Category::Cpu, "cheaper", 0.01);
        assert_eq!(projected_cost([&cpu, &gpu], &cheaper), 0.01 + 0.53);
    }

    #[test]
    fn serializes_parts_keyed_by_category() {
        let json = serde_json::to_value(sample_build()).unwrap();
        assert_eq!(json["parts"]["CPU"]["name"], "cpu");
        assert!(json.get("score").is_none());
    }
}
