//! Scenario smart assembler.
//!
//! Strictly sequential stages, each narrowing the candidate list by an
//! allocation fraction of the money left and widening through a fallback
//! chain when nothing fits:
//!
//! 1. Processor: `budget * 0.25`, then `budget * 0.4`, then cheapest overall.
//! 2. Mainboard (same socket): `remaining * 0.25`, then `remaining * 0.4`,
//!    then cheapest matching board. No matching board at all is fatal.
//! 3. Secondary categories in fixed order: `remaining * share`, then the full
//!    remaining, then cheapest regardless of price (flagged with a warning).

use std::collections::BTreeMap;

use rigsmith_core::{
    projected_cost, select_best, Budget, Build, BuildWarning, Catalog, Category, FeatureWeights,
    NormalizationRanges, PartRecord, Scenario, ScenarioTables,
};

use crate::error::{require_categories, AssemblyError};

/// Allocation fractions tried, in order, for the processor and mainboard.
pub const CORE_FRACTIONS: [f64; 2] = [0.25, 0.4];

pub fn assemble_smart(
    catalog: &Catalog,
    ranges: &NormalizationRanges,
    tables: &ScenarioTables,
    scenario: Scenario,
    budget: f64,
) -> Result<Build, AssemblyError> {
    let budget = Budget::new(budget)?;
    require_categories(catalog, &Category::CORE)?;

    let mut parts = BTreeMap::new();
    let mut warnings = Vec::new();

    // ─── Processor ───
    let cpus = catalog.parts(Category::Cpu);
    let cpu_weights = tables.weights(scenario, Category::Cpu);
    let cpu = match pick_with_fractions(cpus, budget.amount(), cpu_weights, ranges, Category::Cpu, |_| true) {
        Some(cpu) => cpu,
        // require_categories guarantees at least one processor
        None => fallback(&cpus[0], budget.amount(), cpus[0].price > budget.amount(), scenario, &mut warnings),
    };
    let mut remaining = budget.amount() - cpu.price;
    tracing::debug!(%scenario, processor = %cpu.name, price = cpu.price, remaining, "processor selected");

    // ─── Mainboard ───
    let incompatible = || AssemblyError::Incompatible {
        processor: cpu.name.clone(),
        socket: cpu.socket.clone(),
    };
    let socket = cpu.socket.as_deref().ok_or_else(incompatible)?;
    let boards = catalog.parts(Category::Mainboard);
    let board_weights = tables.weights(scenario, Category::Mainboard);
    let board = match pick_with_fractions(boards, remaining, board_weights, ranges, Category::Mainboard, |b| {
        b.fits_socket(socket)
    }) {
        Some(board) => board,
        None => {
            let cheapest = boards.iter().find(|b| b.fits_socket(socket)).ok_or_else(incompatible)?;
            let over = projected_cost([cpu], cheapest) > budget.amount();
            fallback(cheapest, remaining, over, scenario, &mut warnings)
        }
    };
    remaining -= board.price;
    tracing::debug!(%scenario, mainboard = %board.name, socket, remaining, "mainboard selected");

    parts.insert(Category::Cpu, cpu.clone());
    parts.insert(Category::Mainboard, board.clone());

    // ─── Secondary categories ───
    for category in Category::SECONDARY {
        let records = catalog.parts(category);
        if records.is_empty() {
            tracing::warn!(%scenario, %category, "no records; stage skipped");
            continue;
        }

        let weights = tables.weights(scenario, category);
        let allocation = remaining * tables.share(scenario, category);
        let fits = |p: &PartRecord| projected_cost(parts.values(), p) <= budget.amount();
        let within_share = |p: &PartRecord| p.price <= allocation && fits(p);
        let chosen = pick_within(records, within_share, weights, ranges, category, |_| true)
            .or_else(|| pick_within(records, fits, weights, ranges, category, |_| true));

        let part = match chosen {
            Some(part) => part,
            // records is non-empty and price-ascending
            None => fallback(&records[0], remaining, !fits(&records[0]), scenario, &mut warnings),
        };

        remaining -= part.price;
        parts.insert(category, part.clone());
    }

    let build = Build::new(format!("Smart ({scenario})"), budget, parts).with_warnings(warnings);
    let missing = build.missing(&Category::CORE);
    if !missing.is_empty() {
        return Err(AssemblyError::IncompleteBuild { missing });
    }

    tracing::info!(
        %scenario,
        cost = build.cost,
        remaining = build.remaining,
        warnings = build.warnings.len(),
        "smart build assembled"
    );
    Ok(build)
}

/// Take the cheapest candidate after the allocation chain came up empty,
/// flagging the build when taking it puts the build `over_budget`.
/// `available` is the money left before the pick.
fn fallback<'a>(
    cheapest: &'a PartRecord,
    available: f64,
    over_budget: bool,
    scenario: Scenario,
    warnings: &mut Vec<BuildWarning>,
) -> &'a PartRecord {
    if over_budget {
        tracing::warn!(
            %scenario,
            category = %cheapest.category,
            part = %cheapest.name,
            price = cheapest.price,
            available,
            "nothing affordable; taking cheapest over budget"
        );
        warnings.push(BuildWarning::BudgetOverrunByFallback {
            category: cheapest.category,
            price: cheapest.price,
            available,
        });
    }
    cheapest
}

/// Try each of [`CORE_FRACTIONS`] of `available` in turn.
fn pick_with_fractions<'a>(
    records: &'a [PartRecord],
    available: f64,
    weights: &FeatureWeights,
    ranges: &NormalizationRanges,
    category: Category,
    accept: impl Fn(&PartRecord) -> bool + Copy,
) -> Option<&'a PartRecord> {
    CORE_FRACTIONS
        .iter()
        .find_map(|fraction| {
            let limit = available * fraction;
            pick_within(records, |p| p.price <= limit, weights, ranges, category, accept)
        })
}

/// Best-scoring accepted record among the `affordable` prefix.
///
/// `affordable` must hold for a price-ascending prefix of `records`.
fn pick_within<'a>(
    records: &'a [PartRecord],
    affordable: impl Fn(&PartRecord) -> bool,
    weights: &FeatureWeights,
    ranges: &NormalizationRanges,
    category: Category,
    accept: impl Fn(&PartRecord) -> bool,
) -> Option<&'a PartRecord> {
    let affordable = &records[..records.partition_point(affordable)];
    select_best(affordable.iter().filter(|p| accept(*p)), weights, ranges, category)
}
