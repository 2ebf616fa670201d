//! Stochastic search assembler: random complete builds ranked by a
//! predictive scorer.
//!
//! Each trial is an independent state machine
//! (`SelectProcessor → SelectMainboard → SelectRemaining → Validate → Score`)
//! drawing from its own RNG, derived from the master seed and the trial
//! index. Trials therefore produce identical results whether they run
//! sequentially or on a rayon pool. A trial that aborts, overruns the budget
//! or fails to score contributes nothing but a counter.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rigsmith_core::{
    projected_cost, Budget, Build, Catalog, Category, FeatureVector, PartRecord, RngHierarchy, Scenario,
};

use crate::error::{require_categories, AssemblyError};
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::predictor::{PredictionError, PredictiveScorer};

/// Processor price cap as a fraction of the total budget.
pub const PROCESSOR_FRACTION: f64 = 0.4;
/// Mainboard price cap as a fraction of the money left after the processor.
pub const MAINBOARD_FRACTION: f64 = 0.5;

// ─── Config types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub sample_count: usize,
    pub top_n: usize,
    pub master_seed: u64,
    /// Worker threads for trials. `1` (or `0`) runs on the calling thread.
    pub threads: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: 50,
            top_n: 3,
            master_seed: 42,
            threads: 1,
        }
    }
}

/// Outcome of a whole sampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingReport {
    pub scenario: Scenario,
    /// Up to `top_n` builds, best score first.
    pub builds: Vec<Build>,
    pub trials: usize,
    pub scored: usize,
    pub aborted: usize,
    pub over_budget: usize,
    pub scoring_failures: usize,
    pub elapsed_secs: f64,
    pub finished_at: DateTime<Utc>,
}

// ─── Trial state machine ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    NoProcessor,
    ProcessorWithoutSocket { processor: String },
    NoCompatibleMainboard { socket: String },
    EmptyCategory(Category),
}

#[derive(Debug)]
enum TrialOutcome {
    Scored { build: Build, score: f64 },
    Aborted(AbortReason),
    OverBudget { cost: f64 },
    ScoringFailed(PredictionError),
}

enum TrialState<'a> {
    SelectProcessor,
    SelectMainboard {
        cpu: &'a PartRecord,
    },
    SelectRemaining {
        picked: BTreeMap<Category, &'a PartRecord>,
    },
    Validate {
        picked: BTreeMap<Category, &'a PartRecord>,
    },
    Score {
        build: Build,
    },
    Done(TrialOutcome),
}

struct Trial<'a> {
    index: u64,
    catalog: &'a Catalog,
    scorer: &'a dyn PredictiveScorer,
    scenario: Scenario,
    budget: Budget,
    rng: StdRng,
    remaining: f64,
}

impl<'a> Trial<'a> {
    fn run(mut self) -> TrialOutcome {
        let mut state = TrialState::SelectProcessor;
        loop {
            state = match state {
                TrialState::SelectProcessor => self.select_processor(),
                TrialState::SelectMainboard { cpu } => self.select_mainboard(cpu),
                TrialState::SelectRemaining { picked } => self.select_remaining(picked),
                TrialState::Validate { picked } => self.validate(picked),
                TrialState::Score { build } => self.score(build),
                TrialState::Done(outcome) => return outcome,
            };
        }
    }

    fn select_processor(&mut self) -> TrialState<'a> {
        let cpus = self.catalog.parts(Category::Cpu);
        let cap = self.budget.amount() * PROCESSOR_FRACTION;
        let affordable = &cpus[..cpus.partition_point(|p| p.price <= cap)];
        match affordable.choose(&mut self.rng).or_else(|| cpus.first()) {
            Some(cpu) => {
                self.remaining -= cpu.price;
                TrialState::SelectMainboard { cpu }
            }
            None => TrialState::Done(TrialOutcome::Aborted(AbortReason::NoProcessor)),
        }
    }

    fn select_mainboard(&mut self, cpu: &'a PartRecord) -> TrialState<'a> {
        let Some(socket) = cpu.socket.as_deref() else {
            return TrialState::Done(TrialOutcome::Aborted(AbortReason::ProcessorWithoutSocket {
                processor: cpu.name.clone(),
            }));
        };

        let compatible: Vec<&PartRecord> = self
            .catalog
            .parts(Category::Mainboard)
            .iter()
            .filter(|b| b.fits_socket(socket))
            .collect();
        let cap = self.remaining * MAINBOARD_FRACTION;
        let affordable = &compatible[..compatible.partition_point(|b| b.price <= cap)];

        match affordable.choose(&mut self.rng).or_else(|| compatible.first()) {
            Some(board) => {
                self.remaining -= board.price;
                let picked = BTreeMap::from([(Category::Cpu, cpu), (Category::Mainboard, *board)]);
                TrialState::SelectRemaining { picked }
            }
            None => TrialState::Done(TrialOutcome::Aborted(AbortReason::NoCompatibleMainboard {
                socket: socket.to_string(),
            })),
        }
    }

    fn select_remaining(&mut self, mut picked: BTreeMap<Category, &'a PartRecord>) -> TrialState<'a> {
        for category in Category::SECONDARY {
            let records = self.catalog.parts(category);
            let limit = self.budget.amount();
            let fits = |p: &PartRecord| projected_cost(picked.values().copied(), p) <= limit;
            let affordable = &records[..records.partition_point(fits)];
            let Some(part) = affordable.choose(&mut self.rng).or_else(|| records.first()) else {
                return TrialState::Done(TrialOutcome::Aborted(AbortReason::EmptyCategory(category)));
            };
            picked.insert(category, part);
        }
        TrialState::Validate { picked }
    }

    fn validate(&mut self, picked: BTreeMap<Category, &'a PartRecord>) -> TrialState<'a> {
        if let Some(category) = Category::ALL.into_iter().find(|c| !picked.contains_key(c)) {
            return TrialState::Done(TrialOutcome::Aborted(AbortReason::EmptyCategory(category)));
        }

        let parts = picked.into_iter().map(|(c, p)| (c, p.clone())).collect();
        let label = format!("Sampled #{} ({})", self.index + 1, self.scenario);
        let build = Build::new(label, self.budget, parts);
        if build.is_over_budget() {
            return TrialState::Done(TrialOutcome::OverBudget { cost: build.cost });
        }
        TrialState::Score { build }
    }

    fn score(&mut self, build: Build) -> TrialState<'a> {
        let features = FeatureVector::from_build(&build);
        let scorer = self.scorer;
        let outcome = match catch_unwind(AssertUnwindSafe(|| scorer.predict(&features))) {
            Ok(Ok(score)) if score.is_finite() => {
                let score = score.max(0.0);
                TrialOutcome::Scored {
                    build: build.with_score(score),
                    score,
                }
            }
            Ok(Ok(score)) => TrialOutcome::ScoringFailed(PredictionError::NonFinite(score)),
            Ok(Err(e)) => TrialOutcome::ScoringFailed(e),
            Err(payload) => TrialOutcome::ScoringFailed(PredictionError::Panicked(panic_message(&*payload))),
        };
        TrialState::Done(outcome)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ─── Core sampling loop ──────────────────────────────────────────────

/// Run `config.sample_count` trials for `scenario` and rank the scored
/// builds.
pub fn run_sampling(
    catalog: &Catalog,
    scorer: &dyn PredictiveScorer,
    scenario: Scenario,
    budget: f64,
    config: &SamplingConfig,
) -> Result<SamplingReport, AssemblyError> {
    let budget = Budget::new(budget)?;
    let start_time = Instant::now();

    if config.sample_count > 0 {
        require_categories(catalog, &Category::ALL)?;
    }

    let rng_hierarchy = RngHierarchy::new(config.master_seed);
    let run_trial = |index: u64| {
        Trial {
            index,
            catalog,
            scorer,
            scenario,
            budget,
            rng: rng_hierarchy.rng_for(scenario.slug(), index),
            remaining: budget.amount(),
        }
        .run()
    };

    let trial_count = config.sample_count as u64;
    let outcomes: Vec<TrialOutcome> = if config.threads > 1 {
        let tp = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        tp.install(|| (0..trial_count).into_par_iter().map(run_trial).collect())
    } else {
        (0..trial_count).map(run_trial).collect()
    };

    let mut leaderboard = Leaderboard::new(config.top_n);
    let mut report = SamplingReport {
        scenario,
        builds: Vec::new(),
        trials: outcomes.len(),
        scored: 0,
        aborted: 0,
        over_budget: 0,
        scoring_failures: 0,
        elapsed_secs: 0.0,
        finished_at: Utc::now(),
    };

    for (trial, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            TrialOutcome::Scored { build, score } => {
                tracing::debug!(%scenario, trial, score, cost = build.cost, "trial scored");
                report.scored += 1;
                leaderboard.insert(LeaderboardEntry {
                    build,
                    score,
                    trial: trial as u64,
                });
            }
            TrialOutcome::Aborted(reason) => {
                tracing::debug!(%scenario, trial, ?reason, "trial aborted");
                report.aborted += 1;
            }
            TrialOutcome::OverBudget { cost } => {
                tracing::debug!(%scenario, trial, cost, "trial over budget");
                report.over_budget += 1;
            }
            TrialOutcome::ScoringFailed(error) => {
                tracing::debug!(%scenario, trial, %error, "trial scoring failed");
                report.scoring_failures += 1;
            }
        }
    }

    report.builds = leaderboard.into_builds();
    report.elapsed_secs = start_time.elapsed().as_secs_f64();
    report.finished_at = Utc::now();

    tracing::info!(
        %scenario,
        trials = report.trials,
        scored = report.scored,
        aborted = report.aborted,
        over_budget = report.over_budget,
        scoring_failures = report.scoring_failures,
        elapsed_secs = report.elapsed_secs,
        "sampling finished"
    );
    Ok(report)
}

/// Ranked list of at most `config.top_n` scored builds.
pub fn assemble_by_sampling(
    catalog: &Catalog,
    scorer: &dyn PredictiveScorer,
    scenario: Scenario,
    budget: f64,
    config: &SamplingConfig,
) -> Result<Vec<Build>, AssemblyError> {
    run_sampling(catalog, scorer, scenario, budget, config).map(|report| report.builds)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::LinearScorer;
    use rigsmith_core::Feature;

    fn catalog() -> Catalog {
        let mut parts = Vec::new();
        for i in 0..4 {
            parts.push(
                PartRecord::new(Category::Cpu, format!("cpu-{i}"), 100.0 + 50.0 * i as f64)
                    .with_socket(if i % 2 == 0 { "AM5" } else { "LGA1700" })
                    .with_feature(Feature::Speed, 3.0 + i as f64 * 0.4)
                    .with_feature(Feature::CoreCount, 4.0 + 2.0 * i as f64),
            );
            parts.push(
                PartRecord::new(Category::Mainboard, format!("board-{i}"), 80.0 + 20.0 * i as f64)
                    .with_socket(if i % 2 == 0 { "AM5" } else { "LGA1700" }),
            );
        }
        for category in Category::SECONDARY {
            for i in 0..3 {
                parts.push(
                    PartRecord::new(category, format!("{category}-{i}"), 30.0 + 40.0 * i as f64)
                        .with_feature(Feature::Vram, 4.0 * (i + 1) as f64)
                        .with_feature(Feature::Size, 8.0 * (i + 1) as f64)
                        .with_feature(Feature::Space, 500.0 * (i + 1) as f64),
                );
            }
        }
        Catalog::from_parts(parts)
    }

    fn config(sample_count: usize) -> SamplingConfig {
        SamplingConfig {
            sample_count,
            ..SamplingConfig::default()
        }
    }

    #[test]
    fn zero_samples_is_empty_not_error() {
        let scorer = LinearScorer::heuristic(Scenario::Gaming);
        let builds = assemble_by_sampling(&Catalog::new(), &scorer, Scenario::Gaming, 1000.0, &config(0)).unwrap();
        assert!(builds.is_empty());
    }

    #[test]
    fn results_sorted_and_bounded() {
        let scorer = LinearScorer::heuristic(Scenario::Gaming);
        let report = run_sampling(&catalog(), &scorer, Scenario::Gaming, 1200.0, &config(40)).unwrap();
        assert_eq!(report.trials, 40);
        assert_eq!(
            report.scored + report.aborted + report.over_budget + report.scoring_failures,
            40
        );
        assert!(report.builds.len() <= 3);
        let scores: Vec<f64> = report.builds.iter().map(|b| b.score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        for build in &report.builds {
            assert!(build.cost <= 1200.0);
            assert_eq!(
                build.part(Category::Cpu).unwrap().socket,
                build.part(Category::Mainboard).unwrap().socket
            );
        }
    }

    #[test]
    fn negative_scores_clamped_to_zero() {
        let scorer = |_: &FeatureVector| -> Result<f64, PredictionError> { Ok(-5.0) };
        let builds = assemble_by_sampling(&catalog(), &scorer, Scenario::HomeOffice, 2000.0, &config(10)).unwrap();
        assert!(!builds.is_empty());
        assert!(builds.iter().all(|b| b.score == Some(0.0)));
    }

    #[test]
    fn affordability_agrees_with_build_cost() {
        // 0.6 - 0.07 leaves exactly 0.53, but 0.07 + 0.53 > 0.6
        let catalog = Catalog::from_parts(Category::ALL.into_iter().flat_map(|c| match c {
            Category::Cpu => vec![PartRecord::new(c, "cpu", 0.07).with_socket("AM5")],
            Category::Mainboard => vec![PartRecord::new(c, "board", 0.0).with_socket("AM5")],
            Category::Gpu => vec![PartRecord::new(c, "gpu-fits", 0.5), PartRecord::new(c, "gpu-edge", 0.53)],
            _ => vec![PartRecord::new(c, "free", 0.0)],
        }));
        let scorer = |_: &FeatureVector| -> Result<f64, PredictionError> { Ok(1.0) };
        let report = run_sampling(&catalog, &scorer, Scenario::Gaming, 0.6, &config(30)).unwrap();
        assert_eq!(report.over_budget, 0);
        assert_eq!(report.scored, 30);
        for build in &report.builds {
            assert_eq!(build.part(Category::Gpu).unwrap().name, "gpu-fits");
            assert!(!build.is_over_budget());
        }
    }

    #[test]
    fn tight_budget_discards_overruns() {
        let scorer = LinearScorer::heuristic(Scenario::Gaming);
        // cheapest possible build: 100 + 80 + 6 * 30 = 360
        let report = run_sampling(&catalog(), &scorer, Scenario::Gaming, 300.0, &config(20)).unwrap();
        assert!(report.builds.is_empty());
        assert_eq!(report.over_budget, 20);
    }

    #[test]
    fn report_serializes_with_scenario_and_counters() {
        let scorer = LinearScorer::heuristic(Scenario::Workstation);
        let report = run_sampling(&catalog(), &scorer, Scenario::Workstation, 1500.0, &config(5)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scenario"], "Workstation");
        assert_eq!(json["trials"], 5);
        assert!(json["finished_at"].is_string());
    }

    #[test]
    fn panic_message_extracts_strings() {
        let payload = catch_unwind(|| {
            panic!("boom");
        })
        .unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");
    }
}
