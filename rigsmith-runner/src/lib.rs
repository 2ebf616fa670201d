//! Rigsmith Runner: assemblers, predictive scoring, catalog loading.
//!
//! This crate builds on `rigsmith-core` to provide:
//! - The tiered rule assembler (Budget / Balanced / Performance)
//! - The scenario smart assembler with its allocation fallback chain
//! - The stochastic sampling assembler and its bounded leaderboard
//! - The predictive scorer boundary, linear reference model and registry
//! - CSV catalog loading with per-category failure records
//! - TOML engine configuration
//! - The `Engine` facade and a background assembly worker

pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod loader;
pub mod predictor;
pub mod sampling;
pub mod smart;
pub mod tiered;
pub mod worker;

pub use config::{ConfigError, EngineConfig, TablesOverride};
pub use engine::{Engine, EngineError};
pub use error::AssemblyError;
pub use leaderboard::{InsertResult, Leaderboard, LeaderboardEntry};
pub use loader::{load_catalog, parse_category, LoadError, LoadOptions};
pub use predictor::{LinearScorer, ModelError, PredictionError, PredictiveScorer, ScorerRegistry};
pub use sampling::{assemble_by_sampling, run_sampling, SamplingConfig, SamplingReport};
pub use smart::assemble_smart;
pub use tiered::{assemble_tier, assemble_tiers, Tier};
pub use worker::{AssemblyWorker, WorkerCommand, WorkerResponse};
