//! Rigsmith CLI: assemble, score and inspect PC builds from a part catalog.
//!
//! Commands:
//! - `tiers` builds the Budget, Balanced and Performance configurations
//! - `smart` builds the scenario-weighted configuration, optionally scored
//! - `sample` runs the stochastic search and prints the ranked builds
//! - `compare` puts two parts of one category side by side
//! - `catalog` reports what was loaded and what is unavailable
//! - `scenarios` lists the supported usage scenarios

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use rigsmith_core::{Build, BuildWarning, Category, PartComparison, Scenario};
use rigsmith_runner::{Engine, EngineConfig, SamplingReport};

#[derive(Parser)]
#[command(name = "rigsmith", about = "Rigsmith: budget-driven PC build assembly", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML engine config. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the per-category CSV files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory holding `rf_<scenario>.toml` scoring models.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the three rule-based tiers.
    Tiers {
        /// Total budget.
        budget: f64,
    },
    /// Assemble the scenario-weighted build.
    Smart {
        /// gaming, workstation, content-creation, home-office or general-use.
        scenario: Scenario,

        /// Total budget.
        budget: f64,

        /// Score the build with the scenario's model.
        #[arg(long, default_value_t = false)]
        score: bool,

        /// Swap a part after assembly, as CATEGORY=NAME. Repeatable.
        #[arg(long = "swap", value_name = "CATEGORY=NAME")]
        swaps: Vec<String>,
    },
    /// Rank randomly sampled builds with the scenario's model.
    Sample {
        scenario: Scenario,

        budget: f64,

        /// Number of trials.
        #[arg(long)]
        samples: Option<usize>,

        /// Number of builds to keep.
        #[arg(long)]
        top: Option<usize>,

        /// Master seed; the same seed gives the same builds.
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads for trials.
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Compare two parts of the same category.
    Compare {
        category: Category,
        left: String,
        right: String,
    },
    /// Show loaded categories, record counts and unavailable categories.
    Catalog {
        /// List the records of one category, cheapest first.
        #[arg(long)]
        category: Option<Category>,
    },
    /// List the supported usage scenarios.
    Scenarios,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = resolve_config(&cli)?;

    match cli.command {
        Commands::Scenarios => run_scenarios(cli.json),
        Commands::Tiers { budget } => {
            let engine = Engine::from_config(&config)?;
            let builds = engine.assemble_tiers(budget)?;
            tracing::info!(budget, tiers = builds.len(), "tiers assembled");
            if builds.is_empty() {
                eprintln!("No tier fits a budget of {budget:.2}.");
            }
            emit(cli.json, &builds, || builds.iter().for_each(print_build))
        }
        Commands::Smart {
            scenario,
            budget,
            score,
            swaps,
        } => {
            let engine = Engine::from_config(&config)?;
            let mut build = engine.assemble_smart(scenario, budget)?;
            for swap in &swaps {
                let (category, name) = parse_swap(swap)?;
                build = engine.customize(&build, category, name)?;
            }
            if score {
                let predicted = engine.score_build(scenario, &build)?;
                build = build.with_score(predicted);
            }
            tracing::info!(%scenario, budget, cost = build.cost, swaps = swaps.len(), "smart build assembled");
            emit(cli.json, &build, || print_build(&build))
        }
        Commands::Sample {
            scenario,
            budget,
            samples,
            top,
            seed,
            threads,
        } => {
            let sampling = &mut config.sampling;
            if let Some(n) = samples {
                sampling.sample_count = n;
            }
            if let Some(n) = top {
                sampling.top_n = n;
            }
            if let Some(s) = seed {
                sampling.master_seed = s;
            }
            if let Some(t) = threads {
                sampling.threads = t;
            }
            config.validate()?;

            let engine = Engine::from_config(&config)?;
            let report = engine.sample(scenario, budget, engine.sampling_config())?;
            tracing::info!(
                %scenario,
                trials = report.trials,
                scored = report.scored,
                kept = report.builds.len(),
                "sampling finished"
            );
            emit(cli.json, &report, || print_report(&report))
        }
        Commands::Compare { category, left, right } => {
            let engine = Engine::from_config(&config)?;
            let comparison = engine.compare_parts(category, &left, &right)?;
            tracing::info!(%category, %left, %right, "parts compared");
            emit(cli.json, &comparison, || print_comparison(&comparison))
        }
        Commands::Catalog { category } => {
            let engine = Engine::from_config(&config)?;
            tracing::info!(missing = engine.catalog().missing().len(), "catalog loaded");
            run_catalog(&engine, category, cli.json)
        }
    }
}

/// Config file (or defaults) with the directory flags applied on top.
fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = Some(dir.clone());
    }
    tracing::info!(
        config = ?cli.config,
        data_dir = %config.data_dir.display(),
        model_dir = ?config.model_dir,
        "config loaded"
    );
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON to stdout, or the text renderer.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn parse_swap(arg: &str) -> Result<(Category, &str)> {
    let Some((category, name)) = arg.split_once('=') else {
        bail!("invalid --swap '{arg}': expected CATEGORY=NAME");
    };
    let category = Category::from_str(category.trim()).with_context(|| format!("invalid --swap '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid --swap '{arg}': part name is empty");
    }
    Ok((category, name))
}

fn run_scenarios(json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct Row {
        slug: &'static str,
        name: String,
    }
    let rows: Vec<Row> = Scenario::ALL
        .iter()
        .map(|s| Row {
            slug: s.slug(),
            name: s.to_string(),
        })
        .collect();
    emit(json, &rows, || {
        for row in &rows {
            println!("{:<14} {}", row.slug, row.name);
        }
    })
}

fn run_catalog(engine: &Engine, category: Option<Category>, json: bool) -> Result<()> {
    let catalog = engine.catalog();

    if let Some(category) = category {
        let parts = catalog.require(category)?;
        return emit(json, &parts, || {
            println!("{:<40} {:>10}  Socket", "Name", "Price");
            println!("{}", "-".repeat(62));
            for part in parts {
                println!(
                    "{:<40} {:>10.2}  {}",
                    part.name,
                    part.price,
                    part.socket.as_deref().unwrap_or("-")
                );
            }
        });
    }

    #[derive(Serialize)]
    struct Row {
        category: Category,
        records: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        unavailable: Option<String>,
    }
    let rows: Vec<Row> = Category::ALL
        .iter()
        .map(|c| Row {
            category: *c,
            records: catalog.parts(*c).len(),
            unavailable: catalog.require(*c).err().map(|e| e.to_string()),
        })
        .collect();
    emit(json, &rows, || {
        println!("{:<14} {:>8}  Status", "Category", "Records");
        println!("{}", "-".repeat(48));
        for row in &rows {
            println!(
                "{:<14} {:>8}  {}",
                row.category.to_string(),
                row.records,
                row.unavailable.as_deref().unwrap_or("ok")
            );
        }
    })
}

fn print_build(build: &Build) {
    println!();
    println!("=== {} ===", build.label);
    for (category, part) in &build.parts {
        println!("{:<14} {:<40} {:>10.2}", category.to_string(), part.name, part.price);
    }
    println!("{}", "-".repeat(66));
    println!("{:<55} {:>10.2}", "Cost", build.cost);
    println!("{:<55} {:>10.2}", "Remaining", build.remaining);
    if let Some(score) = build.score {
        println!("{:<55} {:>10.3}", "Score", score);
    }
    for warning in &build.warnings {
        match warning {
            BuildWarning::BudgetOverrunByFallback {
                category,
                price,
                available,
            } => println!("WARNING: {category} fallback costs {price:.2} with only {available:.2} left"),
        }
    }
}

fn print_report(report: &SamplingReport) {
    println!();
    println!("=== Sampling: {} ===", report.scenario);
    println!("Trials:         {}", report.trials);
    println!("Scored:         {}", report.scored);
    println!("Aborted:        {}", report.aborted);
    println!("Over budget:    {}", report.over_budget);
    println!("Scoring failed: {}", report.scoring_failures);
    println!("Elapsed:        {:.3}s", report.elapsed_secs);
    if report.builds.is_empty() {
        println!();
        println!("No build was scored.");
    }
    report.builds.iter().for_each(print_build);
}

fn print_comparison(cmp: &PartComparison) {
    println!();
    println!("=== {} ===", cmp.category);
    println!("{:<14} {:>12} {:>12}", "Feature", "Left", "Right");
    for row in &cmp.features {
        println!("{:<14} {:>12.1} {:>12.1}", row.feature.to_string(), row.left, row.right);
    }
    println!();
    let names = |features: &[rigsmith_core::Feature]| {
        features.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
    };
    if cmp.is_close() {
        println!("No clear strengths either way.");
    } else {
        println!("{} leads on: {}", cmp.left, names(&cmp.left_strengths[..]));
        println!("{} leads on: {}", cmp.right, names(&cmp.right_strengths[..]));
    }
}
