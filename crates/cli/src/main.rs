use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use futuretree_learning::{
    BatchOptions, InMemoryStore, LearningStore, MetricRecalculator, PathRecalculation,
    RecalculationTrigger,
};
use futuretree_protocol::{
    parse_records, record_schema, serialize_json, BusinessProfile, CaseStudy, ClientContext,
    PathOutcome, StrategicPath,
};
use futuretree_scoring::{
    breakeven_probability, calculate_emv, calculate_what_if, compare_scenarios, sensitivity,
    EmvInput, EmvResult, PathScorer, Scenario, ScoringProfile, WhatIfAdjustments,
    DEFAULT_REVENUE_MULTIPLIER,
};
use futuretree_search::{CaseStudySearch, SimilarityMatcher};
use serde::de::DeserializeOwned;
use serde::Serialize;

mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "futuretree")]
#[command(about = "Case-study matching, path ranking and EMV simulation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML config with [matching], [scoring] and [learning] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank case studies by similarity to a business profile
    Match(MatchArgs),

    /// Fuzzy keyword search over case studies
    Search(SearchArgs),

    /// Rank strategic paths for a client context
    Rank(RankArgs),

    /// Expected monetary value of a path
    Emv(EmvArgs),

    /// EMV under adjusted cost, probability or timeline
    #[command(name = "what-if")]
    WhatIf(WhatIfArgs),

    /// Recalculate path statistics from reported outcomes
    Recalc(RecalcArgs),

    /// Print the JSON Schema of an input record kind
    Schema(SchemaArgs),
}

#[derive(Args)]
struct MatchArgs {
    /// Business profile JSON
    #[arg(long)]
    profile: PathBuf,

    /// Case studies JSON (object or array)
    #[arg(long)]
    cases: PathBuf,

    /// Minimum overall score (0-100)
    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    max_results: Option<usize>,

    /// Only consider this strategy type
    #[arg(long)]
    strategy: Option<String>,
}

#[derive(Args)]
struct SearchArgs {
    /// Case studies JSON (object or array)
    #[arg(long)]
    cases: PathBuf,

    #[arg(short, long, default_value_t = 10)]
    limit: usize,

    query: String,
}

#[derive(Args)]
struct RankArgs {
    /// Client context JSON
    #[arg(long)]
    context: PathBuf,

    /// Strategic paths JSON (object or array)
    #[arg(long)]
    paths: PathBuf,

    /// JSON or TOML scoring profile (default: built-in)
    #[arg(long)]
    scoring_profile: Option<PathBuf>,
}

#[derive(Args)]
struct EmvArgs {
    /// Success probability, 0-1
    #[arg(long)]
    probability: Option<f64>,

    #[arg(long)]
    revenue: Option<f64>,

    #[arg(long)]
    cost: Option<f64>,

    /// Seed the inputs from a strategic path in this file
    #[arg(long, requires = "path_id")]
    paths: Option<PathBuf>,

    #[arg(long, requires = "paths")]
    path_id: Option<String>,

    /// Revenue estimate as a multiple of P75 capital when seeding from a path
    #[arg(long, default_value_t = DEFAULT_REVENUE_MULTIPLIER)]
    revenue_multiplier: f64,
}

#[derive(Args)]
struct WhatIfArgs {
    #[command(flatten)]
    base: EmvArgs,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    cost_delta_pct: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    probability_delta_pts: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    timeline_delta_weeks: f64,

    /// Compare named scenarios from a JSON file instead of a single adjustment
    #[arg(long)]
    scenarios: Option<PathBuf>,
}

#[derive(Args)]
struct RecalcArgs {
    /// Strategic paths JSON (object or array)
    #[arg(long)]
    paths: PathBuf,

    /// Path outcomes JSON (object or array)
    #[arg(long)]
    outcomes: PathBuf,

    /// Recalculate only this path
    #[arg(long = "path")]
    path_id: Option<String>,

    /// Ignore the new-outcome threshold
    #[arg(long)]
    force: bool,

    /// Write the updated paths here
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct SchemaArgs {
    /// business-profile, case-study, client-context, strategic-path or path-outcome
    kind: String,
}

#[derive(Serialize)]
struct EmvReport {
    input: EmvInput,
    result: EmvResult,
    breakeven_probability: f64,
    sensitivity_per_point: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Match(args) => run_match(args, &config, cli.pretty)?,
        Commands::Search(args) => run_search(args, cli.pretty)?,
        Commands::Rank(args) => run_rank(args, &config, cli.pretty)?,
        Commands::Emv(args) => run_emv(args, cli.pretty)?,
        Commands::WhatIf(args) => run_what_if(args, cli.pretty)?,
        Commands::Recalc(args) => run_recalc(args, &config, cli.pretty).await?,
        Commands::Schema(args) => print_json(&record_schema(&args.kind)?, cli.pretty)?,
    }

    Ok(())
}

fn run_match(args: MatchArgs, config: &CliConfig, pretty: bool) -> Result<()> {
    let profile: BusinessProfile = read_record(&args.profile)?;
    let cases: Vec<CaseStudy> = read_records(&args.cases)?;
    let options = config.match_options(args.threshold, args.max_results, args.strategy);

    let matcher = SimilarityMatcher::default();
    let result = matcher.match_profile(&profile, &cases, &options);
    log::info!(
        "Matched {} of {} case studies (threshold {})",
        result.matches.len(),
        result.candidates_considered,
        options.threshold
    );
    print_json(&result, pretty)
}

fn run_search(args: SearchArgs, pretty: bool) -> Result<()> {
    let cases: Vec<CaseStudy> = read_records(&args.cases)?;
    let mut search = CaseStudySearch::new();
    let hits = search.search(&args.query, &cases, args.limit)?;
    print_json(&hits, pretty)
}

fn run_rank(args: RankArgs, config: &CliConfig, pretty: bool) -> Result<()> {
    let context: ClientContext = read_record(&args.context)?;
    let paths = read_paths(&args.paths)?;

    let profile = match args.scoring_profile.or_else(|| config.scoring.profile.clone()) {
        Some(path) => ScoringProfile::from_file(&path)?,
        None => ScoringProfile::default_profile()?,
    };
    log::debug!(
        "Using scoring profile '{}'{}",
        profile.name(),
        profile
            .description()
            .map(|d| format!(": {d}"))
            .unwrap_or_default()
    );

    let scorer = PathScorer::new(profile)?;
    let ranked = scorer.rank(&paths, &context);
    print_json(&ranked, pretty)
}

fn run_emv(args: EmvArgs, pretty: bool) -> Result<()> {
    let input = resolve_emv_input(&args)?;
    let report = EmvReport {
        input,
        result: calculate_emv(&input),
        breakeven_probability: breakeven_probability(input.estimated_revenue, input.cost),
        sensitivity_per_point: sensitivity(input.estimated_revenue, input.cost),
    };
    print_json(&report, pretty)
}

fn run_what_if(args: WhatIfArgs, pretty: bool) -> Result<()> {
    let base = resolve_emv_input(&args.base)?;

    if let Some(path) = &args.scenarios {
        let scenarios: Vec<Scenario> = read_records(path)?;
        return print_json(&compare_scenarios(&base, &scenarios), pretty);
    }

    let adjustments = WhatIfAdjustments {
        cost_delta_pct: args.cost_delta_pct,
        probability_delta_pts: args.probability_delta_pts,
        timeline_delta_weeks: args.timeline_delta_weeks,
    };
    if adjustments.is_noop() {
        log::info!("No adjustments given; the adjusted EMV equals the base");
    }
    print_json(&calculate_what_if(&base, &adjustments), pretty)
}

async fn run_recalc(args: RecalcArgs, config: &CliConfig, pretty: bool) -> Result<()> {
    let paths = read_paths(&args.paths)?;
    let outcomes: Vec<PathOutcome> = read_records(&args.outcomes)?;

    let store = Arc::new(InMemoryStore::new(paths, outcomes));
    let recalculator = MetricRecalculator::new(store.clone(), config.learning_config())?;

    match &args.path_id {
        Some(path_id) => {
            if !args.force && !recalculator.check_recalculation_needed(path_id).await? {
                log::info!(
                    "Path {path_id} is under the outcome threshold; use --force to recalculate"
                );
                let skipped = PathRecalculation {
                    path_id: path_id.clone(),
                    recalculated: false,
                    result: None,
                    error: None,
                };
                print_json(&skipped, pretty)?;
            } else {
                let result = recalculator
                    .recalculate(path_id, RecalculationTrigger::Manual)
                    .await?;
                print_json(&result, pretty)?;
            }
        }
        None => {
            let batch = recalculator
                .recalculate_all(&BatchOptions {
                    trigger: RecalculationTrigger::Manual,
                    force: args.force,
                })
                .await?;
            print_json(&batch, pretty)?;
        }
    }

    if let Some(out) = &args.out {
        let updated = store.list_paths().await?;
        write_json(out, &updated)?;
        log::info!("Wrote {} paths to {}", updated.len(), out.display());
    }
    Ok(())
}

fn resolve_emv_input(args: &EmvArgs) -> Result<EmvInput> {
    let seeded = match (&args.paths, &args.path_id) {
        (Some(file), Some(path_id)) => {
            let paths = read_paths(file)?;
            let path = paths
                .iter()
                .find(|p| &p.id == path_id)
                .ok_or_else(|| anyhow!("Strategic path not found: {path_id}"))?;
            Some(EmvInput::from_path(path, args.revenue_multiplier))
        }
        _ => None,
    };

    let pick = |flag: Option<f64>, seeded: Option<f64>, name: &str| -> Result<f64> {
        flag.or(seeded)
            .ok_or_else(|| anyhow!("--{name} is required unless --paths/--path-id are given"))
    };
    let input = EmvInput {
        success_probability: pick(
            args.probability,
            seeded.map(|s| s.success_probability),
            "probability",
        )?,
        estimated_revenue: pick(args.revenue, seeded.map(|s| s.estimated_revenue), "revenue")?,
        cost: pick(args.cost, seeded.map(|s| s.cost), "cost")?,
    };

    if !(0.0..=1.0).contains(&input.success_probability) {
        bail!(
            "probability must be within [0, 1] (got {})",
            input.success_probability
        );
    }
    Ok(input)
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&raw).with_context(|| format!("Invalid records in {}", path.display()))
}

/// Strategic paths must satisfy their range invariants before anything scores them.
fn read_paths(path: &Path) -> Result<Vec<StrategicPath>> {
    let paths: Vec<StrategicPath> = read_records(path)?;
    for record in &paths {
        record.validate().with_context(|| {
            format!("Invalid strategic path '{}' in {}", record.id, path.display())
        })?;
    }
    Ok(paths)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serialize_json(value, true)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    println!("{}", serialize_json(value, pretty)?);
    Ok(())
}
