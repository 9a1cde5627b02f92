//! mintpool-cli: Command-line front end for the Mintpool analytics engines.
//!
//! Every subcommand prints one pretty-printed JSON document to stdout. Logs
//! go to stderr so the output can be piped straight into other tools.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mintpool_analysis::{
    analyze, analyze_first_cohort, attribute_by_entry, compare_investor_vs_non_investor,
    confidence_outcome, generate_scenarios, resolve_from_thresholds, BreakevenResolver,
    GeometricModel, Scenario,
};
use mintpool_core::constants::{
    CANONICAL_WINDOW_END, CANONICAL_WINDOW_START, DEFAULT_CURVE_MAX_STEPS, DEFAULT_CURVE_STRIDE,
    DEFAULT_SAMPLE_POINTS,
};
use mintpool_core::modes::{
    AttributionMode, AttributionRequest, BreakevenRule, CauseBasis, CostBasis, Denominator,
    PoolReference,
};
use mintpool_core::params::ModelParams;
use mintpool_core::thresholds::BreakevenThresholds;
use mintpool_core::types::{BreakevenPoint, EntryPoint, StepRecord};
use mintpool_core::{sample, SequenceSource, StepSequence};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CliConfig;

/// Mintpool analytics: breakevens, risk, cause attribution and investor
/// comparisons over a bonding-curve mint sequence.
#[derive(Parser)]
#[command(name = "mintpool-cli", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default: <config_dir>/mintpool/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON array of step records to analyse instead of generating one
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Override the sequence horizon
    #[arg(long, global = true)]
    n_max: Option<u32>,

    /// Override the per-mint win probability
    #[arg(long, global = true)]
    win_probability: Option<f64>,

    /// Override the cause fee rate
    #[arg(long, global = true)]
    fee_rate: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full step sequence.
    Generate,
    /// Print an evenly thinned sequence for plotting.
    Sample {
        #[arg(long, default_value_t = DEFAULT_SAMPLE_POINTS)]
        max_points: usize,
    },
    /// Resolve breakevens for a set of entries.
    Breakevens(BreakevenArgs),
    /// Expected cost, profit and percentile capital per entry.
    Risk(EntryArgs),
    /// Cumulative win-probability curve.
    Curve {
        #[arg(long, default_value_t = DEFAULT_CURVE_MAX_STEPS)]
        max_steps: u32,
        #[arg(long, default_value_t = DEFAULT_CURVE_STRIDE)]
        stride: u32,
    },
    /// Each cohort's share of cause funding.
    Attribution(AttributionArgs),
    /// Non-investor vs investor cause funding through the largest breakeven.
    Compare(CompareArgs),
    /// The comparison rerun at named percentile breakevens.
    Scenarios(ScenarioArgs),
    /// First resolved cohort compared against its own breakeven.
    FirstCohort(CompareArgs),
    /// Cost, profit and ROI of minting until a win at a chosen confidence.
    Calculator {
        #[arg(long)]
        entry: u32,
        #[arg(long, default_value_t = 0.9)]
        confidence: f64,
    },
    /// Profit of winning at each step after entry.
    ProfitLine {
        #[arg(long)]
        entry: u32,
        #[command(flatten)]
        rule: RuleArgs,
    },
}

#[derive(Args)]
struct EntryArgs {
    /// Entry steps (default: the configured investor schedule)
    #[arg(long, value_delimiter = ',')]
    entries: Vec<u32>,
}

#[derive(Args)]
struct RuleArgs {
    /// What an entrant pays per step
    #[arg(long, value_enum, default_value_t = CostArg::Fee)]
    cost: CostArg,

    /// The pool value an entrant stands to win
    #[arg(long, value_enum, default_value_t = PoolArg::CauseFunded)]
    pool: PoolArg,
}

#[derive(Args)]
struct BreakevenArgs {
    #[command(flatten)]
    entries: EntryArgs,

    #[command(flatten)]
    rule: RuleArgs,

    /// JSON map of entry step to breakeven pool-size thresholds; replaces
    /// rule-based resolution. `--entries` then selects rows of the table.
    #[arg(long, conflicts_with_all = ["cost", "pool"])]
    thresholds: Option<PathBuf>,
}

#[derive(Args)]
struct AttributionArgs {
    #[command(flatten)]
    entries: EntryArgs,

    #[arg(long, value_enum, default_value_t = ModeArg::Exit)]
    mode: ModeArg,

    /// Largest win step considered in expected-value mode
    #[arg(long)]
    ceiling: Option<u32>,

    #[arg(long, value_enum, default_value_t = BasisArg::Fee)]
    basis: BasisArg,

    #[arg(long, value_enum, default_value_t = DenominatorArg::MaxBreakeven)]
    denominator: DenominatorArg,

    #[arg(long, default_value_t = CANONICAL_WINDOW_START)]
    window_start: u32,

    #[arg(long, default_value_t = CANONICAL_WINDOW_END)]
    window_end: u32,
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    entries: EntryArgs,

    /// First investor entry (default: the configured first entry)
    #[arg(long)]
    first_entry: Option<u32>,

    #[arg(long, value_enum, default_value_t = BasisArg::Fee)]
    basis: BasisArg,
}

#[derive(Args)]
struct ScenarioArgs {
    #[command(flatten)]
    compare: CompareArgs,

    /// Scenario labels: 25th, 50th, expected, 75th, 90th, observed-max
    #[arg(long, value_delimiter = ',')]
    scenarios: Vec<Scenario>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CostArg {
    Gross,
    Fee,
    Field,
}

#[derive(Clone, Copy, ValueEnum)]
enum PoolArg {
    PoolSize,
    CauseFunded,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Exit,
    Expected,
}

#[derive(Clone, Copy, ValueEnum)]
enum BasisArg {
    Fee,
    Field,
}

#[derive(Clone, Copy, ValueEnum)]
enum DenominatorArg {
    MaxBreakeven,
    Window,
    Full,
}

/// Parameters and data shared by every subcommand.
struct Session {
    params: ModelParams,
    sequence: StepSequence,
    model: GeometricModel,
}

impl Session {
    fn basis(&self, arg: BasisArg) -> Result<CauseBasis> {
        Ok(match arg {
            BasisArg::Fee => CauseBasis::fee_on_price(self.params.cause_fee_rate)?,
            BasisArg::Field => CauseBasis::CauseField,
        })
    }

    fn rule(&self, args: &RuleArgs) -> Result<BreakevenRule> {
        let cost = match args.cost {
            CostArg::Gross => CostBasis::GrossPrice,
            CostArg::Fee => CostBasis::Cause { basis: self.basis(BasisArg::Fee)? },
            CostArg::Field => CostBasis::Cause { basis: CauseBasis::CauseField },
        };
        let pool = match args.pool {
            PoolArg::PoolSize => PoolReference::PoolSizeBeforeEntry,
            PoolArg::CauseFunded => PoolReference::CauseFundedBeforeEntry,
        };
        Ok(BreakevenRule { cost, pool })
    }

    fn entries(&self, args: &EntryArgs) -> Result<Vec<EntryPoint>> {
        if args.entries.is_empty() {
            return Ok(self.params.schedule().entry_points(self.sequence.n_max())?);
        }
        Ok(EntryPoint::batch(&args.entries)?)
    }

    /// Table-driven breakevens, narrowed to `--entries` when any are given.
    fn threshold_breakevens(
        &self,
        table: &BreakevenThresholds,
        args: &EntryArgs,
    ) -> Result<Vec<BreakevenPoint>> {
        let mut points = resolve_from_thresholds(&self.sequence, table);
        if !args.entries.is_empty() {
            let wanted: Vec<u32> = EntryPoint::batch(&args.entries)?.iter().map(|e| e.n()).collect();
            points.retain(|p| wanted.contains(&p.entry_n));
        }
        Ok(points)
    }

    fn breakevens(&self, args: &EntryArgs) -> Result<Vec<BreakevenPoint>> {
        let rule = BreakevenRule::canonical(self.params.cause_fee_rate)?;
        let resolver = BreakevenResolver::new(&self.sequence, rule)?;
        Ok(resolver.resolve_all(&self.entries(args)?))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let g = &cli.global;

    let file_config = CliConfig::load(g.config.as_deref())?;
    let log_level = g.log_level.clone().unwrap_or_else(|| file_config.log_level.clone());
    let log_format = g.log_format.clone().unwrap_or_else(|| file_config.log_format.clone());
    init_logging(&log_level, &log_format);

    let mut params = file_config.params;
    if let Some(n) = g.n_max {
        params.n_max = n;
    }
    if let Some(p) = g.win_probability {
        params.win_probability = p;
    }
    if let Some(f) = g.fee_rate {
        params.cause_fee_rate = f;
    }
    params.validate().context("invalid model parameters")?;
    debug!(?params, "resolved parameters");

    let source = match &g.dataset {
        Some(path) => SequenceSource::Ingested(read_dataset(path)?),
        None => SequenceSource::Generated(params),
    };
    let sequence = source.load().context("failed to build step sequence")?;
    info!(n_max = sequence.n_max(), "sequence ready");

    let ctx = Session {
        model: GeometricModel::new(params.win_probability)?,
        params,
        sequence,
    };
    run(&ctx, &cli.command)
}

fn run(ctx: &Session, command: &Commands) -> Result<()> {
    let seq = &ctx.sequence;
    match command {
        Commands::Generate => emit(seq),
        Commands::Sample { max_points } => emit(&sample(seq, *max_points)?),
        Commands::Breakevens(args) => {
            let points = match &args.thresholds {
                Some(path) => ctx.threshold_breakevens(&load_thresholds(path)?, &args.entries)?,
                None => {
                    let resolver = BreakevenResolver::new(seq, ctx.rule(&args.rule)?)?;
                    resolver.resolve_all(&ctx.entries(&args.entries)?)
                }
            };
            emit(&points)
        }
        Commands::Risk(args) => emit(&analyze(
            seq,
            &ctx.entries(args)?,
            &ctx.model,
            ctx.params.cause_fee_rate,
        )?),
        Commands::Curve { max_steps, stride } => {
            let curve = ctx.model.curve(*max_steps, *stride)?;
            emit(&curve.iter().collect::<Vec<_>>())
        }
        Commands::Attribution(args) => {
            let mode = match args.mode {
                ModeArg::Exit => AttributionMode::BreakevenExit,
                ModeArg::Expected => AttributionMode::ExpectedValue { ceiling: args.ceiling },
            };
            let denominator = match args.denominator {
                DenominatorArg::MaxBreakeven => Denominator::ThroughMaxBreakeven,
                DenominatorArg::Window => Denominator::EntryWindow {
                    start: args.window_start,
                    end: args.window_end,
                },
                DenominatorArg::Full => Denominator::FullSequence,
            };
            let request = AttributionRequest { mode, basis: ctx.basis(args.basis)?, denominator };
            let points = ctx.breakevens(&args.entries)?;
            emit(&attribute_by_entry(seq, &points, &request, &ctx.model)?)
        }
        Commands::Compare(args) => {
            let first = args.first_entry.unwrap_or(ctx.params.first_investor_entry);
            let points = ctx.breakevens(&args.entries)?;
            emit(&compare_investor_vs_non_investor(seq, &points, first, ctx.basis(args.basis)?)?)
        }
        Commands::Scenarios(args) => {
            let compare = &args.compare;
            let first = compare.first_entry.unwrap_or(ctx.params.first_investor_entry);
            let scenarios = if args.scenarios.is_empty() {
                Scenario::ALL.to_vec()
            } else {
                args.scenarios.clone()
            };
            let points = ctx.breakevens(&compare.entries)?;
            emit(&generate_scenarios(
                seq,
                &points,
                first,
                &scenarios,
                &ctx.model,
                ctx.basis(compare.basis)?,
            )?)
        }
        Commands::FirstCohort(args) => {
            let points = ctx.breakevens(&args.entries)?;
            emit(&analyze_first_cohort(seq, &points, ctx.basis(args.basis)?)?)
        }
        Commands::Calculator { entry, confidence } => {
            let entry = EntryPoint::new(*entry)?;
            let Some(outcome) =
                confidence_outcome(seq, entry, *confidence, &ctx.model, ctx.params.cause_fee_rate)?
            else {
                bail!("entry {} is outside the sequence (1..={})", entry.n(), seq.n_max());
            };
            emit(&outcome)
        }
        Commands::ProfitLine { entry, rule } => {
            let resolver = BreakevenResolver::new(seq, ctx.rule(rule)?)?;
            emit(&resolver.profit_line(EntryPoint::new(*entry)?))
        }
    }
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn read_dataset(path: &Path) -> Result<Vec<StepRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))
}

fn load_thresholds(path: &Path) -> Result<BreakevenThresholds> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read thresholds {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid thresholds {}", path.display()))
}

/// Initialize tracing subscriber on stderr with the given level and format.
///
/// `RUST_LOG` takes precedence over `level_str` when set.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
