use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use casper_core::{
    BatchSummary, Color, Decision, DisplayBuilder, DisplayGeometry, RunConfig, Shape, run_batch,
    run_trial,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

/// Seed applied when neither --seed nor the config file provides one.
const FALLBACK_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "casper", about = "CASPER visual search batch driver")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single trial and print its result
    Run {
        #[command(flatten)]
        display: DisplayArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Record and print the per-item event trace
        #[arg(long)]
        trace: bool,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a batch of trials and print summary statistics
    Batch {
        #[command(flatten)]
        display: DisplayArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Number of trials
        #[arg(long, default_value_t = 100)]
        trials: usize,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sweep distractor counts and tabulate present/absent RT curves
    Sweep {
        #[command(flatten)]
        config: ConfigArgs,

        /// Target stimulus as color:shape
        #[arg(long, default_value = "red:vertical")]
        target: String,

        /// Distractor stimulus as color:shape
        #[arg(long, default_value = "green:vertical")]
        distractor: String,

        /// Comma-separated distractor counts
        #[arg(long, value_delimiter = ',', default_value = "4,8,16")]
        set_sizes: Vec<usize>,

        /// Trials per cell
        #[arg(long, default_value_t = 100)]
        trials: usize,

        /// Emit the sweep as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct DisplayArgs {
    /// Target stimulus as color:shape
    #[arg(long, default_value = "red:vertical")]
    target: String,

    /// Target-absent trial (the target stimulus is omitted)
    #[arg(long)]
    absent: bool,

    /// Distractor groups as color:shape=count, comma separated
    #[arg(long, value_delimiter = ',', default_value = "green:vertical=5")]
    distractors: Vec<String>,

    /// Restrict the feature metric to dimensions the display disagrees on
    #[arg(long)]
    relevance: bool,

    /// Scatter items over the default display geometry with this seed
    #[arg(long)]
    layout_seed: Option<u64>,
}

#[derive(Args)]
struct ConfigArgs {
    /// RunConfig TOML file; engine defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file; default 42 if neither sets one)
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run {
            display,
            config,
            trace,
            json,
        } => cmd_run(display, config, *trace, *json),
        Commands::Batch {
            display,
            config,
            trials,
            json,
        } => cmd_batch(display, config, *trials, *json),
        Commands::Sweep {
            config,
            target,
            distractor,
            set_sizes,
            trials,
            json,
        } => cmd_sweep(config, target, distractor, set_sizes, *trials, *json),
    }
}

// ---------------------------------------------------------------------------
// Display and config assembly
// ---------------------------------------------------------------------------

/// Parse "color:shape" into lexicon stimuli.
fn parse_stimulus(spec: &str) -> Result<(Color, Shape)> {
    let Some((color, shape)) = spec.split_once(':') else {
        bail!("stimulus '{spec}' is not of the form color:shape");
    };
    Ok((Color::parse(color)?, Shape::parse(shape)?))
}

/// Parse "color:shape=count" (count defaults to 1).
fn parse_distractor_group(spec: &str) -> Result<(Color, Shape, usize)> {
    let (stimulus, count) = match spec.split_once('=') {
        Some((stimulus, count)) => (
            stimulus,
            count
                .parse::<usize>()
                .with_context(|| format!("bad count in distractor '{spec}'"))?,
        ),
        None => (spec, 1),
    };
    let (color, shape) = parse_stimulus(stimulus)?;
    Ok((color, shape, count))
}

fn build_display(args: &DisplayArgs) -> Result<casper_core::Display> {
    let mut builder = DisplayBuilder::new();
    if !args.absent {
        let (color, shape) = parse_stimulus(&args.target)?;
        builder = builder.target(color, shape);
    }
    for spec in &args.distractors {
        let (color, shape, count) = parse_distractor_group(spec)?;
        builder = builder.distractors(color, shape, count);
    }
    if args.relevance {
        builder = builder.relevance_weighting(1.0, 0.0);
    }
    if let Some(seed) = args.layout_seed {
        builder = builder.layout(DisplayGeometry::default(), seed);
    }
    builder.build().context("failed to build display")
}

fn load_config(args: &ConfigArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        None => RunConfig::default(),
        Some(path) => read_config_file(path)?,
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    } else if config.seed.is_none() {
        config.seed = Some(FALLBACK_SEED);
    }
    tracing::debug!("run config: {config:?}");
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_run(display_args: &DisplayArgs, config_args: &ConfigArgs, trace: bool, json: bool) -> Result<()> {
    let display = build_display(display_args)?;
    let mut config = load_config(config_args)?;
    config.record_trace = config.record_trace || trace;

    let result = run_trial(&display, &config).context("trial failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("decision:   {}", decision_str(result.decision));
    println!("elapsed:    {:.1} ticks", result.elapsed);
    match result.found {
        Some(item) => println!("found:      item {item}"),
        None => println!("found:      -"),
    }
    println!("parallel:   {} rejections", result.parallel_rejections);
    println!("serial:     {} evaluations", result.serial_evaluations);
    println!("eyes:       {} movements", result.eye_movements);

    if let Some(events) = &result.trace {
        println!("trace:");
        for event in events {
            println!("  t={:<8.1} item {:<3} {:?}", event.time, event.item, event.kind);
        }
    }
    Ok(())
}

fn cmd_batch(
    display_args: &DisplayArgs,
    config_args: &ConfigArgs,
    trials: usize,
    json: bool,
) -> Result<()> {
    let display = build_display(display_args)?;
    let config = load_config(config_args)?;

    let item_count = display.len();
    tracing::info!("running {trials} trials over {} items", item_count);
    let batch = run_batch(&display, &config, trials).context("batch failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&batch.summary)?);
        return Ok(());
    }
    print_summary(&batch.summary);
    Ok(())
}

#[derive(Serialize)]
struct SweepRow {
    set_size: usize,
    present: BatchSummary,
    absent: BatchSummary,
}

fn cmd_sweep(
    config_args: &ConfigArgs,
    target: &str,
    distractor: &str,
    set_sizes: &[usize],
    trials: usize,
    json: bool,
) -> Result<()> {
    let config = load_config(config_args)?;
    let (target_color, target_shape) = parse_stimulus(target)?;
    let (distractor_color, distractor_shape) = parse_stimulus(distractor)?;

    let mut rows = Vec::new();
    for &set_size in set_sizes {
        let present = DisplayBuilder::new()
            .target(target_color, target_shape)
            .distractors(distractor_color, distractor_shape, set_size)
            .build()?;
        let absent = DisplayBuilder::new()
            .distractors(distractor_color, distractor_shape, set_size)
            .build()?;

        tracing::info!("set size {set_size}: {trials} trials per cell");
        rows.push(SweepRow {
            set_size,
            present: run_batch(&present, &config, trials)?.summary,
            absent: run_batch(&absent, &config, trials)?.summary,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:>8}  {:>12} {:>10}  {:>12} {:>10}",
        "set size", "present RT", "esc rate", "absent RT", "esc rate"
    );
    for row in &rows {
        println!(
            "{:>8}  {:>12.1} {:>9.0}%  {:>12.1} {:>9.0}%",
            row.set_size,
            row.present.mean_rt,
            row.present.escalation_rate * 100.0,
            row.absent.mean_rt,
            row.absent.escalation_rate * 100.0,
        );
    }
    Ok(())
}

fn decision_str(decision: Decision) -> &'static str {
    match decision {
        Decision::TargetFound => "target found",
        Decision::TargetAbsent => "target absent",
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("trials:       {}", summary.trials);
    println!("mean RT:      {:.2} ticks", summary.mean_rt);
    println!("sd RT:        {:.2}", summary.sd_rt);
    println!("accuracy:     {:.1}%", summary.accuracy * 100.0);
    println!("escalations:  {:.1}%", summary.escalation_rate * 100.0);
    println!("parallel rej: {:.2}", summary.mean_parallel_rejections);
    println!("serial evals: {:.2}", summary.mean_serial_evaluations);
}
