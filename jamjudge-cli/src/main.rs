mod config;
mod entries;
mod output;
mod store;

use anyhow::{Context, bail};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use jamjudge_core::{
    AppendOutcome, Comparison, ComparisonSource, EngineConfig, JudgingEngine, Outcome, RankingOptions,
    calculate_rankings_with_options, calculate_stats, check_vote_entries, comparisons_in_range,
};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::store::{JsonlStore, STORE_FILE_NAME};

#[derive(Parser)]
#[command(name = "jamjudge", version, about = "Pairwise judging and rankings for game jams")]
struct Cli {
    /// Path to config file (default: ~/.config/jamjudge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding comparisons.jsonl
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory holding <jam>.json / <jam>.txt entry lists
    #[arg(long, global = true)]
    entries_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a default config file at ~/.config/jamjudge/config.toml
    Init,
    /// Show the next pair for a judge to compare
    Pair(PairArgs),
    /// Record a judge's verdict on a pair
    Vote(VoteArgs),
    /// Show a judge's session progress
    Progress(JudgeArgs),
    /// Rank a jam's entries from all recorded comparisons
    Rankings(RankingsArgs),
}

#[derive(clap::Args)]
struct JudgeArgs {
    /// Jam slug (e.g. gj7)
    #[arg(long)]
    jam: String,

    /// Judge identifier
    #[arg(long)]
    judge: String,
}

#[derive(clap::Args)]
struct PairArgs {
    #[command(flatten)]
    judge: JudgeArgs,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
#[command(group(clap::ArgGroup::new("verdict").required(true).args(["winner", "tie", "skip"])))]
struct VoteArgs {
    #[command(flatten)]
    judge: JudgeArgs,

    /// Entry shown first
    #[arg(long)]
    entry_a: String,

    /// Entry shown second
    #[arg(long)]
    entry_b: String,

    /// ID of the preferred entry (must be entry A or entry B)
    #[arg(long)]
    winner: Option<String>,

    /// Neither entry is better
    #[arg(long)]
    tie: bool,

    /// Pass on this pair; it will not be offered to this judge again
    #[arg(long)]
    skip: bool,
}

#[derive(clap::Args)]
struct RankingsArgs {
    /// Jam slug (e.g. gj7)
    #[arg(long)]
    jam: String,

    /// Only use comparisons from this day on (YYYY-MM-DD, UTC)
    #[arg(long)]
    from: Option<String>,

    /// Only use comparisons up to the end of this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    to: Option<String>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

/// Config file merged with CLI flags (CLI wins).
struct Settings {
    data_dir: PathBuf,
    entries_dir: PathBuf,
    engine: EngineConfig,
}

impl Settings {
    fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = match cli.config.clone() {
            Some(path) => path,
            None => config::config_path()?,
        };
        let cfg = config::load_config(&config_path)?;

        let data_dir = match cli.data_dir.clone().or(cfg.data_dir) {
            Some(dir) => dir,
            None => config::default_data_dir()?,
        };
        let entries_dir = cli.entries_dir.clone()
            .or(cfg.entries_dir)
            .unwrap_or_else(|| data_dir.join("entries"));

        let session_size = cfg.session_size.unwrap_or(EngineConfig::default().session_size);
        if session_size == 0 {
            bail!("session_size must be at least 1 (in {})", config_path.display());
        }

        let defaults = RankingOptions::default();
        let iterations = cfg.iterations.unwrap_or(defaults.iterations);
        if iterations == 0 {
            bail!("iterations must be at least 1 (in {})", config_path.display());
        }
        if let Some(tolerance) = cfg.convergence_tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                bail!("convergence_tolerance must be a positive number (in {})", config_path.display());
            }
        }

        Ok(Settings {
            data_dir,
            entries_dir,
            engine: EngineConfig {
                session_size,
                ranking: RankingOptions { iterations, convergence_tolerance: cfg.convergence_tolerance },
            },
        })
    }

    fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    fn open_engine(&self) -> anyhow::Result<JudgingEngine<JsonlStore>> {
        let store = JsonlStore::open(&self.store_path())?;
        Ok(JudgingEngine::new(store, self.engine.clone()))
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("JAMJUDGE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match &cli.command {
        Commands::Init => run_init(cli.config.clone()),
        Commands::Pair(args) => run_pair(&Settings::resolve(&cli)?, args),
        Commands::Vote(args) => run_vote(&Settings::resolve(&cli)?, args),
        Commands::Progress(args) => run_progress(&Settings::resolve(&cli)?, args),
        Commands::Rankings(args) => run_rankings(&Settings::resolve(&cli)?, args),
    }
}

fn run_init(config: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match config {
        Some(path) => path,
        None => config::config_path()?,
    };
    config::create_default_config(&path)?;
    println!("Created config at {}", path.display());
    println!("Edit it to set your data directory, session size, etc.");
    Ok(())
}

fn run_pair(settings: &Settings, args: &PairArgs) -> anyhow::Result<()> {
    let JudgeArgs { jam, judge } = &args.judge;
    let entries = entries::load_entries(&settings.entries_dir, jam)?;
    let engine = settings.open_engine()?;

    let prompt = engine.next_prompt(jam, judge, &entries)?;

    if args.json {
        output::print_prompt_json(&prompt)
    } else {
        output::print_prompt(&prompt);
        Ok(())
    }
}

/// Turn the verdict flags into an outcome oriented toward entry A.
fn outcome_from_args(args: &VoteArgs) -> anyhow::Result<Outcome> {
    if args.skip {
        return Ok(Outcome::Skipped);
    }
    if args.tie {
        return Ok(Outcome::Tie);
    }
    match args.winner.as_deref() {
        Some(w) if w == args.entry_a => Ok(Outcome::Decided(1.0)),
        Some(w) if w == args.entry_b => Ok(Outcome::Decided(0.0)),
        Some(w) => bail!("--winner \"{w}\" must be either --entry-a or --entry-b"),
        None => bail!("Pass one of --winner, --tie, or --skip"),
    }
}

fn run_vote(settings: &Settings, args: &VoteArgs) -> anyhow::Result<()> {
    let outcome = outcome_from_args(args)?;
    let VoteArgs { judge: JudgeArgs { jam, judge }, entry_a, entry_b, .. } = args;

    let entries = entries::load_entries(&settings.entries_dir, jam)?;
    check_vote_entries(&entries, entry_a, entry_b)?;

    let comparison = Comparison::record(
        jam.as_str(),
        judge.as_str(),
        entry_a,
        entry_b,
        outcome,
        Utc::now().timestamp_millis(),
    )?;

    let mut engine = settings.open_engine()?;
    match engine.store_mut().append(comparison)? {
        AppendOutcome::Recorded => {
            info!(jam = %jam, judge = %judge, entry_a = %entry_a, entry_b = %entry_b, ?outcome, "vote recorded");
        }
        AppendOutcome::Duplicate => {
            warn!(jam = %jam, judge = %judge, entry_a = %entry_a, entry_b = %entry_b, "duplicate vote rejected");
            bail!("Vote not recorded: you already judged this pair. Run `jamjudge pair` for a new one.");
        }
    }

    let progress = engine.session_progress(jam, judge)?;
    println!("Vote recorded.");
    if progress.is_session_boundary() {
        println!("Session {} complete!", progress.sessions_completed);
    }
    output::print_progress(&progress);
    Ok(())
}

fn run_progress(settings: &Settings, args: &JudgeArgs) -> anyhow::Result<()> {
    let entries = entries::load_entries(&settings.entries_dir, &args.jam)?;
    let engine = settings.open_engine()?;

    let progress = engine.session_progress(&args.jam, &args.judge)?;
    output::print_progress(&progress);
    if engine.has_exhausted_all_pairs(&args.jam, &args.judge, &entries)? {
        println!("All pairs judged.");
    }
    Ok(())
}

/// Start of `date` in UTC, as epoch milliseconds.
fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Last millisecond of `date` in UTC.
fn day_end_millis(date: NaiveDate) -> anyhow::Result<i64> {
    let Some(next) = date.checked_add_days(Days::new(1)) else {
        bail!("Date {date} is out of range");
    };
    Ok(day_start_millis(next) - 1)
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date \"{value}\": expected YYYY-MM-DD"))
}

/// Inclusive millisecond window for `--from` / `--to`. `--to` covers its whole day.
fn date_window(from: Option<&str>, to: Option<&str>) -> anyhow::Result<(Option<i64>, Option<i64>)> {
    let from_ms = from.map(parse_date).transpose()?.map(day_start_millis);
    let to_ms = to.map(parse_date).transpose()?.map(day_end_millis).transpose()?;

    if let (Some(f), Some(t)) = (from_ms, to_ms) {
        if f > t {
            bail!("--from must not be after --to");
        }
    }
    Ok((from_ms, to_ms))
}

fn run_rankings(settings: &Settings, args: &RankingsArgs) -> anyhow::Result<()> {
    let entries = entries::load_entries(&settings.entries_dir, &args.jam)?;
    if entries.is_empty() {
        println!("No entries found for jam: {}", args.jam);
        return Ok(());
    }

    let store = JsonlStore::open(&settings.store_path())?;
    let (from_ms, to_ms) = date_window(args.from.as_deref(), args.to.as_deref())?;
    let comparisons = comparisons_in_range(&store.comparisons_for_jam(&args.jam)?, from_ms, to_ms);

    let rankings = calculate_rankings_with_options(&entries, &comparisons, &settings.engine.ranking)?;
    let stats = calculate_stats(&entries, &comparisons);

    if args.json {
        output::print_json(&args.jam, &rankings, &stats)
    } else {
        let window = (args.from.is_some() || args.to.is_some()).then(|| {
            format!(
                "{} to {}",
                args.from.as_deref().unwrap_or("beginning"),
                args.to.as_deref().unwrap_or("now"),
            )
        });
        output::print_table(&args.jam, window.as_deref(), &rankings, &stats);
        Ok(())
    }
}
