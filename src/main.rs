use analytics::{AnalyticsEngine, Statistics, StdDevBasis};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use configuration::{Config, WindowDefaults};
use core_types::{EntityKind, Resolution};
use database::connection::{connect, run_migrations};
use database::repository::PnlRepository;
use engine::{Window, compute_statistics};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use windowing::{BespokeWindow, WindowDefinition, generators};

/// The main entry point for the Meridian analysis application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Run with built-in defaults when no config.toml is present.
    let config = configuration::load_config().unwrap_or_else(|err| {
        debug!(%err, "no usable config.toml, using defaults");
        Config::default()
    });

    match cli.command {
        Commands::Programs => handle_programs().await,
        Commands::GenerateWindows(args) => handle_generate_windows(args, &config).await,
        Commands::Stats(args) => handle_stats(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance statistics over arbitrary historical windows of
/// trading-return series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List trading programs and benchmark markets in the catalog.
    Programs,
    /// Generate a window-definition set and print or export it.
    GenerateWindows(GenerateWindowsArgs),
    /// Compute per-window statistics for programs and benchmarks.
    Stats(StatsArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Non-overlapping, aligned to calendar-year multiples.
    Snapped,
    /// Non-overlapping, starting exactly at the span start.
    Sequential,
    /// Non-overlapping, walked backwards from the span end.
    Reverse,
    /// Overlapping, rolling forward by the slide interval.
    Rolling,
    /// Overlapping, trailing windows anchored at the span end.
    Trailing,
    /// Hand-picked periods from a JSON file.
    Bespoke,
}

#[derive(Args)]
struct WindowArgs {
    /// Windowing policy.
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// First date of the span (format: YYYY-MM-DD). Defaults to the
    /// earliest data of the requested programs.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date of the span (format: YYYY-MM-DD). Defaults to the latest
    /// data of the requested programs.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Window length in years (snapped and reverse policies).
    #[arg(long)]
    length_years: Option<u32>,

    /// Window length in months (sequential, rolling and trailing policies).
    #[arg(long)]
    length_months: Option<u32>,

    /// Slide interval in months (rolling and trailing policies).
    #[arg(long)]
    slide_months: Option<u32>,

    /// Reverse policy: extend an incomplete earliest window by borrowing
    /// from its neighbor, tagging the overlap.
    #[arg(long)]
    borrow: bool,

    /// Program ids to include (comma-separated).
    #[arg(long, value_delimiter = ',')]
    programs: Vec<i64>,

    /// Benchmark market ids to include (comma-separated).
    #[arg(long, value_delimiter = ',')]
    benchmarks: Vec<i64>,

    /// Name for the generated window set.
    #[arg(long)]
    window_set: Option<String>,

    /// Bespoke policy: JSON file of {name, start_date, end_date} periods.
    #[arg(long)]
    bespoke_file: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateWindowsArgs {
    #[command(flatten)]
    window: WindowArgs,

    /// Also write the definitions to a JSON file.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct StatsArgs {
    #[command(flatten)]
    window: WindowArgs,

    /// Load window definitions from a JSON file instead of generating them.
    #[arg(long)]
    windows_file: Option<PathBuf>,

    /// Skip windows whose participants lack complete monthly coverage.
    #[arg(long)]
    require_complete: bool,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn connect_repo() -> anyhow::Result<PnlRepository> {
    let pool = connect().await?;
    run_migrations(&pool).await?;
    Ok(PnlRepository::new(pool))
}

/// Prints the program and benchmark catalogs.
async fn handle_programs() -> anyhow::Result<()> {
    let repo = connect_repo().await?;

    let programs = repo.list_programs().await?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Manager", "Program", "Primary Market"]);
    for p in &programs {
        table.add_row(vec![
            p.id.to_string(),
            p.manager_name.clone(),
            p.program_name.clone(),
            p.primary_return_market_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        ]);
    }
    println!("Programs:\n{table}");

    let benchmarks = repo.list_benchmark_markets().await?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Benchmark Market"]);
    for m in &benchmarks {
        table.add_row(vec![m.id.to_string(), m.market_name.clone()]);
    }
    println!("Benchmarks:\n{table}");

    Ok(())
}

/// Generates a window-definition set, prints it and optionally exports it.
async fn handle_generate_windows(args: GenerateWindowsArgs, config: &Config) -> anyhow::Result<()> {
    let windows = build_window_set(&args.window, &config.windows).await?;
    info!("generated {} window definitions", windows.len());

    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Start", "End", "Borrowed From"]);
    for w in &windows {
        table.add_row(vec![
            w.index.map_or_else(String::new, |i| i.to_string()),
            w.name.clone().unwrap_or_default(),
            w.start_date.to_string(),
            w.end_date.to_string(),
            w.borrowed_data_start_date
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
        ]);
    }
    println!("{table}");

    if let Some(path) = args.out {
        fs::write(&path, serde_json::to_string_pretty(&windows)?)?;
        info!("wrote window set to {}", path.display());
    }

    Ok(())
}

/// One output row of the stats command: a (window, entity) pair.
#[derive(Debug, Serialize)]
struct StatRow {
    window: String,
    window_set: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    entity_kind: EntityKind,
    entity_id: i64,
    data_is_complete: bool,
    borrowed_data_start_date: Option<NaiveDate>,
    statistics: Statistics,
}

/// Computes statistics for every (window, entity) pair and renders them.
async fn handle_stats(args: StatsArgs, config: &Config) -> anyhow::Result<()> {
    let repo = connect_repo().await?;

    let definitions = match &args.windows_file {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let definitions: Vec<WindowDefinition> = serde_json::from_str(&raw)?;
            for def in &definitions {
                def.validate()?;
            }
            definitions
        }
        None => build_window_set_with(&repo, &args.window, &config.windows).await?,
    };

    let analytics_engine = AnalyticsEngine::with_nav_base(config.analysis.nav_base);

    let progress = ProgressBar::new(definitions.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} windows {msg}")?
            .progress_chars("#>-"),
    );

    let mut rows = Vec::new();
    for definition in definitions {
        let mut window = Window::new(definition, repo.clone());
        let complete = window.data_is_complete().await?;
        if args.require_complete && !complete {
            debug!(window = ?window.definition.name, "skipping incomplete window");
            progress.inc(1);
            continue;
        }

        let entities: Vec<(i64, EntityKind)> = window
            .definition
            .program_ids
            .iter()
            .map(|&id| (id, EntityKind::Program))
            .chain(
                window
                    .definition
                    .benchmark_ids
                    .iter()
                    .map(|&id| (id, EntityKind::Benchmark)),
            )
            .collect();

        for (entity_id, kind) in entities {
            let statistics =
                compute_statistics(&analytics_engine, &mut window, entity_id, kind).await?;
            rows.push(StatRow {
                window: window
                    .definition
                    .name
                    .clone()
                    .unwrap_or_else(|| window.definition.start_date.to_string()),
                window_set: window.definition.window_set.clone(),
                start_date: window.definition.start_date,
                end_date: window.definition.end_date,
                entity_kind: kind,
                entity_id,
                data_is_complete: complete,
                borrowed_data_start_date: window.definition.borrowed_data_start_date,
                statistics,
            });
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_stats_table(&rows);
    }

    Ok(())
}

fn print_stats_table(rows: &[StatRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Window", "Entity", "Complete", "Months", "Mean", "Median", "Std Dev", "Cum (comp)",
        "Cum (simple)", "Max DD %", "Max DD $", "CAGR",
    ]);

    let mut monthly_fallback_seen = false;
    for row in rows {
        let s = &row.statistics;
        let std_dev_cell = match s.std_dev_basis {
            StdDevBasis::AnnualizedDaily => fmt_pct(s.std_dev),
            StdDevBasis::UnannualizedMonthly => {
                monthly_fallback_seen = true;
                format!("{}*", fmt_pct(s.std_dev))
            }
        };
        table.add_row(vec![
            row.window.clone(),
            format!("{} {}", row.entity_kind, row.entity_id),
            if row.data_is_complete { "yes" } else { "no" }.to_string(),
            s.count.to_string(),
            fmt_pct(s.mean),
            fmt_pct(s.median),
            std_dev_cell,
            fmt_pct(s.cumulative_return_compounded),
            fmt_pct(s.cumulative_return_simple),
            fmt_pct(s.max_drawdown_compounded),
            fmt_currency(s.max_drawdown_simple),
            fmt_pct(s.cagr),
        ]);
    }

    println!("{table}");
    if monthly_fallback_seen {
        println!("* std dev from monthly returns only, not annualized");
    }
}

fn fmt_pct(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:+.2}%", value * 100.0)
    }
}

fn fmt_currency(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:+.0}")
    }
}

// ==============================================================================
// Window-Set Construction
// ==============================================================================

/// Builds a window set, connecting to the database only when the date span
/// has to be discovered from the data.
async fn build_window_set(
    args: &WindowArgs,
    defaults: &WindowDefaults,
) -> anyhow::Result<Vec<WindowDefinition>> {
    let policy = required_policy(args)?;
    if policy == Policy::Bespoke || (args.from.is_some() && args.to.is_some()) {
        generate_definitions(args, defaults, args.from, args.to)
    } else {
        let repo = connect_repo().await?;
        build_window_set_with(&repo, args, defaults).await
    }
}

async fn build_window_set_with(
    repo: &PnlRepository,
    args: &WindowArgs,
    defaults: &WindowDefaults,
) -> anyhow::Result<Vec<WindowDefinition>> {
    let policy = required_policy(args)?;
    if policy == Policy::Bespoke {
        return generate_definitions(args, defaults, args.from, args.to);
    }
    let (from, to) = resolve_span(repo, args).await?;
    generate_definitions(args, defaults, Some(from), Some(to))
}

fn required_policy(args: &WindowArgs) -> anyhow::Result<Policy> {
    args.policy
        .ok_or_else(|| anyhow::anyhow!("--policy is required unless --windows-file is given"))
}

/// Fills missing span bounds from the programs' actual data coverage,
/// preferring daily records and falling back to monthly-only programs.
async fn resolve_span(
    repo: &PnlRepository,
    args: &WindowArgs,
) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        return Ok((from, to));
    }

    let mut earliest: Option<NaiveDate> = None;
    let mut latest: Option<NaiveDate> = None;
    for &program_id in &args.programs {
        let range = match repo.program_data_range(program_id, Resolution::Daily).await? {
            Some(range) => Some(range),
            None => {
                repo.program_data_range(program_id, Resolution::Monthly)
                    .await?
            }
        };
        if let Some((min_date, max_date)) = range {
            earliest = Some(earliest.map_or(min_date, |e| e.min(min_date)));
            latest = Some(latest.map_or(max_date, |l| l.max(max_date)));
        }
    }

    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        anyhow::bail!(
            "no data found for the requested programs; supply --from and --to explicitly"
        );
    };
    Ok((args.from.unwrap_or(earliest), args.to.unwrap_or(latest)))
}

fn generate_definitions(
    args: &WindowArgs,
    defaults: &WindowDefaults,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<Vec<WindowDefinition>> {
    let policy = required_policy(args)?;
    let length_years = args.length_years.unwrap_or(defaults.length_years);
    let length_months = args.length_months.unwrap_or(defaults.length_months);
    let slide_months = args.slide_months.unwrap_or(defaults.slide_months);
    let window_set = args.window_set.as_deref();

    if policy == Policy::Bespoke {
        let path = args
            .bespoke_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("--bespoke-file is required for the bespoke policy"))?;
        let specs: Vec<BespokeWindow> = serde_json::from_str(&fs::read_to_string(path)?)?;
        return Ok(generators::bespoke(
            &specs,
            &args.programs,
            &args.benchmarks,
            window_set,
        )?);
    }

    let (Some(from), Some(to)) = (from, to) else {
        anyhow::bail!("a date span is required; supply --from and --to");
    };

    let windows = match policy {
        Policy::Snapped => generators::non_overlapping_snapped(
            from,
            to,
            length_years,
            &args.programs,
            &args.benchmarks,
            window_set,
        )?,
        Policy::Sequential => generators::non_overlapping_sequential(
            from,
            to,
            length_months,
            &args.programs,
            &args.benchmarks,
            window_set,
        )?,
        Policy::Reverse => generators::non_overlapping_reverse(
            from,
            to,
            length_years,
            &args.programs,
            &args.benchmarks,
            window_set,
            args.borrow,
        )?,
        Policy::Rolling => generators::overlapping_rolling(
            from,
            to,
            length_months,
            slide_months,
            &args.programs,
            &args.benchmarks,
            window_set,
        )?,
        Policy::Trailing => generators::overlapping_trailing(
            to,
            from,
            length_months,
            slide_months,
            &args.programs,
            &args.benchmarks,
            window_set,
        )?,
        Policy::Bespoke => unreachable!("handled above"),
    };
    Ok(windows)
}
