//! PhasePlot - trace and relative-phase plots for multi-agent sensor logs
//!
//! A CLI tool that loads CSV logs (agent_id, chunk_id, time_pc_sec_abs,
//! a0, a1, a2) and draws either the raw channel traces or the phase
//! difference of every agent against the reference agent.
//!
//! Exit codes:
//!   0 - Success, or nothing to plot (no files, no rows, no overlap)
//!   1 - Runtime error (bad config, unwritable output, etc.)

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod phase;
mod render;
mod report;

use anyhow::{Context, Result};
use cli::{Args, ExportFormat, PlotKind};
use config::{Config, DEFAULT_CONFIG_FILE};
use loader::{DiscoveryConfig, FileDiscovery, LoadOutcome};
use models::LogRow;
use phase::{AlignError, RelativePhaseComputer};
use render::ChartSize;
use report::PhaseReport;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging starts because it can raise the level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("PhasePlot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    log_config_source(&source);

    match run(&args, &config) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Plotting failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .phaseplot.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the phase channel, grid step and chart size.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, reshape and plot. Returns the process exit code.
fn run(args: &Args, config: &Config) -> Result<i32> {
    let start_time = Instant::now();

    if args.inputs.is_empty() {
        info!("No files provided to plot.");
        return Ok(0);
    }

    let discovery = FileDiscovery::new(DiscoveryConfig::from(&config.loader));
    let files = discovery.discover(&args.inputs);

    if args.dry_run {
        return handle_dry_run(&files);
    }

    debug!("Plotting from files:");
    for file in &files {
        debug!("  - {}", file.display());
    }

    let outcomes = loader::load_files(&files, !args.quiet);
    let rows = loader::collect_rows(&outcomes);
    let skipped = outcomes.iter().filter(|o| !o.is_loaded()).count();

    if rows.is_empty() {
        info!("No valid data to plot.");
        return Ok(0);
    }

    let summary = analysis::summarize(&rows);
    info!(
        "Loaded {} rows from {} files ({} skipped): {} agents, {} chunks, {:.2}s span",
        summary.rows,
        outcomes.len() - skipped,
        skipped,
        summary.agents,
        summary.chunks,
        summary.span_seconds()
    );

    let output = args.output_path();
    let size = ChartSize::from(&config.plot);

    let exit_code = match args.plot {
        PlotKind::Traces => {
            render::render_traces(&output, &rows, size)
                .with_context(|| format!("Failed to render {}", output.display()))?;
            println!("📈 Trace chart saved to: {}", output.display());
            0
        }
        PlotKind::RelativePhase => run_relative_phase(args, config, &outcomes, &rows, &output)?,
    };

    debug!("Finished in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(exit_code)
}

/// Compute, plot and optionally export the relative phase.
fn run_relative_phase(
    args: &Args,
    config: &Config,
    outcomes: &[LoadOutcome],
    rows: &[LogRow],
    output: &Path,
) -> Result<i32> {
    let channel = config.phase.channel;
    let series = analysis::group_by_agent(rows, channel);
    let computer = RelativePhaseComputer::new(config.phase.step_seconds);

    let phase = match computer.compute(&series) {
        Ok(phase) => phase,
        Err(AlignError::NoOverlap { start, end }) => {
            info!(
                "No overlapping time range for agents. min_time={}, max_time={}",
                start, end
            );
            return Ok(0);
        }
        Err(e) => return Err(e).context("Failed to align agent series"),
    };

    if phase.series.is_empty() {
        warn!(
            "Only the reference agent {} is present; the chart will be empty",
            phase.reference
        );
    }

    info!(
        "Relative phase on channel {}: reference agent {}, {} grid points, {} gaps",
        channel,
        phase.reference,
        phase.grid.len(),
        phase.gap_count()
    );

    render::render_relative_phase(output, &phase, ChartSize::from(&config.plot))
        .with_context(|| format!("Failed to render {}", output.display()))?;
    println!("📈 Relative phase chart saved to: {}", output.display());

    if let Some(ref export_path) = args.export {
        let input_files = outcomes
            .iter()
            .filter(|o| o.is_loaded())
            .map(|o| o.path().display().to_string())
            .collect();
        let skipped = outcomes.iter().filter(|o| !o.is_loaded()).count();
        let report = PhaseReport::new(&phase, channel, input_files, skipped, rows.len());

        let content = match args.format {
            ExportFormat::Json => report::generate_json_report(&report)?,
            ExportFormat::Csv => report::generate_csv_report(&report),
        };
        std::fs::write(export_path, content)
            .with_context(|| format!("Failed to write export to {}", export_path.display()))?;
        println!(
            "💾 Series exported to: {} ({} gaps)",
            export_path.display(),
            report.gap_count()
        );
    }

    Ok(0)
}

/// Handle --dry-run: list discovered files, exit.
fn handle_dry_run(files: &[PathBuf]) -> Result<i32> {
    println!("\n🔍 Dry run: discovering log files (nothing is loaded)...\n");

    if files.is_empty() {
        println!("   No matching log files found.");
    } else {
        println!("   Found {} files that would be loaded:\n", files.len());
        for file in files {
            let marker = if file.is_file() { "📄" } else { "❔" };
            println!("     {} {}", marker, file.display());
        }
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Where the effective configuration came from.
#[derive(Debug)]
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    BuiltIn,
    /// The default file exists but could not be parsed.
    Rejected(String),
}

/// Load configuration from file or use defaults.
///
/// Nothing is logged here; see [`log_config_source`].
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::BuiltIn)),
        Err(e) => Ok((Config::default(), ConfigSource::Rejected(format!("{:#}", e)))),
    }
}

fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::DefaultFile => info!("Loaded default config from {}", DEFAULT_CONFIG_FILE),
        ConfigSource::BuiltIn => debug!("No config file found, using defaults"),
        ConfigSource::Rejected(reason) => warn!("Failed to load config: {}", reason),
    }
}
