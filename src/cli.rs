//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Channel;
use clap::Parser;
use std::path::PathBuf;

/// PhasePlot - trace and relative-phase plots for sensor logs
///
/// Reads CSV logs with the columns agent_id, chunk_id, time_pc_sec_abs,
/// a0, a1 and a2, and renders either the raw channel traces or the
/// phase difference of every agent against the lowest agent id.
///
/// Examples:
///   phaseplot logs/ --plot traces -o traces.svg
///   phaseplot run1.csv run2.csv -o phase.png
///   phaseplot logs/ --export phase.json
///   phaseplot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV log files or directories containing them
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Which chart to draw
    #[arg(long, default_value = "relative-phase", value_name = "KIND")]
    pub plot: PlotKind,

    /// Output image path (.svg or .png)
    ///
    /// Defaults to traces.svg or relative_phase.svg depending on --plot.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Channel holding the modulo-256 phase counter
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Option<Channel>,

    /// Spacing of the common resampling grid in seconds
    #[arg(long, value_name = "SECS")]
    pub step: Option<f64>,

    /// Chart width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Chart height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Maximum number of log files to load
    #[arg(long, value_name = "COUNT")]
    pub max_files: Option<usize>,

    /// Also write the relative phase series to this file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Format of the --export file
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: ExportFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .phaseplot.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "PHASEPLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the files that would be loaded and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .phaseplot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Chart to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlotKind {
    /// Raw a0/a1/a2 traces per agent and chunk
    Traces,
    /// Phase difference against the reference agent (default)
    #[default]
    RelativePhase,
}

impl PlotKind {
    /// Output file used when --output is not given.
    pub fn default_output(&self) -> &'static str {
        match self {
            PlotKind::Traces => "traces.svg",
            PlotKind::RelativePhase => "relative_phase.svg",
        }
    }
}

/// Output format for the series export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// CSV format
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective output image path.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.plot.default_output()))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(step) = self.step {
            if !step.is_finite() || step <= 0.0 {
                return Err("Step must be a positive number of seconds".to_string());
            }
        }

        if self.width == Some(0) || self.height == Some(0) {
            return Err("Chart width and height must be at least 1 pixel".to_string());
        }

        if self.max_files == Some(0) {
            return Err("Max files must be at least 1".to_string());
        }

        if self.export.is_some() && self.plot == PlotKind::Traces {
            return Err("--export is only available with --plot relative-phase".to_string());
        }

        if let Some(ref output) = self.output {
            if output.file_name().is_none() {
                return Err(format!("Output path has no file name: {}", output.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
