//! Log file loading.
//!
//! Every input file produces a [`LoadOutcome`]: either the rows it
//! contained or the reason it was skipped. A bad file never aborts a run.

pub mod discovery;

pub use discovery::{DiscoveryConfig, FileDiscovery};

use crate::models::{AgentId, ChunkId, LogRow, REQUIRED_COLUMNS};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read};
use std::str::FromStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a file contributed no rows.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found")]
    NotFound,

    #[error("file unreadable: {0}")]
    Unreadable(#[from] io::Error),

    #[error("missing required columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("malformed CSV: {0}")]
    Malformed(String),
}

/// Result of loading one file.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        path: PathBuf,
        rows: Vec<LogRow>,
        /// Rows dropped because they failed to parse.
        skipped_rows: usize,
    },
    Skipped {
        path: PathBuf,
        reason: LoadError,
    },
}

impl LoadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            LoadOutcome::Loaded { path, .. } | LoadOutcome::Skipped { path, .. } => path,
        }
    }

    pub fn rows(&self) -> &[LogRow] {
        match self {
            LoadOutcome::Loaded { rows, .. } => rows,
            LoadOutcome::Skipped { .. } => &[],
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Parse log rows from any reader.
///
/// Returns the rows and the number of malformed rows that were skipped.
pub fn read_rows<R: Read>(mut reader: R) -> Result<(Vec<LogRow>, usize), LoadError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_rows(&text)
}

/// Parse CSV text. Columns are found by header name; extra columns are ignored.
pub fn parse_rows(text: &str) -> Result<(Vec<LogRow>, usize), LoadError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| LoadError::Malformed("missing header line".to_string()))?;

    let mut col_idx: HashMap<&str, usize> = HashMap::new();
    for (i, name) in header.split(',').enumerate() {
        col_idx.entry(name.trim()).or_insert(i);
    }

    let mut indices = [0usize; REQUIRED_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        match col_idx.get(name) {
            Some(&i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(LoadError::SchemaMismatch { missing });
    }

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (line_no, line) in lines.enumerate() {
        let cols: Vec<&str> = line.split(',').collect();
        match parse_row(&cols, &indices) {
            Ok(row) => rows.push(row),
            Err(e) => {
                debug!("Skipping line {}: {}", line_no + 2, e);
                skipped += 1;
            }
        }
    }

    Ok((rows, skipped))
}

fn parse_field<T>(cols: &[&str], idx: usize, name: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    cols.get(idx)
        .ok_or_else(|| format!("missing {name}"))?
        .trim()
        .parse::<T>()
        .map_err(|e| format!("invalid {name}: {e}"))
}

/// Like [`parse_field`], but `nan` and `inf` are rejected too.
fn parse_finite(cols: &[&str], idx: usize, name: &str) -> Result<f64, String> {
    let value: f64 = parse_field(cols, idx, name)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite {name}: {value}"))
    }
}

fn parse_row(cols: &[&str], indices: &[usize; REQUIRED_COLUMNS.len()]) -> Result<LogRow, String> {
    let [agent_i, chunk_i, time_i, a0_i, a1_i, a2_i] = *indices;
    Ok(LogRow {
        agent_id: AgentId(parse_field(cols, agent_i, "agent_id")?),
        chunk_id: ChunkId(parse_field(cols, chunk_i, "chunk_id")?),
        time_pc_sec_abs: parse_finite(cols, time_i, "time_pc_sec_abs")?,
        a0: parse_finite(cols, a0_i, "a0")?,
        a1: parse_finite(cols, a1_i, "a1")?,
        a2: parse_finite(cols, a2_i, "a2")?,
    })
}

/// Load a single CSV file.
pub fn load_file(path: &Path) -> LoadOutcome {
    let result = if !path.is_file() {
        Err(LoadError::NotFound)
    } else {
        File::open(path)
            .map_err(LoadError::from)
            .and_then(read_rows)
    };

    match result {
        Ok((rows, skipped_rows)) => LoadOutcome::Loaded {
            path: path.to_path_buf(),
            rows,
            skipped_rows,
        },
        Err(reason) => LoadOutcome::Skipped {
            path: path.to_path_buf(),
            reason,
        },
    }
}

/// Load every file, logging skipped files and malformed rows.
pub fn load_files(paths: &[PathBuf], show_progress: bool) -> Vec<LoadOutcome> {
    let progress_bar = if show_progress && paths.len() > 1 {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(ref pb) = progress_bar {
            pb.set_message(path.display().to_string());
        }

        let outcome = load_file(path);
        match &outcome {
            LoadOutcome::Loaded {
                rows, skipped_rows, ..
            } => {
                info!("Loaded {} rows from {}", rows.len(), path.display());
                if *skipped_rows > 0 {
                    warn!(
                        "Skipped {} malformed rows in {}",
                        skipped_rows,
                        path.display()
                    );
                }
            }
            LoadOutcome::Skipped { reason, .. } => {
                warn!("Skipping {}: {}", path.display(), reason);
            }
        }
        outcomes.push(outcome);

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    outcomes
}

/// Concatenate rows of all successfully loaded files, in file order.
pub fn collect_rows(outcomes: &[LoadOutcome]) -> Vec<LogRow> {
    outcomes
        .iter()
        .flat_map(|outcome| outcome.rows().iter().cloned())
        .collect()
}
