//! Relative phase export in JSON and CSV.
//!
//! The export carries the same series that are plotted. Gap markers are
//! written as `null` in JSON and as an empty field in CSV.

use crate::models::{AgentId, Channel};
use crate::phase::RelativePhase;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the export was generated.
    pub generated_at: DateTime<Utc>,
    /// Files that contributed rows.
    pub input_files: Vec<String>,
    /// Number of files skipped by the loader.
    pub files_skipped: usize,
    /// Number of rows used.
    pub rows: usize,
    /// Channel treated as the phase counter.
    pub channel: Channel,
    /// Grid spacing in seconds.
    pub step_seconds: f64,
    /// Absolute time of the first grid point.
    pub start_time: f64,
    /// Agent all differences are taken against.
    pub reference_agent: AgentId,
}

/// One exported relative phase series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesExport {
    pub agent: AgentId,
    pub label: String,
    /// Radians; `None` marks a suppressed discontinuity.
    pub values: Vec<Option<f64>>,
}

/// Complete relative phase export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub metadata: ReportMetadata,
    /// Seconds since the first grid point.
    pub times: Vec<f64>,
    pub series: Vec<SeriesExport>,
}

impl PhaseReport {
    /// Build an export from a computed relative phase.
    pub fn new(
        phase: &RelativePhase,
        channel: Channel,
        input_files: Vec<String>,
        files_skipped: usize,
        rows: usize,
    ) -> Self {
        let metadata = ReportMetadata {
            generated_at: Utc::now(),
            input_files,
            files_skipped,
            rows,
            channel,
            step_seconds: phase.grid.step(),
            start_time: phase.grid.start(),
            reference_agent: phase.reference,
        };

        let series = phase
            .series
            .iter()
            .map(|(&agent, values)| SeriesExport {
                agent,
                label: format!("Agent {} - Agent {}", agent, phase.reference),
                values: values
                    .iter()
                    .map(|v| if v.is_nan() { None } else { Some(*v) })
                    .collect(),
            })
            .collect();

        Self {
            metadata,
            times: phase.grid.display_times(),
            series,
        }
    }

    /// Total number of gap markers.
    pub fn gap_count(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.values.iter().filter(|v| v.is_none()).count())
            .sum()
    }
}

/// Generate a JSON export.
pub fn generate_json_report(report: &PhaseReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a CSV export: one row per grid point, one column per agent.
pub fn generate_csv_report(report: &PhaseReport) -> String {
    let mut out = String::from("time");
    for series in &report.series {
        out.push_str(&format!(",agent_{}", series.agent));
    }
    out.push('\n');

    for (k, time) in report.times.iter().enumerate() {
        out.push_str(&format!("{:.6}", time));
        for series in &report.series {
            out.push(',');
            if let Some(Some(v)) = series.values.get(k) {
                out.push_str(&v.to_string());
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhaseSample;
    use crate::phase::RelativePhaseComputer;
    use std::collections::BTreeMap;

    fn create_test_phase() -> RelativePhase {
        // Agent 2 jumps from -120 to +120 units between the two grid points.
        let times = [0.0, 1.0];
        let samples = |values: [f64; 2]| -> Vec<PhaseSample> {
            times
                .iter()
                .zip(values)
                .map(|(&time, value)| PhaseSample { time, value })
                .collect()
        };
        let mut input = BTreeMap::new();
        input.insert(AgentId(1), samples([0.0, 0.0]));
        input.insert(AgentId(2), samples([136.0, 104.0]));
        input.insert(AgentId(3), samples([10.0, 10.0]));
        RelativePhaseComputer::new(0.5).compute(&input).unwrap()
    }

    fn create_test_report() -> PhaseReport {
        PhaseReport::new(
            &create_test_phase(),
            Channel::A0,
            vec!["logs/a.csv".to_string()],
            1,
            6,
        )
    }

    #[test]
    fn test_report_structure() {
        let report = create_test_report();
        assert_eq!(report.times, vec![0.0, 0.5]);
        assert_eq!(report.metadata.reference_agent, AgentId(1));
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.series[0].label, "Agent 2 - Agent 1");
        assert_eq!(report.gap_count(), 1);
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"reference_agent\": 1"));
        assert!(json.contains("\"channel\": \"a0\""));
        assert!(json.contains("null"));

        let parsed: PhaseReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.series[0].values[1], None);
    }

    #[test]
    fn test_generate_csv_report() {
        let report = create_test_report();
        let csv_text = generate_csv_report(&report);
        let lines: Vec<&str> = csv_text.lines().collect();

        assert_eq!(lines[0], "time,agent_2,agent_3");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("0.500000,,"));
    }
}
