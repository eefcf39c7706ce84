//! Row grouping and dataset statistics.
//!
//! This module turns the flat list of loaded rows into per-agent and
//! per-chunk views and computes the ranges the renderer needs.

use crate::models::{AgentId, Channel, ChunkId, DatasetSummary, LogRow, PhaseSample};
use std::collections::{BTreeMap, BTreeSet};

/// Group one channel by agent, each series sorted ascending by time.
///
/// The sort is stable so rows sharing a timestamp keep their file order.
pub fn group_by_agent(rows: &[LogRow], channel: Channel) -> BTreeMap<AgentId, Vec<PhaseSample>> {
    let mut grouped: BTreeMap<AgentId, Vec<PhaseSample>> = BTreeMap::new();

    for row in rows {
        grouped
            .entry(row.agent_id)
            .or_default()
            .push(row.sample(channel));
    }

    for samples in grouped.values_mut() {
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    grouped
}

/// Group rows by (agent, chunk), keeping file order within each chunk.
pub fn group_by_chunk(rows: &[LogRow]) -> BTreeMap<(AgentId, ChunkId), Vec<&LogRow>> {
    let mut grouped: BTreeMap<(AgentId, ChunkId), Vec<&LogRow>> = BTreeMap::new();

    for row in rows {
        grouped
            .entry((row.agent_id, row.chunk_id))
            .or_default()
            .push(row);
    }

    grouped
}

/// Distinct agents in ascending order.
pub fn agents(rows: &[LogRow]) -> BTreeSet<AgentId> {
    rows.iter().map(|row| row.agent_id).collect()
}

/// Minimum and maximum of the finite values in `values`.
pub fn finite_range<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Time span covered by all rows.
pub fn time_range(rows: &[LogRow]) -> Option<(f64, f64)> {
    finite_range(rows.iter().map(|row| row.time_pc_sec_abs))
}

/// Value span of one channel over all rows.
pub fn channel_range(rows: &[LogRow], channel: Channel) -> Option<(f64, f64)> {
    finite_range(rows.iter().map(|row| row.channel(channel)))
}

/// Compute row, agent and chunk counts for a dataset.
pub fn summarize(rows: &[LogRow]) -> DatasetSummary {
    let chunks: BTreeSet<(AgentId, ChunkId)> =
        rows.iter().map(|row| (row.agent_id, row.chunk_id)).collect();
    let span = time_range(rows);

    DatasetSummary {
        rows: rows.len(),
        agents: agents(rows).len(),
        chunks: chunks.len(),
        first_time: span.map(|(first, _)| first),
        last_time: span.map(|(_, last)| last),
    }
}
