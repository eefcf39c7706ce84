//! Data models for sensor logs.
//!
//! This module contains the row, identifier and sample types shared by
//! the loader, the aggregation helpers, the numeric core and the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CSV columns every log file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = ["agent_id", "chunk_id", "time_pc_sec_abs", "a0", "a1", "a2"];

/// Identifier of a logging agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AgentId(pub i64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one contiguous recording chunk of an agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChunkId(pub i64);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value column of a log row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Phase counter (modulo 256)
    #[default]
    A0,
    A1,
    A2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::A0, Channel::A1, Channel::A2];

    /// Column name in the CSV header.
    pub fn column(&self) -> &'static str {
        match self {
            Channel::A0 => "a0",
            Channel::A1 => "a1",
            Channel::A2 => "a2",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One parsed CSV row. Extra columns in the file are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub agent_id: AgentId,
    pub chunk_id: ChunkId,
    /// Absolute PC time in seconds.
    pub time_pc_sec_abs: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl LogRow {
    /// Value of the given channel.
    pub fn channel(&self, channel: Channel) -> f64 {
        match channel {
            Channel::A0 => self.a0,
            Channel::A1 => self.a1,
            Channel::A2 => self.a2,
        }
    }

    pub fn sample(&self, channel: Channel) -> PhaseSample {
        PhaseSample {
            time: self.time_pc_sec_abs,
            value: self.channel(channel),
        }
    }
}

/// A single timestamped reading of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    /// Seconds.
    pub time: f64,
    /// Raw units.
    pub value: f64,
}

/// Summary of a loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Total number of rows.
    pub rows: usize,
    /// Number of distinct agents.
    pub agents: usize,
    /// Number of distinct (agent, chunk) pairs.
    pub chunks: usize,
    /// Earliest timestamp, if any rows are present.
    pub first_time: Option<f64>,
    /// Latest timestamp, if any rows are present.
    pub last_time: Option<f64>,
}

impl DatasetSummary {
    /// Duration covered by the dataset in seconds.
    pub fn span_seconds(&self) -> f64 {
        match (self.first_time, self.last_time) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}
