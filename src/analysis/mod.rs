//! Dataset reshaping ahead of plotting.

pub mod aggregator;

pub use aggregator::*;
