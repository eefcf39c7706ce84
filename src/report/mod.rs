//! Relative phase export.

pub mod generator;

pub use generator::*;
