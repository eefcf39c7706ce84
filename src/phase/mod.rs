//! Numeric core: phase unwrapping, temporal alignment and relative phase.
//!
//! Everything in here is a pure transform over borrowed slices. Inputs are
//! never mutated; every operation returns freshly allocated vectors.

pub mod grid;
pub mod relative;
pub mod unwrap;

pub use grid::{AlignError, DEFAULT_STEP_SECONDS};
pub use relative::{RelativePhase, RelativePhaseComputer};

/// Period of the raw phase signal: values wrap from 255 back to 0.
pub const PHASE_MODULUS: f64 = 256.0;

/// Jump size above which two adjacent samples are treated as discontinuous.
///
/// Shared by unwrapping and by gap masking of the relative phase.
pub const HALF_MODULUS: f64 = PHASE_MODULUS / 2.0;

/// Factor converting raw phase units to radians.
pub const RAW_TO_RADIANS: f64 = std::f64::consts::TAU / PHASE_MODULUS;
