//! Common time grid and linear resampling.
//!
//! Agents log at irregular, unrelated instants. To compare them every
//! series is resampled onto one uniform grid covering the time span that all
//! agents share.

use thiserror::Error;

/// Grid spacing used when none is configured (100 Hz).
pub const DEFAULT_STEP_SECONDS: f64 = 0.01;

/// Upper bound on grid points, about 28 hours at the default step.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Reasons a set of series cannot be put on a common grid.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AlignError {
    /// No series were supplied at all.
    #[error("no agent series to align")]
    NoSeries,

    /// The per-agent time ranges do not intersect.
    #[error("no overlapping time range for agents (start={start}, end={end})")]
    NoOverlap { start: f64, end: f64 },

    /// The grid step is zero, negative or not finite.
    #[error("grid step must be positive and finite, got {0}")]
    InvalidStep(f64),

    /// The overlap divided by the step exceeds [`MAX_GRID_POINTS`].
    #[error("a {step}s step over {span}s needs more than {} grid points", MAX_GRID_POINTS)]
    TooManyPoints { span: f64, step: f64 },
}

/// Uniformly spaced, half-open time grid `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonGrid {
    start: f64,
    step: f64,
    len: usize,
}

impl CommonGrid {
    /// Build the grid over the intersection of `(min, max)` time ranges.
    pub fn spanning<I>(ranges: I, step: f64) -> Result<Self, AlignError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        if !step.is_finite() || step <= 0.0 {
            return Err(AlignError::InvalidStep(step));
        }

        let mut ranges = ranges.into_iter().peekable();
        if ranges.peek().is_none() {
            return Err(AlignError::NoSeries);
        }

        let (start, end) = ranges.fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(start, end), (lo, hi)| (start.max(lo), end.min(hi)),
        );

        if !(start < end) {
            return Err(AlignError::NoOverlap { start, end });
        }

        let points = ((end - start) / step).ceil();
        if points > MAX_GRID_POINTS as f64 {
            return Err(AlignError::TooManyPoints {
                span: end - start,
                step,
            });
        }

        let mut len = points as usize;
        // Float rounding can put the last point on or past `end`.
        while len > 0 && start + (len - 1) as f64 * step >= end {
            len -= 1;
        }

        Ok(Self { start, step, len })
    }

    /// Absolute time of the first grid point.
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute time at which series are sampled for point `k`.
    pub fn query_time(&self, k: usize) -> f64 {
        self.start + k as f64 * self.step
    }

    /// Time of point `k` relative to the grid start, used for display.
    pub fn display_time(&self, k: usize) -> f64 {
        k as f64 * self.step
    }

    pub fn query_times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |k| self.query_time(k))
    }

    pub fn display_times(&self) -> Vec<f64> {
        (0..self.len).map(|k| self.display_time(k)).collect()
    }

    /// Linearly resample `(times, values)` nodes at every grid point.
    pub fn resample(&self, times: &[f64], values: &[f64]) -> Vec<f64> {
        self.query_times()
            .map(|t| interpolate(times, values, t))
            .collect()
    }
}

/// Piecewise-linear interpolation with clamping outside the node range.
///
/// `times` must be sorted ascending; duplicates are allowed. Returns NaN
/// only when there are no nodes at all.
pub fn interpolate(times: &[f64], values: &[f64], t: f64) -> f64 {
    let n = times.len().min(values.len());
    if n == 0 {
        return f64::NAN;
    }
    if t <= times[0] {
        return values[0];
    }
    if t >= times[n - 1] {
        return values[n - 1];
    }

    // First node strictly after `t`; guaranteed to be in 1..n here.
    let hi = times[..n].partition_point(|&x| x <= t);
    let lo = hi - 1;
    let span = times[hi] - times[lo];
    let frac = (t - times[lo]) / span;
    values[lo] + frac * (values[hi] - values[lo])
}
