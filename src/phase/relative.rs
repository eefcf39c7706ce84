//! Relative phase of every agent against a reference agent.

use std::collections::BTreeMap;

use tracing::debug;

use super::grid::{AlignError, CommonGrid, DEFAULT_STEP_SECONDS};
use super::unwrap::unwrap_phase;
use super::{HALF_MODULUS, PHASE_MODULUS, RAW_TO_RADIANS};
use crate::models::{AgentId, PhaseSample};

/// Wrap a raw-unit phase difference into `[-128, 128)`.
pub fn wrap_difference(raw_diff: f64) -> f64 {
    (raw_diff + HALF_MODULUS).rem_euclid(PHASE_MODULUS) - HALF_MODULUS
}

/// Replace samples that jump by more than half the modulus with NaN.
///
/// Each sample is compared with its unmasked predecessor; nothing is carried
/// forward.
pub fn mask_discontinuities(wrapped: &[f64]) -> Vec<f64> {
    let mut masked = wrapped.to_vec();
    for i in 1..wrapped.len() {
        if (wrapped[i] - wrapped[i - 1]).abs() > HALF_MODULUS {
            masked[i] = f64::NAN;
        }
    }
    masked
}

/// Relative phase of all non-reference agents on a shared grid.
#[derive(Debug, Clone)]
pub struct RelativePhase {
    /// Agent every other series is measured against.
    pub reference: AgentId,
    pub grid: CommonGrid,
    /// Radians in `[-π, π)`, NaN where a discontinuity was suppressed.
    pub series: BTreeMap<AgentId, Vec<f64>>,
}

impl RelativePhase {
    /// `(display_time, radians)` pairs for one agent.
    pub fn points(&self, agent: AgentId) -> Vec<(f64, f64)> {
        self.series
            .get(&agent)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .map(|(k, &v)| (self.grid.display_time(k), v))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of gap markers across all series.
    pub fn gap_count(&self) -> usize {
        self.series
            .values()
            .flat_map(|values| values.iter())
            .filter(|v| v.is_nan())
            .count()
    }
}

/// Computes unwrapped, resampled, wrapped and masked phase differences.
#[derive(Debug, Clone)]
pub struct RelativePhaseComputer {
    step: f64,
}

impl Default for RelativePhaseComputer {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_SECONDS)
    }
}

impl RelativePhaseComputer {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    /// Run the full pipeline over time-sorted per-agent samples.
    pub fn compute(
        &self,
        series: &BTreeMap<AgentId, Vec<PhaseSample>>,
    ) -> Result<RelativePhase, AlignError> {
        let participants: Vec<(AgentId, &[PhaseSample])> = series
            .iter()
            .filter(|(agent, samples)| {
                if samples.is_empty() {
                    debug!("Agent {} has no samples, skipping", agent);
                }
                !samples.is_empty()
            })
            .map(|(&agent, samples)| (agent, samples.as_slice()))
            .collect();

        let ranges = participants
            .iter()
            .map(|(_, samples)| (samples[0].time, samples[samples.len() - 1].time));
        let grid = CommonGrid::spanning(ranges, self.step)?;

        debug!(
            "Common grid: start={:.3}s, {} points at {}s",
            grid.start(),
            grid.len(),
            grid.step()
        );

        let resampled: BTreeMap<AgentId, Vec<f64>> = participants
            .iter()
            .map(|&(agent, samples)| {
                let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
                let raw: Vec<f64> = samples.iter().map(|s| s.value).collect();
                (agent, grid.resample(&times, &unwrap_phase(&raw)))
            })
            .collect();

        let (&reference, reference_values) = resampled
            .iter()
            .next()
            .ok_or(AlignError::NoSeries)?;

        let mut out = BTreeMap::new();
        for (&agent, values) in resampled.iter().skip(1) {
            let wrapped: Vec<f64> = values
                .iter()
                .zip(reference_values)
                .map(|(v, r)| wrap_difference(v - r))
                .collect();
            let radians: Vec<f64> = mask_discontinuities(&wrapped)
                .into_iter()
                .map(|v| v * RAW_TO_RADIANS)
                .collect();

            debug!(
                "Agent {}: relative phase (first 10 values) = {:?}",
                agent,
                &radians[..radians.len().min(10)]
            );
            out.insert(agent, radians);
        }

        Ok(RelativePhase {
            reference,
            grid,
            series: out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn series_from(times: &[f64], values: &[f64]) -> Vec<PhaseSample> {
        times
            .iter()
            .zip(values)
            .map(|(&time, &value)| PhaseSample { time, value })
            .collect()
    }

    #[test]
    fn test_wrap_difference_range() {
        for i in -2000..2000 {
            let w = wrap_difference(i as f64 * 0.37);
            assert!((-HALF_MODULUS..HALF_MODULUS).contains(&w), "{w}");
        }
        assert_eq!(wrap_difference(10.0), 10.0);
        assert_eq!(wrap_difference(140.0), -116.0);
        assert_eq!(wrap_difference(-120.0), -120.0);
        assert_eq!(wrap_difference(120.0), 120.0);
        assert_eq!(wrap_difference(-300.0), -44.0);
    }

    #[test]
    fn test_small_jump_is_not_masked() {
        let wrapped: Vec<f64> = [10.0, 140.0].iter().map(|&d| wrap_difference(d)).collect();
        let masked = mask_discontinuities(&wrapped);
        assert!(masked.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_large_jump_is_masked() {
        let wrapped: Vec<f64> = [-120.0, 120.0].iter().map(|&d| wrap_difference(d)).collect();
        let masked = mask_discontinuities(&wrapped);
        assert_eq!(masked[0], -120.0);
        assert!(masked[1].is_nan());
    }

    #[test]
    fn test_mask_does_not_propagate() {
        let masked = mask_discontinuities(&[0.0, 127.0, -127.0, -126.0, 0.0]);
        assert_eq!(masked[0], 0.0);
        assert_eq!(masked[1], 127.0);
        assert!(masked[2].is_nan());
        assert_eq!(masked[3], -126.0);
        assert_eq!(masked[4], 0.0);
    }

    #[test]
    fn test_identical_agents_give_zero() {
        let times = [0.0, 0.3, 0.7, 1.0];
        let values = [250.0, 10.0, 40.0, 90.0];
        let mut input = BTreeMap::new();
        input.insert(AgentId(1), series_from(&times, &values));
        input.insert(AgentId(2), series_from(&times, &values));

        let result = RelativePhaseComputer::default().compute(&input).unwrap();
        assert_eq!(result.reference, AgentId(1));
        let diff = &result.series[&AgentId(2)];
        assert_eq!(diff.len(), result.grid.len());
        assert!(diff.iter().all(|&v| v == 0.0));
        assert_eq!(result.gap_count(), 0);
    }

    #[test]
    fn test_reference_excluded_and_minimum_id() {
        let times = [0.0, 1.0];
        let mut input = BTreeMap::new();
        input.insert(AgentId(7), series_from(&times, &[0.0, 10.0]));
        input.insert(AgentId(-3), series_from(&times, &[0.0, 10.0]));
        input.insert(AgentId(4), series_from(&times, &[0.0, 10.0]));

        let result = RelativePhaseComputer::new(0.1).compute(&input).unwrap();
        assert_eq!(result.reference, AgentId(-3));
        assert!(!result.series.contains_key(&AgentId(-3)));
        assert_eq!(
            result.series.keys().copied().collect::<Vec<_>>(),
            vec![AgentId(4), AgentId(7)]
        );
    }

    #[test]
    fn test_disjoint_agents_abort() {
        let mut input = BTreeMap::new();
        input.insert(AgentId(1), series_from(&[0.0, 1.0], &[0.0, 1.0]));
        input.insert(AgentId(2), series_from(&[2.0, 3.0], &[0.0, 1.0]));

        let err = RelativePhaseComputer::default().compute(&input).unwrap_err();
        assert!(matches!(err, AlignError::NoOverlap { .. }));
    }

    #[test]
    fn test_constant_offset_in_radians() {
        // Agent 2 leads by 64 units (a quarter turn) and wraps past 256.
        let times = [0.0, 0.5, 1.0];
        let mut input = BTreeMap::new();
        input.insert(AgentId(1), series_from(&times, &[200.0, 220.0, 240.0]));
        input.insert(AgentId(2), series_from(&times, &[8.0, 28.0, 48.0]));

        let result = RelativePhaseComputer::new(0.25).compute(&input).unwrap();
        for v in &result.series[&AgentId(2)] {
            assert_relative_eq!(*v, PI / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_series_are_ignored() {
        let mut input = BTreeMap::new();
        input.insert(AgentId(0), Vec::new());
        input.insert(AgentId(1), series_from(&[0.0, 1.0], &[0.0, 1.0]));
        input.insert(AgentId(2), series_from(&[0.0, 1.0], &[0.0, 1.0]));
        let result = RelativePhaseComputer::default().compute(&input).unwrap();
        assert_eq!(result.reference, AgentId(1));
        assert_eq!(result.series.len(), 1);
    }

    #[test]
    fn test_single_agent_has_no_series() {
        let mut input = BTreeMap::new();
        input.insert(AgentId(1), series_from(&[0.0, 1.0], &[0.0, 1.0]));
        let result = RelativePhaseComputer::default().compute(&input).unwrap();
        assert_eq!(result.reference, AgentId(1));
        assert!(result.series.is_empty());
        assert_eq!(result.grid.len(), 100);
    }

    #[test]
    fn test_points_use_display_time() {
        let times = [5.0, 6.0];
        let mut input = BTreeMap::new();
        input.insert(AgentId(1), series_from(&times, &[0.0, 0.0]));
        input.insert(AgentId(2), series_from(&times, &[0.0, 0.0]));
        let result = RelativePhaseComputer::new(0.5).compute(&input).unwrap();
        assert_eq!(result.points(AgentId(2)), vec![(0.0, 0.0), (0.5, 0.0)]);
        assert!(result.points(AgentId(99)).is_empty());
    }
}
