//! Wraparound correction for the modulo-256 phase signal.

use super::{HALF_MODULUS, PHASE_MODULUS};

/// Remove modular wraparound from a time-ordered phase sequence.
///
/// Each jump larger than half the modulus shifts the current sample and
/// everything after it by one full modulus, so corrections accumulate.
/// A jump of exactly half the modulus is ambiguous and left alone.
pub fn unwrap_phase(values: &[f64]) -> Vec<f64> {
    let mut corrected = Vec::with_capacity(values.len());
    let mut offset = 0.0;

    for (i, &raw) in values.iter().enumerate() {
        let mut value = raw + offset;
        if i > 0 {
            let diff = value - corrected[i - 1];
            if diff < -HALF_MODULUS {
                offset += PHASE_MODULUS;
                value += PHASE_MODULUS;
            } else if diff > HALF_MODULUS {
                offset -= PHASE_MODULUS;
                value -= PHASE_MODULUS;
            }
        }
        corrected.push(value);
    }

    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upward_wrap() {
        assert_eq!(
            unwrap_phase(&[250.0, 253.0, 4.0, 8.0]),
            vec![250.0, 253.0, 260.0, 264.0]
        );
    }

    #[test]
    fn test_downward_wrap() {
        assert_eq!(
            unwrap_phase(&[5.0, 2.0, 254.0, 250.0]),
            vec![5.0, 2.0, -2.0, -6.0]
        );
    }

    #[test]
    fn test_short_input_unchanged() {
        assert!(unwrap_phase(&[]).is_empty());
        assert_eq!(unwrap_phase(&[42.0]), vec![42.0]);
    }

    #[test]
    fn test_exact_half_modulus_not_corrected() {
        assert_eq!(unwrap_phase(&[0.0, 128.0]), vec![0.0, 128.0]);
        assert_eq!(unwrap_phase(&[200.0, 72.0]), vec![200.0, 72.0]);
    }

    #[test]
    fn test_multiple_wraps_accumulate() {
        // Three full turns of a steadily increasing counter.
        let raw: Vec<f64> = (0..768).map(|i| ((i * 3) % 256) as f64).collect();
        let unwrapped = unwrap_phase(&raw);
        for (i, v) in unwrapped.iter().enumerate() {
            assert_eq!(*v, (i * 3) as f64);
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let raw = vec![250.0, 10.0, 20.0];
        let copy = raw.clone();
        let _ = unwrap_phase(&raw);
        assert_eq!(raw, copy);
    }

    #[test]
    fn test_continuity_and_modulo_fidelity() {
        let raw = [
            12.0, 100.0, 230.0, 250.0, 3.0, 90.0, 220.0, 255.0, 0.0, 130.0, 2.0, 254.0, 128.0,
            0.0, 129.0,
        ];
        let unwrapped = unwrap_phase(&raw);
        assert_eq!(unwrapped.len(), raw.len());

        for pair in unwrapped.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= HALF_MODULUS);
        }
        for (u, r) in unwrapped.iter().zip(raw.iter()) {
            assert_eq!((u - r).rem_euclid(PHASE_MODULUS), 0.0);
        }
    }
}
