//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Number of whole cycles of `period_s` needed to cover `duration_s`.
///
/// Partial cycles are rounded up so a non-zero duration always lasts at least
/// one cycle. Negative or non-finite durations give zero cycles.
pub fn seconds_to_cycles(duration_s: f64, period_s: f64) -> u64 {
    if !duration_s.is_finite() || duration_s <= 0.0 || period_s <= 0.0 {
        return 0;
    }

    // Remove floating point noise before rounding up, 0.3 / 0.005 is not
    // exactly 60.
    let cycles = duration_s / period_s;
    let nearest = cycles.round();
    if (cycles - nearest).abs() < 1e-9 {
        nearest as u64
    }
    else {
        cycles.ceil() as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seconds_to_cycles() {
        assert_eq!(seconds_to_cycles(0.3, 0.005), 60);
        assert_eq!(seconds_to_cycles(0.0, 0.005), 0);
        assert_eq!(seconds_to_cycles(0.0051, 0.005), 2);
        assert_eq!(seconds_to_cycles(-1.0, 0.005), 0);
        assert_eq!(seconds_to_cycles(f64::NAN, 0.005), 0);
        assert_eq!(seconds_to_cycles(1.0, 0.0), 0);
    }

    #[test]
    fn test_duration_to_seconds() {
        let d = chrono::Duration::milliseconds(1500);
        assert_eq!(duration_to_seconds(d), Some(1.5));
    }
}
