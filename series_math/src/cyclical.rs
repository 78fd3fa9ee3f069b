//! Cyclical encodings for periodic quantities (hour of day, day of week)

use std::f64::consts::PI;

/// Encode `value` on a circle of length `period` as `(sin, cos)`
///
/// Values one period apart map to the same point, so hour 23 sits next to
/// hour 0 instead of 23 units away from it.
pub fn encode(value: f64, period: f64) -> (f64, f64) {
    debug_assert!(period > 0.0, "period must be positive");
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_origin_and_quarter_turn() {
        let (s, c) = encode(0.0, 24.0);
        assert_abs_diff_eq!(s, 0.0);
        assert_abs_diff_eq!(c, 1.0);

        let (s, c) = encode(6.0, 24.0);
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wraps_after_one_period() {
        let a = encode(3.0, 7.0);
        let b = encode(10.0, 7.0);
        assert_abs_diff_eq!(a.0, b.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.1, b.1, epsilon = 1e-12);
    }
}
