//! Utility functions for the gen_forecast crate

use chrono::{DateTime, Duration, Utc};

/// The `horizon` hourly timestamps following `last_timestamp`
pub fn future_timestamps(last_timestamp: DateTime<Utc>, horizon: usize) -> Vec<DateTime<Utc>> {
    (1..=horizon)
        .map(|h| last_timestamp + Duration::hours(h as i64))
        .collect()
}

/// Relative improvement of `mae_model` over `mae_baseline`, in percent
///
/// `None` when the baseline error is zero and the ratio is undefined.
pub fn improvement_pct(mae_baseline: f64, mae_model: f64) -> Option<f64> {
    if mae_baseline == 0.0 {
        return None;
    }
    Some((mae_baseline - mae_model) / mae_baseline * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_future_timestamps_cross_midnight() {
        let last = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let ts = future_timestamps(last, 2);
        assert_eq!(ts[0], Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(ts[1], Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_improvement() {
        assert_eq!(improvement_pct(10.0, 7.5), Some(25.0));
        assert_eq!(improvement_pct(10.0, 12.0), Some(-20.0));
        assert_eq!(improvement_pct(0.0, 1.0), None);
    }
}
