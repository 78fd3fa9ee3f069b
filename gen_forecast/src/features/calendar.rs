//! Calendar features derived from a timestamp alone

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Cyclical hour/day-of-week encodings and the calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub dow_sin: f64,
    pub dow_cos: f64,
    /// 1 (January) to 12 (December)
    pub month: u32,
}

/// Calendar features for one UTC timestamp
///
/// Day of week counts from Monday = 0.
pub fn calendar_features(ts: DateTime<Utc>) -> CalendarFeatures {
    let (hour_sin, hour_cos) = series_math::encode(ts.hour() as f64, 24.0);
    let (dow_sin, dow_cos) = series_math::encode(ts.weekday().num_days_from_monday() as f64, 7.0);

    CalendarFeatures {
        hour_sin,
        hour_cos,
        dow_sin,
        dow_cos,
        month: ts.month(),
    }
}

/// Calendar features for each timestamp, in input order
pub fn calendar_table(timestamps: &[DateTime<Utc>]) -> Vec<CalendarFeatures> {
    timestamps.iter().map(|ts| calendar_features(*ts)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn test_monday_midnight() {
        // 2025-12-01 is a Monday
        let ts = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let cal = calendar_features(ts);

        assert_abs_diff_eq!(cal.hour_sin, 0.0);
        assert_abs_diff_eq!(cal.hour_cos, 1.0);
        assert_abs_diff_eq!(cal.dow_sin, 0.0);
        assert_abs_diff_eq!(cal.dow_cos, 1.0);
        assert_eq!(cal.month, 12);
    }

    #[test]
    fn test_evening_hour_and_weekend() {
        // Saturday 18:00
        let ts = Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap();
        let cal = calendar_features(ts);

        assert_abs_diff_eq!(cal.hour_sin, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cal.hour_cos, 0.0, epsilon = 1e-12);
        let angle = 2.0 * std::f64::consts::PI * 5.0 / 7.0;
        assert_abs_diff_eq!(cal.dow_sin, angle.sin(), epsilon = 1e-12);
        assert_eq!(cal.month, 3);
    }

    #[test]
    fn test_table_preserves_order() {
        let start = Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap();
        let stamps = [start, start + chrono::Duration::hours(1)];
        let table = calendar_table(&stamps);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].month, 1);
        assert_eq!(table[1].month, 2);
    }
}
