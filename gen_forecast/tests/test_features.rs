use chrono::{DateTime, Duration, TimeZone, Utc};
use gen_forecast::data::HourlySeries;
use gen_forecast::features::{
    build_supervised, calendar_table, features_at, point_features, FEATURE_NAMES,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()
}

// Deterministic, non-periodic values so every offset is distinguishable
fn wiggly(n: usize) -> Vec<Option<f64>> {
    (0..n)
        .map(|i| Some(1000.0 + i as f64 * 0.5 + ((i * 7919) % 97) as f64))
        .collect()
}

fn series_from(values: Vec<Option<f64>>) -> HourlySeries {
    HourlySeries::new(start(), values).unwrap()
}

#[rstest]
#[case(168)]
#[case(200)]
#[case(299)]
fn test_lags_match_series_offsets(#[case] offset: usize) {
    let values = wiggly(300);
    let series = series_from(values.clone());
    let table = build_supervised(&series);

    let ts = series.timestamp_at(offset);
    let idx = table.timestamps().iter().position(|t| *t == ts).unwrap();
    let row = &table.rows()[idx];

    assert_eq!(row.lag_1, values[offset - 1]);
    assert_eq!(row.lag_24, values[offset - 24]);
    assert_eq!(row.lag_168, values[offset - 168]);
    assert_eq!(table.targets()[idx], values[offset].unwrap());
}

#[test]
fn test_features_ignore_target_hour_and_later() {
    let values = wiggly(300);
    let mut altered = values.clone();
    for v in altered.iter_mut().skip(250) {
        *v = Some(-1.0);
    }

    let ts = start() + Duration::hours(250);
    assert_eq!(
        features_at(&series_from(values), ts),
        features_at(&series_from(altered), ts)
    );
}

#[test]
fn test_table_starts_after_longest_dependency() {
    let table = build_supervised(&series_from(wiggly(300)));
    assert_eq!(table.len(), 300 - 168);
    assert_eq!(table.timestamps()[0], start() + Duration::hours(168));
    assert!(table.timestamps().windows(2).all(|w| w[0] < w[1]));
    assert!(table.rows().iter().all(|row| row.is_complete()));
}

#[test]
fn test_point_features_equal_rebuilt_table_row() {
    let series = series_from(wiggly(300));
    let ts = series.last_timestamp() + Duration::hours(1);
    let point = point_features(&series, ts).unwrap();

    let mut extended = series.clone();
    extended.push(ts, Some(42.0)).unwrap();
    let table = build_supervised(&extended);

    assert_eq!(*table.timestamps().last().unwrap(), ts);
    assert_eq!(*table.rows().last().unwrap(), point);
    for name in FEATURE_NAMES {
        assert_eq!(table.rows().last().unwrap().get(name), point.get(name));
    }
}

#[test]
fn test_point_features_reject_past_timestamps() {
    let series = series_from(wiggly(300));
    assert!(point_features(&series, series.last_timestamp()).is_err());
    assert!(point_features(&series, series.last_timestamp() + Duration::minutes(90)).is_err());
}

#[test]
fn test_gap_excludes_dependent_rows() {
    let mut values = wiggly(600);
    for v in &mut values[300..305] {
        *v = None;
    }
    let table = build_supervised(&series_from(values));

    // 432 eligible hours minus the 173 whose target, lags or windows touch the gap
    assert_eq!(table.len(), 259);

    let first_clean = start() + Duration::hours(473);
    let gap_start = start() + Duration::hours(300);
    assert!(table
        .timestamps()
        .iter()
        .all(|ts| *ts < gap_start || *ts >= first_clean));
    assert!(table.timestamps().contains(&first_clean));
    assert!(table.timestamps().contains(&(gap_start - Duration::hours(1))));
}

#[test]
fn test_point_features_over_gap_are_missing() {
    let mut values = wiggly(300);
    values[299] = None;
    let series = series_from(values);
    let row = point_features(&series, series.last_timestamp() + Duration::hours(1)).unwrap();

    assert_eq!(row.lag_1, None);
    assert_eq!(row.roll_mean_24, None);
    assert_eq!(row.roll_std_24, None);
    assert!(row.lag_24.is_some());
    assert_eq!(
        row.missing_features(),
        vec!["lag_1", "roll_mean_24", "roll_mean_168", "roll_std_24"]
    );
}

#[test]
fn test_calendar_table_matches_per_row_fields() {
    let series = series_from(wiggly(300));
    let table = build_supervised(&series);
    let calendar = calendar_table(table.timestamps());

    for (row, cal) in table.rows().iter().zip(calendar.iter()) {
        assert_eq!(row.hour_sin, cal.hour_sin);
        assert_eq!(row.dow_cos, cal.dow_cos);
        assert_eq!(row.month, cal.month);
    }
}
