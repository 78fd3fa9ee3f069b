//! Train on a synthetic generation curve and print a one-day forecast
//!
//! Run with `cargo run -p gen_forecast --example basic_forecast`

use chrono::{TimeZone, Utc};
use gen_forecast::error::Result;
use gen_forecast::models::GradientBoostingRegressor;
use gen_forecast::{HourlySeries, RecursiveForecaster, TrainingHarness, FORECAST_UNIT};
use std::f64::consts::PI;

fn main() -> Result<()> {
    // Four weeks of hourly values with a daily and a weekly cycle
    let start = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap();
    let values: Vec<f64> = (0..672)
        .map(|i| {
            let hour = i as f64;
            50_000.0 + 9_000.0 * (2.0 * PI * hour / 24.0).sin()
                - 4_000.0 * (2.0 * PI * hour / 168.0).cos()
        })
        .collect();
    let series = HourlySeries::from_values(start, &values)?;

    let outcome = TrainingHarness::new(GradientBoostingRegressor::default()).run(&series)?;
    let meta = &outcome.metadata;
    println!(
        "MAE model {:.1}, baseline {:.1} ({:+.1}%)",
        meta.mae_model, meta.mae_baseline, meta.improvement_pct
    );

    let table = RecursiveForecaster::new(&outcome.model).forecast(&series, 24)?;
    println!("{:<26} {:>12} {:>12}   [{}]", "timestamp", "yhat", "baseline", FORECAST_UNIT);
    for point in table.points() {
        println!(
            "{:<26} {:>12.1} {:>12.1}",
            point.timestamp.to_rfc3339(),
            point.yhat,
            point.baseline
        );
    }

    Ok(())
}
