use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use gen_forecast::artifacts::{load_metadata, load_model, save_metadata, save_model};
use gen_forecast::data::HourlySeries;
use gen_forecast::error::{ErrorKind, ForecastError};
use gen_forecast::features::{build_supervised, point_features, FEATURE_NAMES};
use gen_forecast::models::{
    FittedModel, GradientBoostingConfig, GradientBoostingRegressor, TrainedGradientBoosting,
};
use gen_forecast::training::{evaluate_baseline, TrainingHarness};
use pretty_assertions::assert_eq;
use std::f64::consts::PI;
use tempfile::tempdir;

fn generation(n: usize) -> HourlySeries {
    let start = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let daily = 10.0 * (2.0 * PI * i as f64 / 24.0).sin();
            let weekly = 5.0 * (2.0 * PI * i as f64 / 168.0).cos();
            100.0 + daily + weekly + 0.01 * i as f64
        })
        .collect();
    HourlySeries::from_values(start, &values).unwrap()
}

fn small_leaf_regressor() -> GradientBoostingRegressor {
    GradientBoostingRegressor::new(GradientBoostingConfig {
        min_samples_leaf: 5,
        ..GradientBoostingConfig::default()
    })
    .unwrap()
}

#[test]
fn test_minimum_history_trains() {
    let series = generation(336);
    let outcome = TrainingHarness::new(GradientBoostingRegressor::default())
        .run(&series)
        .unwrap();
    let meta = &outcome.metadata;

    assert!(meta.mae_model.is_finite());
    assert!(meta.mae_baseline.is_finite());
    assert!(meta.improvement_pct.is_finite());
    assert_eq!(meta.train_rows, 0);
    assert_eq!(meta.test_rows, 168);
    assert_eq!(meta.train_end, None);
    assert_eq!(meta.test_start, series.timestamp_at(168));
    assert_eq!(meta.test_end, series.last_timestamp());
}

#[test]
fn test_short_history_is_rejected() {
    let err = TrainingHarness::new(GradientBoostingRegressor::default())
        .run(&generation(335))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
    assert!(matches!(
        err,
        ForecastError::InsufficientHistoryError {
            needed: 168,
            got: 167
        }
    ));
}

#[test]
fn test_model_beats_baseline_on_trend() {
    let outcome = TrainingHarness::new(small_leaf_regressor())
        .with_holdout(48)
        .run(&generation(800))
        .unwrap();
    let meta = outcome.metadata;

    assert_eq!(meta.train_rows, 800 - 168 - 48);
    assert!(meta.mae_model < meta.mae_baseline);
    assert!(meta.improvement_pct > 0.0);
    assert_relative_eq!(meta.mae_model, meta.model_metrics.mae);
    assert_relative_eq!(meta.mae_baseline, meta.baseline_metrics.mae);
}

#[test]
fn test_metadata_features_match_row_schema() {
    let series = generation(400);
    let outcome = TrainingHarness::new(small_leaf_regressor())
        .with_holdout(24)
        .with_data_file("generation.csv")
        .run(&series)
        .unwrap();

    let expected: Vec<String> = FEATURE_NAMES.iter().map(|n| n.to_string()).collect();
    assert_eq!(outcome.metadata.features, expected);
    assert_eq!(outcome.model.feature_names(), expected.as_slice());

    // Rows expose values in schema order at training and inference time
    let table = build_supervised(&series);
    let point = point_features(&series, series.last_timestamp() + chrono::Duration::hours(1))
        .unwrap();
    for row in [table.rows()[0], point] {
        let by_name: Vec<Option<f64>> = outcome
            .metadata
            .features
            .iter()
            .map(|name| row.get(name))
            .collect();
        assert_eq!(by_name, row.values().to_vec());
    }
}

#[test]
fn test_artifacts_round_trip() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("models").join("model.json");
    let meta_path = dir.path().join("models").join("metadata.json");

    let series = generation(400);
    let outcome = TrainingHarness::new(small_leaf_regressor())
        .with_holdout(24)
        .run(&series)
        .unwrap();
    save_model(&outcome.model, &model_path).unwrap();
    save_metadata(&outcome.metadata, &meta_path).unwrap();

    let model: TrainedGradientBoosting = load_model(&model_path).unwrap();
    let meta = load_metadata(&meta_path).unwrap().unwrap();

    assert_eq!(model.n_trees(), outcome.model.n_trees());
    let row = build_supervised(&series).rows()[10];
    assert_relative_eq!(
        model.predict(&row).unwrap(),
        outcome.model.predict(&row).unwrap(),
        max_relative = 1e-9
    );
    assert_eq!(meta.features, outcome.metadata.features);
    assert_eq!(meta.test_start, outcome.metadata.test_start);
    assert_eq!(meta.model_version, "v1");
}

fn tamper_with_model(edit: impl FnOnce(&mut serde_json::Value)) -> TrainedGradientBoosting {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let outcome = TrainingHarness::new(small_leaf_regressor())
        .with_holdout(24)
        .run(&generation(400))
        .unwrap();
    save_model(&outcome.model, &path).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    edit(&mut json);
    std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();
    load_model(&path).unwrap()
}

#[test]
fn test_reordered_feature_schema_is_rejected() {
    let model = tamper_with_model(|json| {
        json["feature_names"]
            .as_array_mut()
            .unwrap()
            .reverse();
    });
    assert_eq!(model.feature_names()[0], "month");

    let series = generation(400);
    let row = build_supervised(&series).rows()[0];
    assert_eq!(model.validate().unwrap_err().kind(), ErrorKind::Model);
    assert_eq!(model.predict(&row).unwrap_err().kind(), ErrorKind::Model);
}

#[test]
fn test_split_on_unknown_feature_is_an_error() {
    let model = tamper_with_model(|json| {
        json["trees"][0]["Split"]["feature_idx"] = serde_json::json!(99);
    });

    let series = generation(400);
    let row = build_supervised(&series).rows()[0];
    assert_eq!(model.validate().unwrap_err().kind(), ErrorKind::Model);
    assert_eq!(model.predict(&row).unwrap_err().kind(), ErrorKind::Model);
}

#[test]
fn test_metadata_schema_check() {
    let outcome = TrainingHarness::new(small_leaf_regressor())
        .with_holdout(24)
        .run(&generation(400))
        .unwrap();
    outcome.metadata.validate_schema().unwrap();
    outcome.model.validate().unwrap();

    let mut meta = outcome.metadata;
    meta.features.swap(0, 1);
    assert_eq!(meta.validate_schema().unwrap_err().kind(), ErrorKind::Model);
}

#[test]
fn test_absent_artifacts() {
    let dir = tempdir().unwrap();
    let err = load_model::<TrainedGradientBoosting, _>(dir.path().join("model.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingData);
    assert!(load_metadata(dir.path().join("metadata.json"))
        .unwrap()
        .is_none());
}

#[test]
fn test_baseline_evaluation_window() {
    let series = generation(400);
    let eval = evaluate_baseline(&series, 168, 168).unwrap();

    assert_eq!(eval.test_start, series.timestamp_at(232));
    assert_eq!(eval.test_end, series.last_timestamp());
    // Only the linear trend separates a week from the next one
    assert_relative_eq!(eval.mae, 1.68, max_relative = 1e-6);
}
