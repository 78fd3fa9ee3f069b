use chrono::{TimeZone, Utc};
use gen_forecast::error::{ErrorKind, ForecastError};
use rstest::rstest;

#[rstest]
#[case(ForecastError::MissingDataError("x".into()), ErrorKind::MissingData)]
#[case(ForecastError::InsufficientHistoryError { needed: 168, got: 3 }, ErrorKind::InsufficientHistory)]
#[case(ForecastError::ValidationError("x".into()), ErrorKind::Validation)]
#[case(ForecastError::InvalidParameter("x".into()), ErrorKind::Validation)]
#[case(ForecastError::ModelError("x".into()), ErrorKind::Model)]
#[case(ForecastError::CsvError("x".into()), ErrorKind::Internal)]
fn test_error_kinds(#[case] err: ForecastError, #[case] kind: ErrorKind) {
    assert_eq!(err.kind(), kind);
}

#[test]
fn test_missing_feature_message_names_context() {
    let err = ForecastError::MissingFeatureError {
        timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 13, 0, 0).unwrap(),
        features: vec!["lag_24".to_string(), "roll_mean_168".to_string()],
    };
    assert_eq!(err.kind(), ErrorKind::MissingFeature);
    assert_eq!(
        err.to_string(),
        "Missing features at 2026-01-05 13:00:00 UTC: lag_24, roll_mean_168"
    );
}

#[test]
fn test_insufficient_history_message() {
    let err = ForecastError::InsufficientHistoryError { needed: 168, got: 3 };
    assert_eq!(
        err.to_string(),
        "Insufficient history: need at least 168 rows, got 3"
    );
}

#[test]
fn test_io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: ForecastError = io.into();
    assert_eq!(err.kind(), ErrorKind::Internal);
}
