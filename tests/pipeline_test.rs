use chrono::{Duration, NaiveDate};
use ndarray::{Array2, Array3, Axis};

use nn_stock_dashboard::models::{ForecastError, Forecaster, PriceBar, PriceSeries};
use nn_stock_dashboard::pipeline::{predict_series, split_point, PipelineError, WINDOW};

/// Predicts the last value of each window.
struct Persistence;

impl Forecaster for Persistence {
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>, ForecastError> {
        let last = inputs.shape()[1] - 1;
        Ok(inputs.index_axis(Axis(1), last).to_owned())
    }
}

/// Returns one value too few.
struct Truncating;

impl Forecaster for Truncating {
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>, ForecastError> {
        Ok(Array2::zeros((inputs.shape()[0].saturating_sub(1), 1)))
    }
}

fn series(len: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let bars = (0..len)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.3).sin() * 10.0 + i as f64 * 0.05;
            PriceBar { date: start + Duration::days(i as i64), close, adj_close: close - 1.0 }
        })
        .collect();
    PriceSeries::new("TEST", bars)
}

#[test]
fn test_record_count_and_first_date() {
    let data = series(600);
    let split = split_point(data.len());
    let report = predict_series(data.clone(), &Persistence).unwrap();

    assert_eq!(split, 420);
    assert_eq!(report.split_point, split);
    assert_eq!(report.records.len(), (data.len() - split) - WINDOW);
    assert_eq!(report.records[0].date, data.bars[split + WINDOW].date);
    assert_eq!(report.records.last().unwrap().date, data.bars.last().unwrap().date);
}

#[test]
fn test_values_return_to_price_units() {
    let data = series(500);
    let split = split_point(data.len());
    let report = predict_series(data.clone(), &Persistence).unwrap();

    for (k, record) in report.records.iter().enumerate() {
        let i = split + WINDOW + k;
        assert!((record.actual - data.bars[i].close).abs() < 1e-9);
        assert!((record.predicted - data.bars[i - 1].close).abs() < 1e-9);
    }
}

#[test]
fn test_scaler_is_fitted_on_evaluation_suffix() {
    let data = series(400);
    let split = split_point(data.len());
    let report = predict_series(data.clone(), &Persistence).unwrap();

    let suffix = &data.closes()[split..];
    let min = suffix.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = suffix.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(report.scaler.data_min, min);
    assert_eq!(report.scaler.data_max, max);
}

#[test]
fn test_history_runs_up_to_first_prediction() {
    let data = series(450);
    let report = predict_series(data.clone(), &Persistence).unwrap();
    let history = report.history();

    assert_eq!(history.len(), report.split_point + WINDOW);
    assert_eq!(history.last().unwrap().0 + Duration::days(1), report.records[0].date);
}

#[test]
fn test_short_suffix_is_insufficient() {
    // 340 rows leave a 103-row suffix, 330 rows leave exactly 100.
    assert!(predict_series(series(340), &Persistence).is_ok());
    let err = predict_series(series(330), &Persistence).unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientData { needed: 100, .. }));
    assert_eq!(err.cause(), "insufficient_data");
}

#[test]
fn test_wrong_prediction_count_is_an_error() {
    let err = predict_series(series(500), &Truncating).unwrap_err();
    assert!(matches!(err, PipelineError::PredictionCount { .. }));
}
