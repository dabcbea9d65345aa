// src/pipeline.rs

use chrono::NaiveDate;
use log::debug;
use ndarray::Array3;
use serde::Serialize;
use thiserror::Error;

use crate::models::{ForecastError, Forecaster, PredictionRecord, PriceSeries};
use crate::utils::market_data::FetchError;
use crate::utils::scaling::{MinMaxScaler, ScalerError};

/// Samples per inference window.
pub const WINDOW: usize = 100;
/// Share of the series kept as history before the evaluation suffix.
pub const SPLIT_RATIO: f64 = 0.7;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("need more than {needed} evaluation samples, got {available}")]
    InsufficientData { needed: usize, available: usize },
    #[error(transparent)]
    Scale(#[from] ScalerError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error("forecaster returned {actual} predictions for {expected} windows")]
    PredictionCount { expected: usize, actual: usize },
}

impl PipelineError {
    /// Stable tag used by the JSON API.
    pub fn cause(&self) -> &'static str {
        match self {
            PipelineError::Fetch(e) => e.cause(),
            PipelineError::InsufficientData { .. } => "insufficient_data",
            PipelineError::Scale(_) => "invalid_prices",
            PipelineError::Forecast(_) | PipelineError::PredictionCount { .. } => "model_error",
        }
    }

    /// Notice shown on the dashboard page.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Fetch(e) => e.user_message(),
            PipelineError::InsufficientData { .. } => format!(
                "Not enough trading days to predict: the last 30% of the range needs more than {} rows. Please select a longer date range.",
                WINDOW
            ),
            PipelineError::Scale(_) => "The fetched prices could not be scaled.".to_string(),
            PipelineError::Forecast(_) | PipelineError::PredictionCount { .. } => {
                "The forecasting model is unavailable.".to_string()
            }
        }
    }
}

/// Result of one prediction run.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub series: PriceSeries,
    pub split_point: usize,
    pub scaler: MinMaxScaler,
    pub records: Vec<PredictionRecord>,
}

impl PredictionReport {
    /// Closes up to the first predicted date, shown as "Train Data".
    pub fn history(&self) -> Vec<(NaiveDate, f64)> {
        let end = (self.split_point + WINDOW).min(self.series.len());
        self.series.close_points()[..end].to_vec()
    }

    pub fn actual_points(&self) -> Vec<(NaiveDate, f64)> {
        self.records.iter().map(|r| (r.date, r.actual)).collect()
    }

    pub fn predicted_points(&self) -> Vec<(NaiveDate, f64)> {
        self.records.iter().map(|r| (r.date, r.predicted)).collect()
    }
}

/// Position at which the evaluation suffix starts.
pub fn split_point(len: usize) -> usize {
    (len as f64 * SPLIT_RATIO) as usize
}

/// Stacks every `[i - window, i)` slice of `scaled` into an `(N, window, 1)` tensor
/// together with the value at `i`.
pub fn sliding_windows(scaled: &[f64], window: usize) -> (Array3<f64>, Vec<f64>) {
    let count = scaled.len().saturating_sub(window);
    let inputs = Array3::from_shape_fn((count, window, 1), |(n, t, _)| scaled[n + t]);
    let targets = scaled[window.min(scaled.len())..].to_vec();
    (inputs, targets)
}

/// Scales the evaluation suffix, predicts every window and maps the results back to prices.
///
/// The scaler is fitted on the suffix alone.
pub fn predict_series(
    series: PriceSeries,
    forecaster: &dyn Forecaster,
) -> Result<PredictionReport, PipelineError> {
    let split = split_point(series.len());
    let closes = series.closes();
    let suffix = &closes[split..];
    if suffix.len() <= WINDOW {
        return Err(PipelineError::InsufficientData { needed: WINDOW, available: suffix.len() });
    }

    let scaler = MinMaxScaler::fit(suffix)?;
    let scaled = scaler.transform(suffix);
    let (inputs, targets) = sliding_windows(&scaled, WINDOW);
    debug!("Built {} windows from {} evaluation samples", targets.len(), suffix.len());

    let output = forecaster.predict_batch(&inputs)?;
    let predictions: Vec<f64> = output.iter().copied().collect();
    if predictions.len() != targets.len() {
        return Err(PipelineError::PredictionCount {
            expected: targets.len(),
            actual: predictions.len(),
        });
    }

    let actual = scaler.inverse_transform(&targets);
    let predicted = scaler.inverse_transform(&predictions);
    let records = series.bars[split + WINDOW..]
        .iter()
        .zip(actual.into_iter().zip(predicted))
        .map(|(bar, (actual, predicted))| PredictionRecord { date: bar.date, actual, predicted })
        .collect();

    Ok(PredictionReport { series, split_point: split, scaler, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_truncates_like_integer_cast() {
        assert_eq!(split_point(10), 7);
        assert_eq!(split_point(501), 350);
        assert_eq!(split_point(0), 0);
    }

    #[test]
    fn windows_slide_one_sample_at_a_time() {
        let scaled: Vec<f64> = (0..6).map(|v| v as f64).collect();
        let (inputs, targets) = sliding_windows(&scaled, 3);
        assert_eq!(inputs.shape(), &[3, 3, 1]);
        assert_eq!(inputs[[1, 0, 0]], 1.0);
        assert_eq!(inputs[[2, 2, 0]], 4.0);
        assert_eq!(targets, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn short_input_yields_no_windows() {
        let (inputs, targets) = sliding_windows(&[0.1, 0.2], 3);
        assert_eq!(inputs.shape(), &[0, 3, 1]);
        assert!(targets.is_empty());
    }
}
