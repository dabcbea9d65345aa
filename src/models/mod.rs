// src/models/mod.rs

pub mod forecaster;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of a fetched price table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub adj_close: f64,
}

/// Date-ordered closing prices for one symbol.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts the bars by date.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        PriceSeries { symbol: symbol.into(), bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn close_points(&self) -> Vec<(NaiveDate, f64)> {
        self.bars.iter().map(|bar| (bar.date, bar.close)).collect()
    }

    pub fn adj_close_points(&self) -> Vec<(NaiveDate, f64)> {
        self.bars.iter().map(|bar| (bar.date, bar.adj_close)).collect()
    }
}

/// Predicted and actual close for one evaluation date.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionRecord {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

// Re-export forecasting components
pub use forecaster::{ArtifactForecaster, DenseForecaster, ForecastError, Forecaster, Neuron};
