// src/utils/market_data.rs

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{PriceBar, PriceSeries};

/// Why a price table could not be produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("unknown or delisted symbol '{0}'")]
    InvalidSymbol(String),
    #[error("no price data between {start} and {end}")]
    EmptyRange { start: String, end: String },
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed market data response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Stable tag used by the JSON API.
    pub fn cause(&self) -> &'static str {
        match self {
            FetchError::InvalidSymbol(_) => "invalid_symbol",
            FetchError::EmptyRange { .. } => "empty_range",
            FetchError::InvalidDate(_) => "invalid_date",
            FetchError::Network(_) => "network_error",
            FetchError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Notice shown on the dashboard page.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::InvalidSymbol(_) => "Please check the Symbol name".to_string(),
            FetchError::EmptyRange { start, end } => {
                format!("No trading data between {} and {}. Please widen the date range.", start, end)
            }
            FetchError::InvalidDate(_) => "Please enter dates as YYYY-MM-DD.".to_string(),
            FetchError::Network(_) | FetchError::MalformedResponse(_) => {
                "The market data service is unavailable. Please try again.".to_string()
            }
        }
    }
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parses two `YYYY-MM-DD` strings; `start` must precede `end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, FetchError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| FetchError::InvalidDate(s.to_string()))
        };
        let range = DateRange { start: parse(start)?, end: parse(end)? };
        if range.start >= range.end {
            return Err(FetchError::EmptyRange { start: start.to_string(), end: end.to_string() });
        }
        Ok(range)
    }

    /// The `days` days leading up to `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        DateRange { start: today - chrono::Duration::days(days), end: today }
    }

    fn unix_bounds(&self) -> (i64, i64) {
        let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc().timestamp();
        (midnight(self.start), midnight(self.end))
    }
}

/// Source of daily price tables.
pub trait MarketDataSource: Send + Sync {
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries, FetchError>;
}

// Structures of the Yahoo Finance v8 chart response
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Turns a chart response body into a price table.
///
/// Days without a close are skipped; a missing adjusted close falls back to the close.
pub fn parse_chart_response(
    symbol: &str,
    range: &DateRange,
    body: &str,
) -> Result<PriceSeries, FetchError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        debug!(
            "Chart API error for {}: {} ({})",
            symbol,
            error.code,
            error.description.unwrap_or_default()
        );
        return Err(FetchError::InvalidSymbol(symbol.to_string()));
    }

    let empty = || FetchError::EmptyRange {
        start: range.start.format("%Y-%m-%d").to_string(),
        end: range.end.format("%Y-%m-%d").to_string(),
    };
    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(empty)?;

    let closes = result.indicators.quote.first().map(|q| q.close.as_slice()).unwrap_or(&[]);
    let adj_closes =
        result.indicators.adjclose.first().map(|a| a.adjclose.as_slice()).unwrap_or(&[]);

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let adj_close = adj_closes.get(i).copied().flatten().unwrap_or(close);
        let date = ts
            .checked_add(result.meta.gmtoffset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| FetchError::MalformedResponse(format!("bad timestamp {}", ts)))?
            .date_naive();
        bars.push(PriceBar { date, close, adj_close });
    }

    if bars.is_empty() {
        return Err(empty());
    }
    Ok(PriceSeries::new(symbol, bars))
}

/// Daily bars from the Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    timeout: Duration,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        YahooClient { base_url: base_url.into(), timeout }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Network(format!("bad market data URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Network("market data URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(symbol);
        Ok(url)
    }
}

impl MarketDataSource for YahooClient {
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries, FetchError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(FetchError::InvalidSymbol(symbol.to_string()));
        }

        // The blocking client owns a runtime, so it is built on the calling worker thread.
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let (period1, period2) = range.unix_bounds();
        let url = self.chart_url(symbol)?;
        debug!("Fetching {} from {} to {}", symbol, range.start, range.end);

        let response = client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| FetchError::Network(e.to_string()))?;

        match parse_chart_response(symbol, range, &body) {
            Err(FetchError::MalformedResponse(_)) if !status.is_success() => {
                warn!("Chart API returned HTTP {} for {}", status, symbol);
                Err(FetchError::Network(format!("HTTP {}", status)))
            }
            other => other,
        }
    }
}
