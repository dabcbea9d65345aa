// src/dashboard.rs

//! One call per user submission: the diagram and prediction views.

use chrono::NaiveDate;
use log::{info, warn};
use plotters::prelude::BLACK;
use serde::Serialize;

use crate::diagram::{compute_layout, render_diagram_svg, Bounds, DiagramLayout, LayerSpec};
use crate::error::DashboardError;
use crate::models::{Forecaster, PredictionRecord};
use crate::pipeline::{predict_series, PipelineError, PredictionReport};
use crate::utils::market_data::{DateRange, MarketDataSource};
use crate::utils::plotting::{plot_series, ChartOptions, Series, TAB_BLUE, TAB_GREEN, TAB_ORANGE};

pub const DEFAULT_HIDDEN_LAYERS: [usize; 2] = [4, 4];
pub const MAX_HIDDEN_LAYERS: usize = 10;
pub const MAX_LAYER_SIZE: usize = 100;
pub const DEFAULT_SYMBOL: &str = "GOOG";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 1000;

/// Diagram form state.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramRequest {
    pub default_settings: bool,
    pub hidden_layers: Vec<usize>,
}

impl Default for DiagramRequest {
    fn default() -> Self {
        DiagramRequest { default_settings: true, hidden_layers: DEFAULT_HIDDEN_LAYERS.to_vec() }
    }
}

impl DiagramRequest {
    /// `[1] + hidden + [1]`, with hidden sizes bounded like the input widgets.
    pub fn layer_spec(&self) -> Result<LayerSpec, DashboardError> {
        if self.default_settings {
            return Ok(LayerSpec::with_hidden(&DEFAULT_HIDDEN_LAYERS)?);
        }
        let count = self.hidden_layers.len();
        if !(1..=MAX_HIDDEN_LAYERS).contains(&count) {
            return Err(DashboardError::InvalidInput(format!(
                "number of hidden layers must be between 1 and {}, got {}",
                MAX_HIDDEN_LAYERS, count
            )));
        }
        if let Some((i, size)) = self
            .hidden_layers
            .iter()
            .enumerate()
            .find(|(_, s)| !(1..=MAX_LAYER_SIZE).contains(*s))
        {
            return Err(DashboardError::InvalidInput(format!(
                "hidden layer {} must have between 1 and {} nodes, got {}",
                i + 1,
                MAX_LAYER_SIZE,
                size
            )));
        }
        Ok(LayerSpec::with_hidden(&self.hidden_layers)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagramView {
    pub spec: LayerSpec,
    pub layout: DiagramLayout,
    #[serde(skip)]
    pub svg: String,
}

pub fn handle_diagram(request: &DiagramRequest) -> Result<DiagramView, DashboardError> {
    let spec = request.layer_spec()?;
    let layout = compute_layout(Bounds::default(), &spec)?;
    let svg = render_diagram_svg(&layout)?;
    info!(
        "Drew diagram {:?}: {} nodes, {} edges",
        spec.sizes(),
        layout.nodes.len(),
        layout.edges.len()
    );
    Ok(DiagramView { spec, layout, svg })
}

/// Prediction form state; dates are the raw `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub symbol: String,
    pub start: String,
    pub end: String,
}

impl PredictionRequest {
    /// Fills blanks with "GOOG" and the 1000 days before `today`.
    pub fn with_defaults(
        symbol: Option<String>,
        start: Option<String>,
        end: Option<String>,
        today: NaiveDate,
    ) -> Self {
        let fallback = DateRange::last_days(today, DEFAULT_LOOKBACK_DAYS);
        let pick = |value: Option<String>, default: NaiveDate| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.format("%Y-%m-%d").to_string())
        };
        PredictionRequest {
            symbol: symbol
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            start: pick(start, fallback.start),
            end: pick(end, fallback.end),
        }
    }
}

/// Why a prediction page stopped early.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notice {
    pub cause: &'static str,
    pub message: String,
}

impl From<&PipelineError> for Notice {
    fn from(err: &PipelineError) -> Self {
        Notice { cause: err.cause(), message: err.user_message() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PredictionView {
    pub symbol: String,
    pub raw_chart: Option<String>,
    pub records: Vec<PredictionRecord>,
    pub combined_chart: Option<String>,
    pub notice: Option<Notice>,
}

/// Fetches the series, charts it, then predicts the evaluation suffix.
///
/// Pipeline failures become a [`Notice`]; only rendering failures are errors.
pub fn handle_prediction(
    source: &dyn MarketDataSource,
    forecaster: &dyn Forecaster,
    request: &PredictionRequest,
) -> Result<PredictionView, DashboardError> {
    let mut view = PredictionView { symbol: request.symbol.clone(), ..Default::default() };
    let stop = |mut view: PredictionView, err: PipelineError| {
        warn!("Prediction for {} stopped: {}", request.symbol, err);
        view.notice = Some(Notice::from(&err));
        view
    };

    let range = match DateRange::parse(&request.start, &request.end) {
        Ok(range) => range,
        Err(e) => return Ok(stop(view, e.into())),
    };
    let series = match source.fetch(&request.symbol, &range) {
        Ok(series) => series,
        Err(e) => return Ok(stop(view, e.into())),
    };
    info!("Fetched {} rows for {}", series.len(), request.symbol);

    let mut raw_options = ChartOptions::new(&request.symbol, "Adj Close");
    raw_options.grid = false;
    let raw = Series::new(series.adj_close_points(), BLACK).width(1.5);
    view.raw_chart = Some(plot_series(&[raw], &raw_options)?);

    let report = match predict_series(series, forecaster) {
        Ok(report) => report,
        Err(e) => return Ok(stop(view, e)),
    };
    view.combined_chart = Some(combined_chart(&report)?);
    view.records = report.records;
    Ok(view)
}

fn combined_chart(report: &PredictionReport) -> Result<String, DashboardError> {
    let mut options = ChartOptions::new(&report.series.symbol, "Close Price");
    options.title = Some("Original Close Price vs Predicted Close price".to_string());
    let series = [
        Series::new(report.history(), TAB_BLUE).labeled("Train Data"),
        Series::new(report.actual_points(), TAB_ORANGE).labeled("Original Test data"),
        Series::new(report.predicted_points(), TAB_GREEN).labeled("Predicted Test data"),
    ];
    Ok(plot_series(&series, &options)?)
}
