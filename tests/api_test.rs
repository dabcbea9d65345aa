use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Duration, NaiveDate};
use ndarray::{Array2, Array3, Axis};
use serde_json::Value;

use nn_stock_dashboard::api::{self, AppState};
use nn_stock_dashboard::dashboard::{handle_prediction, PredictionRequest};
use nn_stock_dashboard::models::{ForecastError, Forecaster, PriceBar, PriceSeries};
use nn_stock_dashboard::utils::market_data::{DateRange, FetchError, MarketDataSource};
use nn_stock_dashboard::AppConfig;

const ROWS: usize = 400;

/// Serves a synthetic series for every symbol except "ZZZZINVALID".
struct StubSource;

impl MarketDataSource for StubSource {
    fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries, FetchError> {
        if symbol == "ZZZZINVALID" {
            return Err(FetchError::InvalidSymbol(symbol.to_string()));
        }
        let bars = (0..ROWS)
            .map(|i| {
                let close = 50.0 + (i % 17) as f64;
                PriceBar { date: range.start + Duration::days(i as i64), close, adj_close: close }
            })
            .collect();
        Ok(PriceSeries::new(symbol, bars))
    }
}

struct Persistence;

impl Forecaster for Persistence {
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>, ForecastError> {
        let last = inputs.shape()[1] - 1;
        Ok(inputs.index_axis(Axis(1), last).to_owned())
    }
}

fn state() -> web::Data<AppState> {
    web::Data::new(AppState {
        config: AppConfig::default(),
        source: Arc::new(StubSource),
        forecaster: Arc::new(Persistence),
    })
}

async fn get(uri: &str) -> (StatusCode, String) {
    let app = test::init_service(App::new().app_data(state()).configure(api::configure)).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

#[actix_web::test]
async fn test_health() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model_path"], AppConfig::default().model_path.display().to_string());
    assert!(json["model_present"].is_boolean());
}

#[actix_web::test]
async fn test_default_diagram_json() {
    let (status, body) = get("/api/diagram").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["spec"], serde_json::json!([1, 4, 4, 1]));
    assert_eq!(json["layout"]["nodes"].as_array().unwrap().len(), 10);
    assert_eq!(json["layout"]["edges"].as_array().unwrap().len(), 20);
}

#[actix_web::test]
async fn test_custom_diagram_page_draws_every_node() {
    let (status, body) = get("/diagram?default=false&hidden=3,2").await;
    assert_eq!(status, StatusCode::OK);

    // Each node is a filled circle plus an outline.
    assert_eq!(body.matches("<circle").count(), 2 * (1 + 3 + 2 + 1));
    assert!(body.contains("Input"));
    assert!(body.contains("Output"));
}

#[actix_web::test]
async fn test_out_of_range_layers_are_bad_requests() {
    let (status, body) = get("/diagram?default=false&hidden=4,0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("hidden layer 2"));

    let (status, _) = get("/api/diagram?default=false&hidden=four").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_default_diagram_ignores_custom_sizes() {
    let (status, body) = get("/api/diagram?default=true&hidden=four").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["spec"], serde_json::json!([1, 4, 4, 1]));
}

#[actix_web::test]
async fn test_invalid_symbol_json_reports_cause() {
    let (status, body) =
        get("/api/predict?symbol=ZZZZINVALID&start=2023-01-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["cause"], "invalid_symbol");
    assert_eq!(json["error"], "Please check the Symbol name");
}

#[actix_web::test]
async fn test_invalid_symbol_page_shows_notice_without_charts() {
    let (status, body) = get("/predict?symbol=ZZZZINVALID").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please check the Symbol name"));
    assert!(!body.contains("<svg"));
}

#[actix_web::test]
async fn test_bad_date_is_reported() {
    let (status, body) = get("/api/predict?symbol=GOOG&start=2023-02-30&end=2024-01-01").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["cause"], "invalid_date");
}

#[actix_web::test]
async fn test_prediction_json_records() {
    let (status, body) = get("/api/predict?symbol=GOOG&start=2022-01-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    let records = json["records"].as_array().unwrap();
    // 400 rows split at 280, minus one window.
    assert_eq!(records.len(), ROWS - 280 - 100);
    assert_eq!(records[0]["date"], "2023-01-16");
}

#[actix_web::test]
async fn test_prediction_page_has_both_charts_and_table() {
    let (status, body) = get("/predict?symbol=GOOG&start=2022-01-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("<svg").count(), 2);
    assert!(body.contains("Adj Close of GOOG Data"));
    assert!(body.contains("Original Close Price vs Predicted Close price"));
    assert!(body.contains("Predicted Test data"));
    assert_eq!(body.matches("<tr><td>").count(), 20);
}

#[core::prelude::v1::test]
fn test_failed_fetch_produces_no_chart() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let request = PredictionRequest::with_defaults(Some("ZZZZINVALID".into()), None, None, today);
    let view = handle_prediction(&StubSource, &Persistence, &request).unwrap();

    assert_eq!(view.notice.unwrap().cause, "invalid_symbol");
    assert!(view.raw_chart.is_none());
    assert!(view.combined_chart.is_none());
    assert!(view.records.is_empty());
}
