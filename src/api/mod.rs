// src/api/mod.rs

use std::sync::Arc;

use actix_web::web;

use crate::config::AppConfig;
use crate::models::{ArtifactForecaster, Forecaster};
use crate::utils::market_data::{MarketDataSource, YahooClient};

/// Shared, read-only collaborators of every request.
pub struct AppState {
    pub config: AppConfig,
    pub source: Arc<dyn MarketDataSource>,
    pub forecaster: Arc<dyn Forecaster>,
}

impl AppState {
    /// Yahoo chart data and the model artifact named in `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let source = YahooClient::new(config.market_data_url.clone(), config.fetch_timeout);
        let forecaster = ArtifactForecaster::new(config.model_path.clone());
        AppState { config, source: Arc::new(source), forecaster: Arc::new(forecaster) }
    }
}

pub mod handlers;
pub mod pages;

pub use handlers::{diagram_json, diagram_page, health, predict_json, predict_page};

/// Registers the dashboard routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/diagram", web::get().to(diagram_page))
        .route("/predict", web::get().to(predict_page))
        .route("/api/diagram", web::get().to(diagram_json))
        .route("/api/predict", web::get().to(predict_json));
}
