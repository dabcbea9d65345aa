// src/api/handlers.rs

use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task;

use crate::api::{pages, AppState};
use crate::dashboard::{
    handle_diagram, handle_prediction, DiagramRequest, PredictionRequest, PredictionView,
};
use crate::error::DashboardError;
use crate::models::PredictionRecord;

/// Query string of the diagram form, e.g. `?default=false&hidden=8,4`.
#[derive(Debug, Deserialize)]
pub struct DiagramQuery {
    pub default: Option<String>,
    pub hidden: Option<String>,
}

impl DiagramQuery {
    pub fn into_request(self) -> Result<DiagramRequest, DashboardError> {
        let default_settings = match self.default.as_deref().map(str::trim) {
            None | Some("") | Some("true") | Some("on") | Some("1") => true,
            Some("false") | Some("off") | Some("0") => false,
            Some(other) => {
                return Err(DashboardError::InvalidInput(format!(
                    "default must be true or false, got '{}'",
                    other
                )))
            }
        };
        if default_settings {
            return Ok(DiagramRequest { default_settings, ..Default::default() });
        }
        let hidden_layers = self
            .hidden
            .as_deref()
            .unwrap_or("")
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>().map_err(|_| {
                    DashboardError::InvalidInput(format!("'{}' is not a node count", s))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DiagramRequest { default_settings, hidden_layers })
    }
}

/// Query string of the prediction form.
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    pub symbol: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl PredictionQuery {
    pub fn into_request(self) -> PredictionRequest {
        PredictionRequest::with_defaults(self.symbol, self.start, self.end, Utc::now().date_naive())
    }
}

#[derive(Serialize)]
pub struct PredictionResponse<'a> {
    pub symbol: &'a str,
    pub records: &'a [PredictionRecord],
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

async fn run_prediction(
    state: &web::Data<AppState>,
    request: PredictionRequest,
) -> Result<PredictionView, DashboardError> {
    let source = Arc::clone(&state.source);
    let forecaster = Arc::clone(&state.forecaster);
    debug!("Prediction requested: {:?}", request);

    // Fetch and inference block, so they run off the server threads.
    task::spawn_blocking(move || handle_prediction(source.as_ref(), forecaster.as_ref(), &request))
        .await
        .map_err(|e| {
            error!("Prediction task failed: {}", e);
            DashboardError::Internal("prediction task failed".to_string())
        })?
}

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let model_path = &state.config.model_path;
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model_path": model_path.display().to_string(),
        "model_present": model_path.exists(),
    }))
}

pub async fn diagram_page(
    query: web::Query<DiagramQuery>,
) -> Result<HttpResponse, DashboardError> {
    let request = query.into_inner().into_request()?;
    let view = handle_diagram(&request)?;
    Ok(html(pages::diagram_page(&request, &view)))
}

pub async fn diagram_json(
    query: web::Query<DiagramQuery>,
) -> Result<HttpResponse, DashboardError> {
    let request = query.into_inner().into_request()?;
    let view = handle_diagram(&request)?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn predict_page(
    state: web::Data<AppState>,
    query: web::Query<PredictionQuery>,
) -> Result<HttpResponse, DashboardError> {
    let request = query.into_inner().into_request();
    let view = run_prediction(&state, request.clone()).await?;
    Ok(html(pages::prediction_page(&request, &view)))
}

pub async fn predict_json(
    state: web::Data<AppState>,
    query: web::Query<PredictionQuery>,
) -> Result<HttpResponse, DashboardError> {
    let view = run_prediction(&state, query.into_inner().into_request()).await?;

    if let Some(notice) = &view.notice {
        return Ok(HttpResponse::UnprocessableEntity().json(json!({
            "error": notice.message,
            "cause": notice.cause,
            "symbol": view.symbol,
        })));
    }

    Ok(HttpResponse::Ok().json(PredictionResponse { symbol: &view.symbol, records: &view.records }))
}
