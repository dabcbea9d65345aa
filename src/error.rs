// src/error.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::diagram::LayoutError;
use crate::utils::plotting::RenderError;

/// Errors that end a dashboard request.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::InvalidInput(_) | DashboardError::Layout(_) => StatusCode::BAD_REQUEST,
            DashboardError::Render(_) | DashboardError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
