// src/lib.rs

pub mod api;
pub mod config;
pub mod dashboard;
pub mod diagram;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use config::AppConfig;
pub use error::DashboardError;
