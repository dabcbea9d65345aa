// src/utils/mod.rs

pub mod market_data;
pub mod plotting;
pub mod scaling;

pub use market_data::{DateRange, FetchError, MarketDataSource, YahooClient};
pub use plotting::{plot_series, ChartOptions, RenderError, Series};
pub use scaling::{MinMaxScaler, ScalerError};
