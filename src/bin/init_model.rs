// src/bin/init_model.rs

//! Writes a freshly initialised forecaster artifact.
//!
//! Usage: `init_model [PATH] [HIDDEN_UNITS]`

use log::info;

use nn_stock_dashboard::config::DEFAULT_MODEL_PATH;
use nn_stock_dashboard::models::DenseForecaster;
use nn_stock_dashboard::pipeline::WINDOW;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .or_else(|| std::env::var("MODEL_PATH").ok())
        .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
    let hidden: usize = match args.next() {
        Some(n) => n.parse()?,
        None => 32,
    };

    let model = DenseForecaster::new(WINDOW, hidden);
    model.save_to_file(&path)?;
    info!("Saved forecaster with window {} and {} hidden units to {}", WINDOW, hidden, path);
    println!("{}", path);
    Ok(())
}
