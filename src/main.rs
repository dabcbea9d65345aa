// src/main.rs

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{info, warn};

use nn_stock_dashboard::api::{self, AppState};
use nn_stock_dashboard::AppConfig;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    // Initialize environment variables
    dotenv::dotenv().ok();

    // Initialize the logger
    env_logger::init();

    let config = AppConfig::from_env();
    if !config.model_path.exists() {
        warn!(
            "Model artifact {} not found; predictions will fail until it exists (see `init_model`)",
            config.model_path.display()
        );
    }

    let bind = (config.bind.clone(), config.port);
    let frontend_dir = config.frontend_dir.clone();
    let app_state = web::Data::new(AppState::from_config(config));

    info!("Dashboard listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        // Configure CORS to allow requests from any frontend
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(api::configure)
            .service(fs::Files::new("/", frontend_dir.clone()).index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await
}
