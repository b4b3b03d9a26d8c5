// src/main.rs

use std::sync::Arc;

use clarity_survey::config::Config;
use clarity_survey::db;
use clarity_survey::models::question::load_dataset;
use clarity_survey::routes;
use clarity_survey::state::AppState;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // The dataset is read once; the service refuses to start without it.
    let questions = load_dataset(&config.dataset_path).expect("Failed to load question dataset");

    let pool = db::init_pool(&config.database_url, 5)
        .await
        .expect("Failed to open database");
    tracing::info!("Database connected...");

    let state = AppState {
        pool,
        config: config.clone(),
        questions: Arc::new(questions),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
