use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod retriever;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize services");
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let analysis = web::Data::new(state.analysis);

    tracing::info!("Starting Veritas analysis server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(analysis.clone())
            .configure(api::analyze::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
