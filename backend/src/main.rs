use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use warranty_backend::config::Settings;
use warranty_backend::io::rest::{api_router, AppState};
use warranty_backend::storage::sqlite::DbConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let settings = Settings::from_env()?;

    info!("Setting up database");
    let db = DbConnection::new(&settings.database_url).await?;
    let state = AppState::new(db);

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(settings.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api_router(state))
        .layer(cors);

    info!("Starting server on {}", settings.bind_addr);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!("Listening on {}", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
