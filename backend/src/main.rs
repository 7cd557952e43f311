use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use tutor_tracker_backend::domain::auth::LocalAuthProvider;
use tutor_tracker_backend::domain::notifier::LogNotifier;
use tutor_tracker_backend::rest::{self, AppState};
use tutor_tracker_backend::storage::csv::CsvConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Opening data directory");
    let connection = Arc::new(CsvConnection::new_default()?);

    let auth = Arc::new(LocalAuthProvider::new(connection.clone()));
    let notifier = Arc::new(LogNotifier);
    let state = AppState::new(connection, auth, notifier);

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", rest::router(state))
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
