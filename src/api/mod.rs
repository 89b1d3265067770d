mod create_reminder;
mod error;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, Method, StatusCode, header},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::appsettings::ServerSettings;
use crate::clock::Clock;
use crate::recurrence::ReminderZone;
use crate::storage::ReminderStorage;

pub struct AppState {
    storage: Arc<dyn ReminderStorage>,
    zone: ReminderZone,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn ReminderStorage>,
        zone: ReminderZone,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            zone,
            clock,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/process-reminder",
            post(create_reminder::create_reminder).options(preflight),
        )
        .layer(cors_layer())
        .with_state(Arc::new(state))
}

pub async fn serve(settings: &ServerSettings, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

// Pre-flight requests carrying CORS headers are answered by the layer; bare OPTIONS land here.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
