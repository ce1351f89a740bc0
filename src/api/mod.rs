//! HTTP layer exposing salary benchmarks as JSON and CSV.

pub mod routes;
pub mod types;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    data::{hh::VacancyClient, rates::RateClient},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub vacancies: VacancyClient,
    pub rates: RateClient,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self {
            vacancies: VacancyClient::new(&settings)?,
            rates: RateClient::new(&settings)?,
            settings,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/benchmark/search", post(routes::search))
        .route("/benchmark/analyze", post(routes::analyze))
        .route("/benchmark/export", post(routes::export))
        .route("/benchmark/rates", get(routes::rates))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let router = router(AppState::new(settings)?);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving salary-bench API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
