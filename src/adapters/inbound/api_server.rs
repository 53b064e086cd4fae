//! HTTP API Server
//!
//! Inbound adapter exposing the enrichment service over HTTP:
//! per-IP location details, the distance-statistics aggregate and a
//! health probe.

use crate::application::enrichment::EnrichmentService;
use crate::application::stats::DistanceStatsAggregator;
use crate::domain::entities::{CountryDistance, DistanceStats};
use crate::domain::errors::EnrichError;
use crate::domain::ports::KeyValueStore;
use crate::infrastructure::shutdown_signal;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Error body for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Stats response: the stored aggregate plus the derived average.
#[derive(Debug, Serialize)]
pub struct DistanceStatsResponse {
    pub farthest_distance: f64,
    pub farthest_country: String,
    pub closest_distance: f64,
    pub closest_country: String,
    pub total_distance: f64,
    pub total_requests: u64,
    pub average_distance: f64,
    pub country_distances: HashMap<String, CountryDistance>,
}

impl DistanceStatsResponse {
    fn from_stats(stats: DistanceStats) -> Self {
        let average_distance = DistanceStatsAggregator::weighted_average_distance(&stats);
        Self {
            farthest_distance: stats.farthest_distance,
            farthest_country: stats.farthest_country,
            closest_distance: stats.closest_distance,
            closest_country: stats.closest_country,
            total_distance: stats.total_distance,
            total_requests: stats.total_requests,
            average_distance,
            country_distances: stats.country_distances,
        }
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// API server state shared across handlers.
pub struct ApiState {
    service: Arc<EnrichmentService>,
    store: Arc<dyn KeyValueStore>,
}

/// HTTP API server.
pub struct ApiServer {
    state: Arc<ApiState>,
}

impl ApiServer {
    pub fn new(service: Arc<EnrichmentService>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: Arc::new(ApiState { service, store }),
        }
    }

    /// Build the router (exposed separately for tests).
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/ip/:ip", get(get_ip_details))
            .route("/api/stats", get(get_stats))
            .route("/health", get(health))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until a shutdown signal arrives.
    ///
    /// The final Ok(()) is only reached after graceful shutdown.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(self, listen_addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(listen_addr).await?;
        tracing::info!("API server listening on {}", listen_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Map a core error to its user-visible class.
fn error_response(err: &EnrichError) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}

async fn get_ip_details(Path(ip): Path<String>, State(state): State<Arc<ApiState>>) -> Response {
    let ip: IpAddr = match ip.parse() {
        Ok(ip) => ip,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("invalid IP address: {}", ip))),
            )
                .into_response();
        }
    };

    match state.service.get_ip_location_details(ip).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => {
            tracing::warn!("lookup for {} failed: {}", ip, e);
            error_response(&e)
        }
    }
}

async fn get_stats(State(state): State<Arc<ApiState>>) -> Response {
    match DistanceStatsAggregator::load(state.store.as_ref()).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(DistanceStatsResponse::from_stats(stats)),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("stats read failed: {}", e);
            error_response(&e)
        }
    }
}

async fn health() -> Response {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
