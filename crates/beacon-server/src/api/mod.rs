//! REST API for the registry.
//!
//! Route table mirrors the registry contract: instance registration,
//! heartbeat, deregistration and queries under `/v1/applications`, peer
//! management and sampling under `/v1/peers`.

pub mod instances;
pub mod peers;

use crate::models::{ErrorResponse, HealthResponse};
use crate::state::{AppState, StateError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router with all routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/applications/{app_id}/instances",
            get(instances::list_instances),
        )
        .route(
            "/v1/applications/{app_id}/instances/{instance_id}",
            post(instances::register_instance)
                .get(instances::get_instance)
                .delete(instances::deregister_instance),
        )
        .route(
            "/v1/applications/{app_id}/instances/{instance_id}/heartbeat",
            post(instances::heartbeat),
        )
        .route(
            "/v1/peers",
            post(peers::register_peer).get(peers::list_peers),
        )
        .route("/v1/peers/batch", post(peers::register_peers))
        .route("/v1/peers/sample", get(peers::sample_peers))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Error type returned by handlers; renders as a JSON body with the
/// matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::not_found(resource, id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InvalidRegistration { .. } | StateError::InvalidPeer { .. } => {
                ApiError::bad_request(err.to_string())
            }
        }
    }
}
