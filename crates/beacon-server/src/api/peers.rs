//! Peer endpoints: registration, listing, sampling.

use crate::api::ApiError;
use crate::models::{PeerDto, RegisterPeersResponse};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use beacon_core::constants::PEER_SAMPLE_COUNT_DEFAULT;
use serde::Deserialize;

/// Query parameters for peer sampling.
#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    /// Number of distinct peers to return.
    pub count: Option<usize>,
}

/// `POST /v1/peers`
pub async fn register_peer(
    State(state): State<AppState>,
    Json(dto): Json<PeerDto>,
) -> Result<StatusCode, ApiError> {
    state.register_peer(dto)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/peers/batch`
pub async fn register_peers(
    State(state): State<AppState>,
    Json(dtos): Json<Vec<PeerDto>>,
) -> Result<Json<RegisterPeersResponse>, ApiError> {
    let registered = state.register_peers(dtos)?;
    Ok(Json(RegisterPeersResponse { registered }))
}

/// `GET /v1/peers`
pub async fn list_peers(State(state): State<AppState>) -> Json<Vec<PeerDto>> {
    let peers = state
        .peers()
        .find_all()
        .into_iter()
        .map(PeerDto::from)
        .collect();
    Json(peers)
}

/// `GET /v1/peers/sample?count=n`
pub async fn sample_peers(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> Json<Vec<PeerDto>> {
    let count = query.count.unwrap_or(PEER_SAMPLE_COUNT_DEFAULT);
    let peers = state
        .peers()
        .sample(count)
        .into_iter()
        .map(PeerDto::from)
        .collect();
    Json(peers)
}
