//! Instance endpoints: registration, heartbeat, deregistration, queries.

use crate::api::ApiError;
use crate::models::{InstanceResponse, RegisterInstanceRequest};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

/// `POST /v1/applications/{app_id}/instances/{instance_id}`
pub async fn register_instance(
    State(state): State<AppState>,
    Path((app_id, instance_id)): Path<(String, String)>,
    Json(request): Json<RegisterInstanceRequest>,
) -> Result<Json<InstanceResponse>, ApiError> {
    let stored = state.register_instance(&app_id, &instance_id, request)?;
    Ok(Json(stored.into()))
}

/// `POST /v1/applications/{app_id}/instances/{instance_id}/heartbeat`
pub async fn heartbeat(
    State(state): State<AppState>,
    Path((app_id, instance_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    if state.clients().renew_instance(&app_id, &instance_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::bad_request(
            "failed to process heartbeat, instance is not registered",
        ))
    }
}

/// `DELETE /v1/applications/{app_id}/instances/{instance_id}`
pub async fn deregister_instance(
    State(state): State<AppState>,
    Path((app_id, instance_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    if state.clients().deregister(&app_id, &instance_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("instance", &instance_id))
    }
}

/// `GET /v1/applications/{app_id}/instances`
pub async fn list_instances(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Json<Vec<InstanceResponse>> {
    let instances = state
        .clients()
        .find_all_by_application(&app_id)
        .into_iter()
        .map(InstanceResponse::from)
        .collect();
    Json(instances)
}

/// `GET /v1/applications/{app_id}/instances/{instance_id}`
pub async fn get_instance(
    State(state): State<AppState>,
    Path((app_id, instance_id)): Path<(String, String)>,
) -> Result<Json<InstanceResponse>, ApiError> {
    state
        .clients()
        .find_one_by_application_and_instance_id(&app_id, &instance_id)
        .map(|registration| Json(registration.into()))
        .ok_or_else(|| ApiError::not_found("instance", &instance_id))
}
