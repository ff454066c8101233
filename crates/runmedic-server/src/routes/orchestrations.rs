//! Checkpointed inspection endpoints.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use runmedic_pipeline::{InstanceStatusView, OrchestrationHost, OrchestrationInput};
use serde::{Deserialize, Serialize};

use crate::auth::ForwardedCredential;
use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::validation::parse_target;

/// Response to a started orchestration.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartedResponse {
    pub id: String,
    #[serde(rename = "statusQueryGetUri")]
    pub status_query_get_uri: String,
}

/// Path under which an instance's status is served.
pub fn status_path(id: &str) -> String {
    format!("/api/v1/orchestrations/{}", id)
}

fn host(state: &AppState) -> Result<&Arc<OrchestrationHost>> {
    state
        .orchestrations
        .as_ref()
        .ok_or_else(|| ServerError::ServiceUnavailable("orchestration is disabled".to_string()))
}

/// POST /api/v1/orchestrations
pub async fn start_orchestration_handler(
    State(state): State<AppState>,
    ForwardedCredential(credential): ForwardedCredential,
    body: Bytes,
) -> Result<Response> {
    let target = parse_target(&body)?;
    let host = host(&state)?;

    let id = host.start(OrchestrationInput::new(target, credential))?;
    let location = status_path(&id);
    tracing::info!(instance_id = %id, "Orchestration accepted");

    Ok((
        StatusCode::ACCEPTED,
        [(LOCATION, location.clone())],
        Json(StartedResponse {
            id,
            status_query_get_uri: location,
        }),
    )
        .into_response())
}

/// GET /api/v1/orchestrations/{id}
pub async fn orchestration_status_handler(
    State(state): State<AppState>,
    ForwardedCredential(_credential): ForwardedCredential,
    Path(id): Path<String>,
) -> Result<Json<InstanceStatusView>> {
    let host = host(&state)?;

    host.status(&id)?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("Orchestration '{}' not found", id)))
}
