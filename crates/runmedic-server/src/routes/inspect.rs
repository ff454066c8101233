//! Direct inspection endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use runmedic_pipeline::{InspectionOutcome, NO_FAILURES_MESSAGE};

use crate::auth::ForwardedCredential;
use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::validation::parse_target;

/// POST /api/v1/inspect
///
/// Responds with the remediation report as JSON, or the plain text
/// `No failed run actions found.` when no failed action survived.
pub async fn inspect_handler(
    State(state): State<AppState>,
    ForwardedCredential(credential): ForwardedCredential,
    body: Bytes,
) -> Result<Response> {
    let target = parse_target(&body)?;

    match state.driver.inspect(&target, &credential).await? {
        InspectionOutcome::NoFailures => Ok(NO_FAILURES_MESSAGE.into_response()),
        InspectionOutcome::Remediated(report) => Ok(Json(report).into_response()),
        InspectionOutcome::RemediationUnavailable {
            failed_run_actions,
            reason,
        } => {
            tracing::warn!(
                workflow = %target,
                failed_runs = failed_run_actions.len(),
                reason = %reason,
                "Remediation unavailable"
            );
            Err(ServerError::RemediationUnavailable)
        }
    }
}
