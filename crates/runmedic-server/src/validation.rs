//! Request body validation.

use runmedic_types::InspectionTarget;
use serde_json::{Map, Value};

use crate::error::ServerError;

/// Parse an inspection request body.
///
/// The body must be a JSON object. `subscription_id`, `resource_group` and
/// `workflow_name` must each be a non-empty string; anything else counts as
/// missing. Unknown fields are ignored.
pub fn parse_target(body: &[u8]) -> Result<InspectionTarget, ServerError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Request body is not JSON");
        ServerError::invalid_payload()
    })?;
    let Value::Object(fields) = value else {
        return Err(ServerError::invalid_payload());
    };

    match (
        required(&fields, "subscription_id"),
        required(&fields, "resource_group"),
        required(&fields, "workflow_name"),
    ) {
        (Some(subscription), Some(group), Some(workflow)) => {
            Ok(InspectionTarget::new(subscription, group, workflow))
        }
        _ => Err(ServerError::missing_parameters()),
    }
}

fn required<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
