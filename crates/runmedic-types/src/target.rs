//! Inspection target and the caller credential forwarded upstream.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheme prefix required on the inbound `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Identifies the workflow to inspect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InspectionTarget {
    pub subscription_id: String,
    pub resource_group: String,
    pub workflow_name: String,
}

impl InspectionTarget {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        workflow_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            workflow_name: workflow_name.into(),
        }
    }
}

impl fmt::Display for InspectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.subscription_id, self.resource_group, self.workflow_name
        )
    }
}

/// The caller's full `Authorization` header value (`Bearer <token>`).
///
/// It is forwarded verbatim to the resource-management API. `Debug` and
/// `Display` never print the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Accept a header value only if it carries the `Bearer ` scheme.
    pub fn from_header(value: &str) -> Option<Self> {
        value
            .starts_with(BEARER_PREFIX)
            .then(|| Self(value.to_string()))
    }

    /// Build a credential from a bare token.
    pub fn from_token(token: &str) -> Self {
        Self(format!("{}{}", BEARER_PREFIX, token))
    }

    /// The header value to forward.
    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential(***)")
    }
}

impl fmt::Display for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer ***")
    }
}
