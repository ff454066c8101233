//! Derived failure records.
//!
//! A [`FailureRecord`] maps one failed run to the failed actions retained for
//! it. On the wire it is a single-key object:
//!
//! ```json
//! { "<run id>": { "workflow-error": [ { "properties": {...}, "name": ..., "type": ... } ] } }
//! ```

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::run::{RunStatus, WorkflowAction};

/// Summary of a single failed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub properties: FailureProperties,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureProperties {
    pub status: Option<RunStatus>,
    pub code: Option<Value>,
    /// The action's error object verbatim, `{}` when the action had none.
    pub error: Value,
}

impl FailureDetail {
    pub fn from_action(action: &WorkflowAction) -> Self {
        let error = action
            .properties
            .error
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));

        Self {
            properties: FailureProperties {
                status: action.properties.status.clone(),
                code: action.properties.code.clone(),
                error,
            },
            name: action.name.clone(),
            kind: action.kind.clone(),
        }
    }
}

/// Failed actions retained for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub run_id: String,
    pub details: Vec<FailureDetail>,
}

impl FailureRecord {
    pub fn new(run_id: impl Into<String>, details: Vec<FailureDetail>) -> Self {
        Self {
            run_id: run_id.into(),
            details,
        }
    }
}

#[derive(Serialize)]
struct WorkflowErrorsRef<'a> {
    #[serde(rename = "workflow-error")]
    workflow_error: &'a [FailureDetail],
}

#[derive(Deserialize)]
struct WorkflowErrors {
    #[serde(rename = "workflow-error", default)]
    workflow_error: Vec<FailureDetail>,
}

impl Serialize for FailureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.run_id,
            &WorkflowErrorsRef {
                workflow_error: &self.details,
            },
        )?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for FailureRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, WorkflowErrors>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!(
                "failure record must have exactly one run id, found {}",
                map.len()
            )));
        }
        let (run_id, errors) = map
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("empty failure record"))?;
        Ok(Self {
            run_id,
            details: errors.workflow_error,
        })
    }
}
