//! Workflow details and the code excerpt sent to the remediation model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::run::null_as_default;

/// Response of the get-workflow call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowDetails {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub properties: WorkflowProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowProperties {
    #[serde(deserialize_with = "null_as_empty_object")]
    pub definition: Value,
    #[serde(deserialize_with = "null_as_empty_object")]
    pub parameters: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WorkflowProperties {
    fn default() -> Self {
        Self {
            definition: empty_object(),
            parameters: empty_object(),
            extra: Map::new(),
        }
    }
}

/// The part of a workflow the remediation model needs to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCode {
    pub definition: Value,
    pub parameters: Value,
}

impl From<&WorkflowDetails> for WorkflowCode {
    fn from(details: &WorkflowDetails) -> Self {
        Self {
            definition: details.properties.definition.clone(),
            parameters: details.properties.parameters.clone(),
        }
    }
}

impl From<WorkflowDetails> for WorkflowCode {
    fn from(details: WorkflowDetails) -> Self {
        Self {
            definition: details.properties.definition,
            parameters: details.properties.parameters,
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn null_as_empty_object<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(empty_object()),
        other => Ok(other),
    }
}
