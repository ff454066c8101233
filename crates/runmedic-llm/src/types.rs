//! Request and response bodies for `generateContent`.

use serde::{Deserialize, Serialize};

/// A single-turn prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

impl GenerateRequest {
    /// One content entry holding one text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(text.into()),
                }],
            }],
        }
    }

    /// Concatenated text of every part, for logging and tests.
    pub fn text(&self) -> String {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Response body. Only the fields runmedic reads are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub content: Content,
    #[serde(rename = "finishReason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Content {
                    parts: vec![Part {
                        text: Some(text.into()),
                    }],
                },
                finish_reason: Some("STOP".to_string()),
            }],
        }
    }

    /// `candidates[0].content.parts[0].text`.
    ///
    /// `None` when there are no candidates. A candidate without parts or
    /// text yields an empty string.
    pub fn first_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        Some(
            candidate
                .content
                .parts
                .first()
                .and_then(|p| p.text.clone())
                .unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateRequest::from_text("fix it");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"contents": [{"parts": [{"text": "fix it"}]}]})
        );
        assert_eq!(request.text(), "fix it");
    }

    #[test]
    fn test_first_text() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}], "role": "model"}},
                {"content": {"parts": [{"text": "other"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10}
        }))
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("first"));
    }

    #[test]
    fn test_first_text_empty_candidates() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.first_text().is_none());
    }

    #[test]
    fn test_first_text_candidate_without_parts() {
        let response: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(response.first_text().as_deref(), Some(""));
    }
}
