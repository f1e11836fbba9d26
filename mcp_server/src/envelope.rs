//! The uniform result envelope returned for every tool invocation.
//!
//! Handlers produce `Result<ToolOutcome, ToolError>`; [`encode`] turns
//! either side into the wire shape: a list of text content items with an
//! optional error marker. Encoding never raises past this boundary.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use gcp_backend_interface::BackendError;

/// Successful outcome of a tool handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Structured payload, rendered as indented JSON.
    Success(Value),
    /// Deliberately-empty result, rendered as a fixed sentinel text so an
    /// empty list is never mistaken for a serialization failure.
    Empty(&'static str),
}

impl ToolOutcome {
    /// Serialize a payload into a success outcome. Serialization failure
    /// becomes a [`ToolError::Serialization`] failure envelope instead of
    /// propagating upward.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, ToolError> {
        Ok(ToolOutcome::Success(serde_json::to_value(payload)?))
    }
}

/// Failure reported through the envelope.
///
/// The underlying cause stays retrievable through
/// [`std::error::Error::source`] until the result is encoded.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Backend client construction or a backend call failed.
    #[error("{message}: {source}")]
    Backend {
        /// Handler-chosen message, e.g. `unable to list clusters.`.
        message: &'static str,
        #[source]
        source: BackendError,
    },

    /// A required parameter resolved to no value.
    #[error("missing required parameter `{0}`")]
    MissingParameter(String),

    /// An argument was present but unusable.
    #[error("{0}")]
    InvalidArgument(String),

    /// No tool is registered under the invoked name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The result payload could not be rendered.
    #[error("failed to marshal response data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Attach a handler-facing message to a backend failure.
    pub fn backend(message: &'static str, source: BackendError) -> Self {
        ToolError::Backend { message, source }
    }
}

/// One content item of an envelope response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl Content {
    /// A text content item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

/// The uniform tool-call response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Encode a handler result into the wire envelope.
///
/// Success payloads are rendered as two-space-indented JSON with stable
/// field order; failures carry `message: cause` text and the error marker.
pub fn encode(result: &Result<ToolOutcome, ToolError>) -> CallToolResult {
    match result {
        Ok(ToolOutcome::Success(value)) => match serde_json::to_string_pretty(value) {
            Ok(text) => CallToolResult {
                content: vec![Content::text(text)],
                is_error: None,
            },
            Err(err) => CallToolResult {
                content: vec![Content::text(format!(
                    "failed to marshal response data: {err}"
                ))],
                is_error: Some(true),
            },
        },
        Ok(ToolOutcome::Empty(sentinel)) => CallToolResult {
            content: vec![Content::text(*sentinel)],
            is_error: None,
        },
        Err(err) => CallToolResult {
            content: vec![Content::text(err.to_string())],
            is_error: Some(true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_round_trips_through_the_envelope() {
        let payload = json!([
            {"name": "alpha", "status": "RUNNING"},
            {"name": "beta", "status": "STOPPED"},
        ]);
        let outcome = ToolOutcome::json(&payload).unwrap();
        let envelope = encode(&Ok(outcome));

        assert_eq!(envelope.is_error, None);
        assert_eq!(envelope.content.len(), 1);
        let decoded: Value = serde_json::from_str(&envelope.content[0].text).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn success_payload_is_indented() {
        let outcome = ToolOutcome::json(&json!({"name": "alpha"})).unwrap();
        let envelope = encode(&Ok(outcome));
        assert_eq!(envelope.content[0].text, "{\n  \"name\": \"alpha\"\n}");
    }

    #[test]
    fn empty_result_carries_the_sentinel_not_an_error() {
        let envelope = encode(&Ok(ToolOutcome::Empty("No clusters found.")));
        assert_eq!(envelope.is_error, None);
        assert_eq!(envelope.content[0].text, "No clusters found.");
    }

    #[test]
    fn failure_carries_message_cause_and_error_marker() {
        let err = ToolError::backend(
            "unable to describe service.",
            BackendError::Api {
                service: "Cloud Run services",
                status: 500,
                message: "boom".to_string(),
            },
        );
        let envelope = encode(&Err(err));
        assert_eq!(envelope.is_error, Some(true));
        assert!(envelope.content[0]
            .text
            .starts_with("unable to describe service.:"));
        assert!(envelope.content[0].text.contains("boom"));
    }

    #[test]
    fn backend_cause_stays_retrievable_until_encoding() {
        use std::error::Error;

        let err = ToolError::backend(
            "unable to list projects.",
            BackendError::NotFound("organizations/1".to_string()),
        );
        let source = err.source().expect("cause should be attached");
        assert!(source.to_string().contains("organizations/1"));
    }

    #[test]
    fn validation_failure_encodes_as_error_envelope() {
        let envelope = encode(&Err(ToolError::MissingParameter("project".to_string())));
        assert_eq!(envelope.is_error, Some(true));
        assert_eq!(
            envelope.content[0].text,
            "missing required parameter `project`"
        );
    }
}
