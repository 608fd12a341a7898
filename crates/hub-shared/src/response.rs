//! JSON envelope shared by every endpoint.
//!
//! Successful responses are `{ message?, ...payload }`; failures are
//! `{ error, errors?, requestId? }`.

use serde::{Deserialize, Serialize};

/// Successful response: an optional human-readable message beside the payload fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            message: None,
            data,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            data,
        }
    }
}

impl ApiResponse<Empty> {
    /// A response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok_with_message(Empty {}, message)
    }
}

/// Payload for message-only responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,

    /// Request ID for debugging purposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            errors: None,
            request_id: None,
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            error: "Validation failed".to_string(),
            errors: Some(errors),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Liked {
        liked: bool,
    }

    #[test]
    fn test_payload_is_flattened_beside_message() {
        let body = serde_json::to_value(ApiResponse::ok_with_message(
            Liked { liked: true },
            "Post liked",
        ))
        .unwrap();

        assert_eq!(body, json!({"message": "Post liked", "liked": true}));
    }

    #[test]
    fn test_message_only_response() {
        let body = serde_json::to_value(ApiResponse::message("Post deleted successfully")).unwrap();

        assert_eq!(body, json!({"message": "Post deleted successfully"}));
    }

    #[test]
    fn test_error_body_omits_empty_parts() {
        let body = serde_json::to_value(ErrorResponse::new("Post not found")).unwrap();

        assert_eq!(body, json!({"error": "Post not found"}));
    }
}
