// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Work for a commander: send `body` to the service at `target`.
///
/// `coroutine` names the coroutine to resume with the response instead of
/// delivering it on the commander's response channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: u64,
    pub target: String,
    pub body: serde_json::Value,
    #[serde(default)]
    pub coroutine: Option<String>,
}

impl ServiceRequest {
    /// A request with a fresh process-wide id.
    pub fn new(target: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            target: target.into(),
            body,
            coroutine: None,
        }
    }
}

/// The answer to a [`ServiceRequest`], matched by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub id: u64,
    pub body: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ServiceResponse {
    pub fn ok(id: u64, body: serde_json::Value) -> Self {
        Self { id, body, error: None }
    }

    pub fn failed(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            body: serde_json::Value::Null,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_requests_get_distinct_ids() {
        let a = ServiceRequest::new("/1.0.0/try/echo", json!({"text": "a"}));
        let b = ServiceRequest::new("/1.0.0/try/echo", json!({"text": "b"}));
        assert_ne!(a.id, b.id);
        assert!(a.coroutine.is_none());
    }

    #[test]
    fn test_request_deserializes_without_coroutine() {
        let request: ServiceRequest =
            serde_json::from_str(r#"{"id": 9, "target": "/text/upper", "body": {"text": "x"}}"#).unwrap();
        assert_eq!(request.id, 9);
        assert_eq!(request.coroutine, None);
        assert_eq!(request.body["text"], "x");
    }

    #[test]
    fn test_failed_response_has_no_body() {
        let response = ServiceResponse::failed(3, "boom");
        assert!(response.is_error());
        assert!(response.body.is_null());
        assert!(!ServiceResponse::ok(3, json!(1)).is_error());
    }
}
