//! Request normalization and the uniform response envelope.
//!
//! Clients reach the handlers in two shapes: a gateway-style event whose
//! `body` field holds the JSON payload as a string, or the payload fields
//! sent directly. [`RequestFields`] folds both into one field map before any
//! handler logic runs, and every handler answers with an [`Envelope`].

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use crate::error::ServiceError;

/// Header present on every envelope.
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";

// =============================================================================
// Request Normalization
// =============================================================================

/// Normalized request fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFields(Map<String, Value>);

impl RequestFields {
    /// Normalize an event.
    ///
    /// A non-empty `body` is used as the payload: a string is parsed as JSON,
    /// an object is taken as is. A missing, null or empty `body` means the
    /// fields sit on the event itself.
    pub fn from_event(event: Value) -> Result<Self, ServiceError> {
        let mut fields = match event {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(ServiceError::Validation(
                    "request must be a JSON object".to_string(),
                ))
            }
        };

        match fields.remove("body") {
            Some(Value::String(body)) if !body.is_empty() => {
                let parsed: Value = serde_json::from_str(&body).map_err(|e| {
                    ServiceError::Validation(format!("invalid JSON body: {}", e))
                })?;
                match parsed {
                    Value::Object(map) => Ok(Self(map)),
                    Value::Null => Ok(Self::default()),
                    _ => Err(ServiceError::Validation(
                        "body must be a JSON object".to_string(),
                    )),
                }
            }
            Some(Value::Object(map)) => Ok(Self(map)),
            // Empty or null body: fall back to the event fields
            _ => Ok(Self(fields)),
        }
    }

    /// Normalize a raw HTTP body. An empty body yields no fields.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ServiceError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let event: Value = serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Validation(format!("invalid JSON body: {}", e)))?;
        Self::from_event(event)
    }

    /// First non-empty string among `names`, tried in order.
    pub fn string(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.0.get(*name).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }

    /// Boolean flag.
    ///
    /// Accepts JSON booleans, non-zero numbers and the string `"true"`. Other
    /// strings are false, so `"false"` does not turn the flag on.
    pub fn flag(&self, name: &str) -> bool {
        match self.0.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

// =============================================================================
// Response Envelope
// =============================================================================

/// Uniform handler response: `{statusCode, headers, body}` where `body` is a
/// JSON document encoded as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Envelope {
    /// Build an envelope around a serializable body.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        let (status, body) = match serde_json::to_string(body) {
            Ok(body) => (status, body),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": e.to_string() }).to_string(),
            ),
        };

        let mut headers = BTreeMap::new();
        headers.insert(ALLOW_ORIGIN_HEADER.to_string(), "*".to_string());

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    /// 200 envelope.
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// Error envelope with an `{error}` body.
    ///
    /// Server errors are logged at ERROR, 404s at DEBUG and other client
    /// errors at WARN.
    pub fn from_error(err: &ServiceError) -> Self {
        let status = err.status();
        let message = err.to_string();

        if status.is_server_error() {
            error!(
                error_type = err.kind(),
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = err.kind(),
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = err.kind(),
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        Self::json(status, &json!({ "error": message }))
    }

    /// Parse the body back into JSON.
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl<T: Serialize> From<Result<T, ServiceError>> for Envelope {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(body) => Envelope::ok(&body),
            Err(err) => Envelope::from_error(&err),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        response
    }
}
