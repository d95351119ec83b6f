//! Response decoding and failure classification
//!
//! Pure functions over (status, body bytes) so the whole table can be
//! tested without a server. The transport calls these after reading the body.

use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, FieldError, RequestSummary, Result};

/// Decoded successful response.
///
/// `data` is the `data` envelope field when present and non-null, else the
/// whole body. `pagination` is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub status: StatusCode,
    pub data: Value,
    pub pagination: Option<Value>,
}

impl Payload {
    fn unwrap_envelope(status: StatusCode, body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
                let data = map.remove("data").unwrap_or(Value::Null);
                let pagination = map.remove("pagination").filter(|p| !p.is_null());
                Self {
                    status,
                    data,
                    pagination,
                }
            }
            other => Self {
                status,
                data: other,
                pagination: None,
            },
        }
    }

    pub fn into_data(self) -> Value {
        self.data
    }
}

/// Decode a 2xx body. Non-JSON bodies are only accepted for 204 No Content,
/// which yields an empty object.
pub fn decode_success(status: StatusCode, body: &[u8], request: &RequestSummary) -> Result<Payload> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Ok(Payload::unwrap_envelope(status, value)),
        Err(_) if status == StatusCode::NO_CONTENT => Ok(Payload {
            status,
            data: Value::Object(Map::new()),
            pagination: None,
        }),
        Err(e) => {
            debug!(%request, %status, error = %e, "success response is not JSON");
            Err(Error::Response {
                request: request.clone(),
                status: Some(status),
                message: None,
                errors: Vec::new(),
            })
        }
    }
}

/// Classify a non-2xx response into the error taxonomy.
///
/// - undecodable body: `Response` without a message (an empty 404 is `NotFound(None)`)
/// - 404: `NotFound`, keeping the body only if it has a `message`
/// - string `message`: `Response` with the message and any `errors` list
/// - no string `message`: `Validation` with one entry per field error
pub fn classify_failure(status: StatusCode, body: &[u8], request: RequestSummary) -> Error {
    let not_found = status == StatusCode::NOT_FOUND;
    if not_found && body.iter().all(u8::is_ascii_whitespace) {
        return Error::NotFound {
            request,
            body: None,
        };
    }

    let parsed: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            debug!(%request, %status, error = %e, "error response is not JSON");
            return Error::Response {
                request,
                status: Some(status),
                message: None,
                errors: Vec::new(),
            };
        }
    };

    let message = parsed
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned);

    if not_found {
        return Error::NotFound {
            request,
            body: message.is_some().then_some(parsed),
        };
    }

    match message {
        Some(message) => Error::Response {
            request,
            status: Some(status),
            message: Some(message),
            errors: error_entries(&parsed),
        },
        None => {
            let mut entries = error_entries(&parsed);
            // Some endpoints put the per-field list under `message` instead.
            if entries.is_empty()
                && let Some(Value::Array(items)) = parsed.get("message")
            {
                entries = items.clone();
            }
            Error::Validation {
                errors: entries.iter().map(FieldError::from_value).collect(),
                body: parsed,
            }
        }
    }
}

fn error_entries(body: &Value) -> Vec<Value> {
    match body.get("errors") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    }
}
