//! Error taxonomy surfaced to every caller of the client
//!
//! Every failure is typed; nothing is retried or swallowed here. `NotFound`
//! and `Validation` keep the parsed response body so callers can inspect it.

use std::fmt;

use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Method and URL of the call that failed. Headers are left out on purpose
/// since they carry bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub method: Method,
    pub url: String,
}

impl fmt::Display for RequestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Field-level detail from an error body's `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub parameter_name: Option<String>,
    pub kind: Option<String>,
    pub url: Option<String>,
}

impl FieldError {
    /// Build from one `errors` entry. Plain strings become the message;
    /// objects contribute `message`, `parameter_name` (or `field`), `type`
    /// and `url`.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        match value {
            Value::String(message) => Self {
                message: message.clone(),
                parameter_name: None,
                kind: None,
                url: None,
            },
            Value::Object(_) => Self {
                message: text("message").unwrap_or_else(|| value.to_string()),
                parameter_name: text("parameter_name").or_else(|| text("field")),
                kind: text("type"),
                url: text("url"),
            },
            other => Self {
                message: other.to_string(),
                parameter_name: None,
                kind: None,
                url: None,
            },
        }
    }
}

/// Errors from building, authenticating or executing a call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport unreachable: DNS/socket failure or connection dropped mid-response.
    #[error("connection failed ({request}): {source}")]
    Connection {
        request: RequestSummary,
        #[source]
        source: reqwest::Error,
    },

    /// The caller passed an unusable argument.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Non-2xx response with a human message, or a body that could not be decoded.
    #[error("{}", describe_response(.request, .status, .message, .errors))]
    Response {
        request: RequestSummary,
        status: Option<StatusCode>,
        message: Option<String>,
        errors: Vec<Value>,
    },

    /// 404 response. `body` is kept only when it carried a `message`.
    #[error("not found ({request}){}", describe_body(.body))]
    NotFound {
        request: RequestSummary,
        body: Option<Value>,
    },

    /// Non-2xx response with per-field errors and no single message.
    #[error("validation failed: {}", join_messages(.errors))]
    Validation {
        body: Value,
        errors: Vec<FieldError>,
    },

    /// No session is registered under the requested alias.
    #[error("missing credentials for key: '{key}'")]
    MissingCredentials { key: String },

    /// Bad constructor input: unknown account kind, duplicate alias, missing external id.
    #[error("{message}")]
    InvalidParameter {
        message: String,
        parameter: String,
        expected: String,
    },
}

impl Error {
    pub fn invalid_parameter(
        message: impl Into<String>,
        parameter: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            message: message.into(),
            parameter: parameter.into(),
            expected: expected.into(),
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response { status, .. } => *status,
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Connection { .. } => "connection",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Response { .. } => "response",
            Error::NotFound { .. } => "not_found",
            Error::Validation { .. } => "validation",
            Error::MissingCredentials { .. } => "missing_credentials",
            Error::InvalidParameter { .. } => "invalid_parameter",
        }
    }
}

fn describe_response(
    request: &RequestSummary,
    status: &Option<StatusCode>,
    message: &Option<String>,
    errors: &[Value],
) -> String {
    let mut out = match status {
        Some(status) => format!("{request} returned {status}"),
        None => format!("{request} returned an undecodable body"),
    };
    if let Some(message) = message {
        out.push_str(" => ");
        out.push_str(message);
    }
    if !errors.is_empty() {
        out.push_str(" => errors: ");
        out.push_str(&Value::Array(errors.to_vec()).to_string());
    }
    out
}

fn describe_body(body: &Option<Value>) -> String {
    body.as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .map(|m| format!(" => {m}"))
        .unwrap_or_default()
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
