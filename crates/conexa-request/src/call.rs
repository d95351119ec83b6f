//! Call descriptor
//!
//! A transient description of one HTTP call: verb, path below the API base,
//! parameters, explicit query pairs, extra headers, the alias whose token
//! should authenticate it, and whether the call is itself a login/refresh.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub method: Method,
    /// Snake-case parameters. Sent camel-cased: as query pairs for GET/DELETE,
    /// as a JSON body otherwise.
    pub params: Option<Map<String, Value>>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// Alias whose session authenticates the call. `None` means the default alias.
    pub client_key: Option<String>,
    /// Login and refresh calls carry their own credentials and never get a
    /// bearer token attached.
    pub login: bool,
}

impl Call {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            params: None,
            query: Vec::new(),
            headers: HeaderMap::new(),
            client_key: None,
            login: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// POST that authenticates itself (login or refresh).
    pub fn login(path: impl Into<String>) -> Self {
        Self {
            login: true,
            ..Self::new(Method::POST, path)
        }
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Set params from a JSON value. Non-object values are rejected.
    pub fn json_params(self, params: Value) -> Result<Self> {
        match params {
            Value::Object(map) => Ok(self.params(map)),
            Value::Null => Ok(self),
            other => Err(Error::InvalidRequest(format!(
                "parameters must be a JSON object, got: {other}"
            ))),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn client_key(mut self, key: impl Into<String>) -> Self {
        self.client_key = Some(key.into());
        self
    }

    /// Parameters travel in the query string for these verbs.
    pub fn params_in_query(&self) -> bool {
        self.method == Method::GET || self.method == Method::DELETE
    }
}
