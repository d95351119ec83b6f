//! HTTP transport
//!
//! Turns a [`Call`] into a reqwest request against the API endpoint, sends it
//! once, and classifies the outcome. No retries happen here; transport-level
//! timeouts come from the `reqwest::Client` the caller supplies.

use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::call::Call;
use crate::case::camelize_map;
use crate::classify::{Payload, classify_failure, decode_success};
use crate::error::{Error, RequestSummary, Result};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf8";
pub const JSON_ACCEPT: &str = "application/json";
pub const CLIENT_USER_AGENT: &str = concat!("conexa-rust/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client bound to one API endpoint (`<host>/index.php/api/v2`).
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    endpoint: String,
}

impl Transport {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL: endpoint + path + explicit query pairs, then camel-cased
    /// params for GET/DELETE.
    pub fn build_url(&self, call: &Call) -> Result<Url> {
        if !call.path.starts_with('/') {
            return Err(Error::InvalidRequest(format!(
                "path must start with '/', got: {:?}",
                call.path
            )));
        }
        let mut url = Url::parse(&format!("{}{}", self.endpoint, call.path))
            .map_err(|e| Error::InvalidRequest(format!("invalid url for {}: {e}", call.path)))?;

        let mut pairs: Vec<(String, String)> = call.query.clone();
        if call.params_in_query()
            && let Some(params) = &call.params
        {
            for (key, value) in camelize_map(params.clone()) {
                if let Some(text) = query_text(value) {
                    pairs.push((key, text));
                }
            }
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Default headers, then the call's own headers, then the bearer token.
    pub fn build_headers(&self, call: &Call, bearer: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        for (name, value) in &call.headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = bearer {
            headers.insert(AUTHORIZATION, bearer_header(token)?);
        }
        Ok(headers)
    }

    /// JSON body with camel-cased keys, only for verbs that carry one.
    pub fn build_body(&self, call: &Call) -> Result<Option<Vec<u8>>> {
        if call.params_in_query() {
            return Ok(None);
        }
        let Some(params) = &call.params else {
            return Ok(None);
        };
        let body = Value::Object(camelize_map(params.clone()));
        serde_json::to_vec(&body)
            .map(Some)
            .map_err(|e| Error::InvalidRequest(format!("unserializable parameters: {e}")))
    }

    /// Send the call once and decode or classify the response.
    #[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4(), method = %call.method, path = %call.path))]
    pub async fn send(&self, call: &Call, bearer: Option<&str>) -> Result<Payload> {
        let url = self.build_url(call)?;
        let headers = self.build_headers(call, bearer)?;
        let body = self.build_body(call)?;
        let request = RequestSummary {
            method: call.method.clone(),
            url: url.to_string(),
        };

        let mut builder = self
            .client
            .request(call.method.clone(), url)
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(authenticated = bearer.is_some(), "sending request");
        let outcome = match builder.send().await {
            Ok(response) => {
                let status = response.status();
                match response.bytes().await {
                    Ok(bytes) if status.is_success() => decode_success(status, &bytes, &request),
                    Ok(bytes) => Err(classify_failure(status, &bytes, request)),
                    Err(source) => Err(Error::Connection { request, source }),
                }
            }
            Err(source) => Err(Error::Connection { request, source }),
        };

        match &outcome {
            Ok(payload) => {
                debug!(status = %payload.status, "request succeeded");
                metrics::counter!("conexa_requests_total", "outcome" => "success").increment(1);
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "request failed");
                metrics::counter!("conexa_requests_total", "outcome" => e.kind()).increment(1);
            }
        }
        outcome
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| Error::InvalidRequest(format!("token is not a valid header value: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

fn query_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use reqwest::header::HeaderName;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(endpoint: &str) -> Transport {
        Transport::new(reqwest::Client::new(), endpoint)
    }

    fn params(v: Value) -> serde_json::Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn url_joins_endpoint_path_and_query() {
        let t = transport("https://acme.conexa.app/index.php/api/v2/");
        let call = Call::get("/customers").query("page", "1").query("limit", "10");
        let url = t.build_url(&call).unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.conexa.app/index.php/api/v2/customers?page=1&limit=10"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        let t = transport("https://acme.conexa.app/index.php/api/v2");
        let url = t.build_url(&Call::get("/customers")).unwrap();
        assert_eq!(url.as_str(), "https://acme.conexa.app/index.php/api/v2/customers");
    }

    #[test]
    fn get_params_become_camel_cased_query_pairs() {
        let t = transport("https://acme.conexa.app/index.php/api/v2");
        let call = Call::get("/customers").params(params(json!({
            "company_id": 3,
            "is_active": true,
            "name": "ACME Ltda",
            "deleted_at": null
        })));
        let url = t.build_url(&call).unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("companyId=3"), "got: {query}");
        assert!(query.contains("isActive=true"), "got: {query}");
        assert!(query.contains("name=ACME+Ltda"), "got: {query}");
        assert!(!query.contains("deletedAt"), "null params must be skipped: {query}");
        assert!(t.build_body(&call).unwrap().is_none());
    }

    #[test]
    fn path_without_leading_slash_is_invalid() {
        let t = transport("https://acme.conexa.app/index.php/api/v2");
        let err = t.build_url(&Call::get("customers")).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn post_body_is_camel_cased_json() {
        let t = transport("https://acme.conexa.app/index.php/api/v2");
        let call = Call::post("/customer").params(params(json!({"first_name": "John"})));
        let body = t.build_body(&call).unwrap().unwrap();
        let decoded: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, json!({"firstName": "John"}));
    }

    #[test]
    fn default_headers_and_bearer() {
        let t = transport("https://acme.conexa.app/index.php/api/v2");
        let call = Call::get("/customers").header(
            HeaderName::from_static("x-custom"),
            HeaderValue::from_static("value"),
        );
        let headers = t.build_headers(&call, Some("at_123")).unwrap();
        assert_eq!(headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(headers[ACCEPT], JSON_ACCEPT);
        assert!(
            headers[USER_AGENT]
                .to_str()
                .unwrap()
                .starts_with("conexa-rust/")
        );
        assert_eq!(headers["x-custom"], "value");
        assert_eq!(headers[AUTHORIZATION], "Bearer at_123");
        assert!(headers[AUTHORIZATION].is_sensitive());

        let anonymous = t.build_headers(&call, None).unwrap();
        assert!(anonymous.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn send_returns_unwrapped_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.php/api/v2/customers"))
            .and(query_param("page", "2"))
            .and(header("authorization", "Bearer at_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"customerId": 1}],
                "pagination": {"page": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let t = transport(&format!("{}/index.php/api/v2", server.uri()));
        let payload = t
            .send(&Call::get("/customers").query("page", "2"), Some("at_1"))
            .await
            .unwrap();
        assert_eq!(payload.data, json!([{"customerId": 1}]));
        assert_eq!(payload.pagination, Some(json!({"page": 2})));
    }

    #[tokio::test]
    async fn send_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/index.php/api/v2/customer"))
            .and(body_json(json!({"tradeName": "ACME"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .expect(1)
            .mount(&server)
            .await;

        let t = transport(&format!("{}/index.php/api/v2", server.uri()));
        let call = Call::post("/customer").params(params(json!({"trade_name": "ACME"})));
        let payload = t.send(&call, Some("at_1")).await.unwrap();
        assert_eq!(payload.status, StatusCode::CREATED);
        assert_eq!(payload.data["id"], 9);
    }

    #[tokio::test]
    async fn send_returns_empty_result_for_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let t = transport(&format!("{}/index.php/api/v2", server.uri()));
        let payload = t.send(&Call::delete("/customer/1"), Some("at")).await.unwrap();
        assert_eq!(payload.data, json!({}));
    }

    #[tokio::test]
    async fn send_classifies_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Customer not found"})),
            )
            .mount(&server)
            .await;

        let t = transport(&format!("{}/index.php/api/v2", server.uri()));
        let err = t.send(&Call::get("/customer/999"), Some("at")).await.unwrap_err();
        match err {
            Error::NotFound { body, request } => {
                assert_eq!(body.unwrap()["message"], "Customer not found");
                assert!(request.url.ends_with("/customer/999"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_classifies_validation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{"field": "name", "message": "is required"}]
            })))
            .mount(&server)
            .await;

        let t = transport(&format!("{}/index.php/api/v2", server.uri()));
        let call = Call::post("/customer").params(params(json!({})));
        let err = t.send(&call, Some("at")).await.unwrap_err();
        assert!(
            matches!(&err, Error::Validation { errors, .. } if errors.len() == 1),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn send_maps_socket_failure_to_connection_error() {
        // Nothing listens on port 1.
        let t = transport("http://127.0.0.1:1/index.php/api/v2");
        let err = t.send(&Call::get("/customers"), None).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }), "got: {err:?}");
    }
}
