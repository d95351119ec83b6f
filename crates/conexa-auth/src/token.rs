//! Login and token refresh
//!
//! Both are POSTs that carry their own credentials, so they go straight to
//! the [`Transport`] without a session token:
//! 1. Login: `POST /pdvauth` with `{clientId, secretKey, accessKey, clientKey}`
//! 2. Refresh: `POST /refresh-token` with the refresh token as bearer
//!
//! Either way the response (after `data` unwrapping) must hold both tokens.

use std::time::SystemTime;

use conexa_request::{Call, Error, Method, Payload, RequestSummary, Result, StatusCode, Transport};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::{LOGIN_PATH, REFRESH_PATH};
use crate::credential::Credential;
use crate::jwt;

/// Access/refresh token pair returned by login and refresh.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Log in with the credential's keys.
pub async fn login(transport: &Transport, credential: &Credential) -> Result<TokenPair> {
    let mut params = Map::new();
    params.insert("client_id".into(), credential.client_id().into());
    params.insert(
        "secret_key".into(),
        credential.secret_key().expose_str().into(),
    );
    params.insert(
        "access_key".into(),
        credential.access_key().expose_str().into(),
    );
    params.insert("client_key".into(), credential.key().into());

    let call = Call::login(LOGIN_PATH)
        .params(params)
        .client_key(credential.key());
    let payload = transport.send(&call, None).await?;
    debug!(key = credential.key(), "logged in");
    token_pair(transport, LOGIN_PATH, payload)
}

/// Trade a refresh token for a fresh pair.
///
/// A pair whose access token is already expired is rejected, so a caller
/// never receives a token the API will refuse.
pub async fn refresh(transport: &Transport, key: &str, refresh_token: &str) -> Result<TokenPair> {
    let call = Call::login(REFRESH_PATH).client_key(key);
    let payload = transport.send(&call, Some(refresh_token)).await?;
    let status = payload.status;
    let pair = token_pair(transport, REFRESH_PATH, payload)?;
    if jwt::is_expired_at(&pair.access_token, SystemTime::now()) {
        return Err(token_error(
            transport,
            REFRESH_PATH,
            status,
            "refreshed access token is already expired".into(),
        ));
    }
    debug!(key, "refreshed token");
    Ok(pair)
}

fn token_pair(transport: &Transport, path: &str, payload: Payload) -> Result<TokenPair> {
    let status = payload.status;
    serde_json::from_value::<TokenPair>(payload.into_data()).map_err(|e| {
        token_error(
            transport,
            path,
            status,
            format!("token response is missing tokens: {e}"),
        )
    })
}

fn token_error(transport: &Transport, path: &str, status: StatusCode, message: String) -> Error {
    Error::Response {
        request: RequestSummary {
            method: Method::POST,
            url: format!("{}{path}", transport.endpoint()),
        },
        status: Some(status),
        message: Some(message),
        errors: Vec::<Value>::new(),
    }
}
