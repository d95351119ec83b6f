//! Per-tenant session
//!
//! A [`Session`] owns one [`Credential`] and its current token pair. The pair
//! sits behind its own tokio Mutex, held across a refresh, so concurrent
//! `token()` calls on one session refresh at most once while other sessions
//! are never blocked.

use std::time::SystemTime;

use conexa_request::{Result, Transport};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::credential::Credential;
use crate::jwt;
use crate::token::{self, TokenPair};

pub struct Session {
    credential: Credential,
    tokens: Mutex<TokenPair>,
    transport: Transport,
}

impl Session {
    /// Log in and build the session. Fails without leaving anything behind.
    #[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4(), key = credential.key()))]
    pub async fn login(transport: Transport, credential: Credential) -> Result<Self> {
        let tokens = token::login(&transport, &credential).await?;
        info!(kind = %credential.kind(), "session established");
        Ok(Self::from_parts(transport, credential, tokens))
    }

    /// Session seeded with an already obtained token pair.
    pub fn from_parts(transport: Transport, credential: Credential, tokens: TokenPair) -> Self {
        Self {
            credential,
            tokens: Mutex::new(tokens),
            transport,
        }
    }

    pub fn key(&self) -> &str {
        self.credential.key()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Current access token, refreshed first if its `exp` is not in the future.
    pub async fn token(&self) -> Result<String> {
        let mut tokens = self.tokens.lock().await;
        if jwt::is_expired_at(&tokens.access_token, SystemTime::now()) {
            let fresh = self.refresh_locked(&tokens.refresh_token).await?;
            *tokens = fresh;
        }
        Ok(tokens.access_token.clone())
    }

    /// Trade the refresh token for a new pair even if the access token is
    /// still valid. On failure the previous pair is kept.
    pub async fn refresh(&self) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        let fresh = self.refresh_locked(&tokens.refresh_token).await?;
        *tokens = fresh;
        Ok(())
    }

    /// Caller holds the token lock. Previous tokens stay in place on failure.
    #[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4(), key = self.key()))]
    async fn refresh_locked(&self, refresh_token: &str) -> Result<TokenPair> {
        match token::refresh(&self.transport, self.key(), refresh_token).await {
            Ok(pair) => {
                metrics::counter!("conexa_token_refresh_total", "result" => "success")
                    .increment(1);
                info!("access token refreshed");
                Ok(pair)
            }
            Err(e) => {
                metrics::counter!("conexa_token_refresh_total", "result" => "failure")
                    .increment(1);
                warn!(error = %e, "token refresh failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key())
            .field("kind", &self.credential.kind())
            .finish_non_exhaustive()
    }
}
