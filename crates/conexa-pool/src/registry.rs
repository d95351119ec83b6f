//! Alias → session registry
//!
//! Membership lives behind one `RwLock` that is only held for lookups and
//! inserts, never across network I/O. Each [`Session`] guards its own token
//! pair, so a refresh for one tenant never blocks another tenant's lookup,
//! while two `token_for` calls on the same alias still refresh only once.

use std::sync::Arc;

use common::Settings;
use conexa_auth::{AccountKind, Credential, Session, normalize_key};
use conexa_request::{Error, Result, TokenFuture, TokenSource, Transport};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct SessionRegistry {
    sessions: RwLock<Vec<Arc<Session>>>,
    default_key: String,
    transport: Transport,
}

impl SessionRegistry {
    /// Log in every configured tenant and build the registry.
    ///
    /// Uses the `[[credentials]]` list when present, else a single credential
    /// from `[auth]`. All or nothing: the first failed login is returned and
    /// no registry exists.
    pub async fn connect(settings: &Settings, transport: Transport) -> Result<Self> {
        let credentials = if settings.is_multi_tenant() {
            settings
                .credentials
                .iter()
                .map(|tenant| Credential::from_settings(tenant, &settings.auth))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![Credential::single_tenant(&settings.auth)?]
        };

        let mut sessions: Vec<Arc<Session>> = Vec::with_capacity(credentials.len());
        for credential in credentials {
            if sessions.iter().any(|s| s.key() == credential.key()) {
                return Err(duplicate(credential.key()));
            }
            let key = credential.key().to_string();
            let session = Session::login(transport.clone(), credential)
                .await
                .inspect_err(|e| warn!(key = %key, error = %e, "tenant login failed, registry not built"))?;
            sessions.push(Arc::new(session));
        }

        let default_key = normalize_key(&settings.auth.default_client_key)?;
        info!(tenants = sessions.len(), default_key = %default_key, "session registry ready");
        Self::from_sessions(sessions, default_key, transport)
    }

    /// Registry over already established sessions. Aliases must be unique.
    pub fn from_sessions(
        sessions: Vec<Arc<Session>>,
        default_key: impl Into<String>,
        transport: Transport,
    ) -> Result<Self> {
        for (i, session) in sessions.iter().enumerate() {
            if sessions[..i].iter().any(|s| s.key() == session.key()) {
                return Err(duplicate(session.key()));
            }
        }
        Ok(Self {
            sessions: RwLock::new(sessions),
            default_key: default_key.into(),
            transport,
        })
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Valid access token for `key` (default alias when `None`).
    ///
    /// May refresh the session's token first.
    pub async fn token_for(&self, key: Option<&str>) -> Result<String> {
        let key = self.resolve(key);
        let session = self
            .find(&key)
            .await
            .ok_or_else(|| Error::MissingCredentials { key: key.clone() })?;
        debug!(key = %key, "token requested");
        session.token().await
    }

    /// Log in a new tenant and register it.
    ///
    /// The login runs outside the membership lock; the duplicate check is
    /// repeated under the write lock so a racing add of the same alias loses.
    pub async fn add_client(&self, credential: Credential) -> Result<()> {
        if self.find(credential.key()).await.is_some() {
            return Err(duplicate(credential.key()));
        }

        let session = Session::login(self.transport.clone(), credential).await?;

        let mut sessions = self.sessions.write().await;
        if sessions.iter().any(|s| s.key() == session.key()) {
            return Err(duplicate(session.key()));
        }
        info!(key = session.key(), kind = %session.credential().kind(), "client added");
        sessions.push(Arc::new(session));
        Ok(())
    }

    /// Credential registered under `key` (default alias when `None`).
    pub async fn client_for(&self, key: Option<&str>) -> Option<Credential> {
        let key = self.resolve(key);
        self.find(&key).await.map(|s| s.credential().clone())
    }

    /// Account kind for `key`; `Pdv` when the alias is unknown.
    pub async fn client_type_for(&self, key: Option<&str>) -> AccountKind {
        self.client_for(key)
            .await
            .map(|c| c.kind())
            .unwrap_or_default()
    }

    /// Registered aliases in registration order.
    pub async fn aliases(&self) -> Vec<String> {
        self.sessions
            .read()
            .await
            .iter()
            .map(|s| s.key().to_string())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn find(&self, key: &str) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .await
            .iter()
            .find(|s| s.key() == key)
            .cloned()
    }

    fn resolve(&self, key: Option<&str>) -> String {
        match key {
            Some(key) => normalize_key(key).unwrap_or_else(|_| key.to_string()),
            None => self.default_key.clone(),
        }
    }
}

impl TokenSource for SessionRegistry {
    fn token_for<'a>(&'a self, key: Option<&'a str>) -> TokenFuture<'a> {
        Box::pin(SessionRegistry::token_for(self, key))
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("default_key", &self.default_key)
            .finish_non_exhaustive()
    }
}

fn duplicate(key: &str) -> Error {
    Error::invalid_parameter(
        format!("client key '{key}' already exists"),
        "key",
        "unique client key",
    )
}
