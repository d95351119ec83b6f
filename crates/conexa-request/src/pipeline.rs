//! Authenticated request pipeline
//!
//! Attaches a bearer token fetched from a [`TokenSource`] to every call that
//! is not itself a login/refresh, then hands the call to the [`Transport`].
//! Each call ends in exactly one outcome; the pipeline never retries.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::call::Call;
use crate::classify::Payload;
use crate::error::Result;
use crate::resource::Object;
use crate::transport::Transport;

/// Boxed future returned by [`TokenSource::token_for`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Anything that can hand out a currently valid access token for an alias.
///
/// Uses `Pin<Box<dyn Future>>` so the pipeline can hold an `Arc<dyn TokenSource>`.
pub trait TokenSource: Send + Sync {
    /// Token for `key`, or for the default alias when `key` is `None`.
    /// May refresh the token first, which means network I/O.
    fn token_for<'a>(&'a self, key: Option<&'a str>) -> TokenFuture<'a>;
}

#[derive(Clone)]
pub struct Pipeline {
    transport: Transport,
    tokens: Arc<dyn TokenSource>,
}

impl Pipeline {
    pub fn new(transport: Transport, tokens: Arc<dyn TokenSource>) -> Self {
        Self { transport, tokens }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetch a token (unless this is a login call), send, decode.
    pub async fn execute(&self, call: &Call) -> Result<Payload> {
        let token = if call.login {
            None
        } else {
            let token = self.tokens.token_for(call.client_key.as_deref()).await?;
            debug!(client_key = ?call.client_key, "attached bearer token");
            Some(token)
        };
        self.transport.send(call, token.as_deref()).await
    }

    /// Execute and convert the payload into the resource model.
    pub async fn call(&self, call: &Call, resource_hint: &str) -> Result<Object> {
        let payload = self.execute(call).await?;
        Ok(Object::from_payload(resource_hint, payload))
    }
}
