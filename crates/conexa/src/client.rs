//! High-level API client
//!
//! Wires settings into a shared `reqwest::Client`, a [`Transport`], the
//! [`SessionRegistry`] and a [`Pipeline`], then offers resource helpers on
//! top. Cloning is cheap; every clone shares the same registry.

use std::sync::Arc;
use std::time::Duration;

use common::Settings;
use conexa_pool::SessionRegistry;
use conexa_request::{
    Call, Error, Object, Payload, Pipeline, Resource, Result, Transport,
};
use serde_json::{Map, Value};
use tracing::info;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct Client {
    pipeline: Pipeline,
    registry: Arc<SessionRegistry>,
    client_key: Option<String>,
}

impl Client {
    /// Build the HTTP stack and log in every configured tenant.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_secs))
            .build()
            .map_err(|e| {
                Error::invalid_parameter(
                    format!("cannot build HTTP client: {e}"),
                    "api.timeout_secs",
                    "usable HTTP client settings",
                )
            })?;
        let transport = Transport::new(http, settings.api_endpoint());
        let registry = SessionRegistry::connect(settings, transport.clone()).await?;
        info!(endpoint = transport.endpoint(), "conexa client connected");
        Ok(Self::from_parts(transport, Arc::new(registry)))
    }

    pub fn from_parts(transport: Transport, registry: Arc<SessionRegistry>) -> Self {
        Self {
            pipeline: Pipeline::new(transport, registry.clone()),
            registry,
            client_key: None,
        }
    }

    /// Same client, with every helper call authenticated as `key`.
    pub fn with_client_key(&self, key: impl Into<String>) -> Self {
        Self {
            client_key: Some(key.into()),
            ..self.clone()
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run a prepared call. The call's own client key wins over the scoped one.
    pub async fn execute(&self, call: Call) -> Result<Payload> {
        self.pipeline.execute(&self.scoped(call)).await
    }

    pub async fn call(&self, call: Call, resource_hint: &str) -> Result<Object> {
        self.pipeline.call(&self.scoped(call), resource_hint).await
    }

    /// `GET /<resource>/<id>`
    pub async fn find(&self, resource: &str, id: &str) -> Result<Resource> {
        let path = show_path(resource, Some(id))?;
        self.single(Call::get(path), resource).await
    }

    /// `GET /<resource>s` with `page`/`size` plus any filter params.
    pub async fn list(
        &self,
        resource: &str,
        page: Option<u32>,
        size: Option<u32>,
        params: Map<String, Value>,
    ) -> Result<Object> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 || size < 1 {
            return Err(Error::InvalidRequest(format!(
                "invalid page size: page={page}, size={size}"
            )));
        }
        let mut params = params;
        params.insert("page".into(), page.into());
        params.insert("size".into(), size.into());

        let path = format!("{}s", show_path(resource, None)?);
        self.call(Call::get(path).params(params), resource).await
    }

    /// `POST /<resource>`
    pub async fn create(&self, resource: &str, params: Map<String, Value>) -> Result<Resource> {
        let path = show_path(resource, None)?;
        self.single(Call::post(path).params(params), resource).await
    }

    /// `PATCH /<resource>/<id>`
    pub async fn update(
        &self,
        resource: &str,
        id: &str,
        params: Map<String, Value>,
    ) -> Result<Resource> {
        let path = show_path(resource, Some(id))?;
        self.single(Call::patch(path).params(params), resource).await
    }

    /// `DELETE /<resource>/<id>`
    pub async fn destroy(&self, resource: &str, id: &str) -> Result<Resource> {
        let path = show_path(resource, Some(id))?;
        self.single(Call::delete(path), resource).await
    }

    async fn single(&self, call: Call, resource: &str) -> Result<Resource> {
        let payload = self.execute(call).await?;
        Ok(Resource::from_value(resource, payload.into_data()))
    }

    fn scoped(&self, call: Call) -> Call {
        match (&call.client_key, &self.client_key) {
            (None, Some(key)) => call.client_key(key.clone()),
            _ => call,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.pipeline.transport().endpoint())
            .field("client_key", &self.client_key)
            .finish_non_exhaustive()
    }
}

fn show_path(resource: &str, id: Option<&str>) -> Result<String> {
    let resource = resource.trim().trim_matches('/');
    if resource.is_empty() {
        return Err(Error::InvalidRequest("resource name must not be empty".into()));
    }
    match id.map(str::trim) {
        None => Ok(format!("/{resource}")),
        Some("") => Err(Error::InvalidRequest("Invalid ID".into())),
        Some(id) => Ok(format!("/{resource}/{id}")),
    }
}
