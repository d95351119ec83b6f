//! Client settings and loading
//!
//! Precedence: CLI args > env vars > settings file > defaults.
//! The secret and access keys are loaded from `CONEXA_SECRET_KEY` /
//! `CONEXA_ACCESS_KEY` or from the `*_file` paths, so they never have to be
//! committed to the TOML file itself.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::secret::Secret;

/// Path suffix appended to the API host for every call.
pub const API_PATH: &str = "/index.php/api/v2";

/// Root settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    /// Extra tenants. When non-empty the registry runs in multi-tenant mode
    /// and ignores the single-tenant `auth.client_id`.
    #[serde(default)]
    pub credentials: Vec<TenantSettings>,
}

/// Remote API location
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Defaults applied to every credential that does not override them
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// External id used by the single-tenant credential.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_client_key")]
    pub default_client_key: String,
    #[serde(skip)]
    pub secret_key: Option<Secret<String>>,
    #[serde(skip)]
    pub access_key: Option<Secret<String>>,
    #[serde(default)]
    pub secret_key_file: Option<PathBuf>,
    #[serde(default)]
    pub access_key_file: Option<PathBuf>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            default_client_key: default_client_key(),
            secret_key: None,
            access_key: None,
            secret_key_file: None,
            access_key_file: None,
        }
    }
}

/// One tenant as described in settings. Every field but `client_id` may be
/// left out and is then filled from [`AuthSettings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantSettings {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub secret_key: Option<Secret<String>>,
    #[serde(default)]
    pub access_key: Option<Secret<String>>,
    #[serde(default)]
    pub default: Option<bool>,
}

fn default_timeout() -> u64 {
    30
}

fn default_client_key() -> String {
    "default".to_string()
}

impl Settings {
    /// Settings pointing at `host` with every other field defaulted.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            api: ApiSettings {
                host: host.into(),
                timeout_secs: default_timeout(),
            },
            auth: AuthSettings::default(),
            credentials: Vec::new(),
        }
    }

    /// Load settings from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&contents)?;
        settings.apply_env()?;
        settings.validate()?;
        debug!(
            path = %path.display(),
            tenants = settings.credentials.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Overlay `CONEXA_*` environment variables and resolve key files.
    ///
    /// Env vars take precedence over the `*_file` paths.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("CONEXA_API_HOST") {
            self.api.host = host;
        }
        if let Ok(client_id) = std::env::var("CONEXA_CLIENT_ID") {
            self.auth.client_id = Some(client_id);
        }
        self.auth.secret_key = resolve_key("CONEXA_SECRET_KEY", self.auth.secret_key_file.as_deref())?
            .or(self.auth.secret_key.take());
        self.auth.access_key = resolve_key("CONEXA_ACCESS_KEY", self.auth.access_key_file.as_deref())?
            .or(self.auth.access_key.take());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api.host.starts_with("http://") && !self.api.host.starts_with("https://") {
            return Err(Error::Config(format!(
                "api.host must start with http:// or https://, got: {}",
                self.api.host
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.auth.default_client_key.trim().is_empty() {
            return Err(Error::Config("auth.default_client_key is empty".into()));
        }
        Ok(())
    }

    /// Base URL every request path is appended to.
    pub fn api_endpoint(&self) -> String {
        format!("{}{API_PATH}", self.api.host.trim_end_matches('/'))
    }

    pub fn is_multi_tenant(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Resolve the settings file path from a CLI arg or `CONEXA_CONFIG`.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONEXA_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("conexa.toml")
    }
}

fn resolve_key(env_var: &str, file: Option<&Path>) -> Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(Some(Secret::new(value)));
    }
    let Some(path) = file else {
        return Ok(None);
    };
    let contents = std::fs::read_to_string(path).map_err(|source| Error::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;
    let key = contents.trim();
    if key.is_empty() {
        return Ok(None);
    }
    Ok(Some(Secret::from(key)))
}
