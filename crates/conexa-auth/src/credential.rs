//! Tenant credentials
//!
//! A [`Credential`] is one tenant's API keys plus the alias callers use to
//! pick it. Fields not given per tenant fall back to the `[auth]` defaults;
//! only the client id is mandatory.

use std::fmt;
use std::str::FromStr;

use common::{AuthSettings, Secret, TenantSettings};
use conexa_request::{Error, Result};

/// Which kind of Conexa account the credential belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// Point-of-sale account (the usual case).
    #[default]
    Pdv,
    ECommerce,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Pdv => "pdv",
            AccountKind::ECommerce => "e_commerce",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdv" => Ok(AccountKind::Pdv),
            // The API's own spelling drops an 'm'; accept both.
            "e_commerce" | "e_comerce" => Ok(AccountKind::ECommerce),
            other => Err(Error::invalid_parameter(
                format!("incorrect client type {other:?}, must be one of: pdv, e_commerce"),
                "kind",
                "pdv | e_commerce",
            )),
        }
    }
}

/// One tenant's login material.
///
/// Immutable apart from the `default` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    key: String,
    kind: AccountKind,
    client_id: String,
    secret_key: Secret<String>,
    access_key: Secret<String>,
    default: bool,
}

impl Credential {
    /// Credential with explicit keys, `Pdv` kind, marked default.
    pub fn new(
        key: &str,
        client_id: impl Into<String>,
        secret_key: impl Into<Secret<String>>,
        access_key: impl Into<Secret<String>>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(missing("client_id"));
        }
        Ok(Self {
            key: normalize_key(key)?,
            kind: AccountKind::default(),
            client_id,
            secret_key: secret_key.into(),
            access_key: access_key.into(),
            default: true,
        })
    }

    pub fn with_kind(mut self, kind: AccountKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build from one `[[credentials]]` entry, filling gaps from `[auth]`.
    pub fn from_settings(tenant: &TenantSettings, auth: &AuthSettings) -> Result<Self> {
        let client_id = tenant
            .client_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| missing("client_id"))?;
        let kind = match tenant.kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => AccountKind::default(),
        };
        let key = tenant
            .key
            .as_deref()
            .unwrap_or(auth.default_client_key.as_str());

        Ok(Self {
            key: normalize_key(key)?,
            kind,
            client_id: client_id.to_string(),
            secret_key: fallback(&tenant.secret_key, &auth.secret_key),
            access_key: fallback(&tenant.access_key, &auth.access_key),
            default: tenant.default.unwrap_or(true),
        })
    }

    /// The lone credential used when no `[[credentials]]` list is configured.
    pub fn single_tenant(auth: &AuthSettings) -> Result<Self> {
        let tenant = TenantSettings {
            key: Some(auth.default_client_key.clone()),
            client_id: auth.client_id.clone(),
            default: Some(true),
            ..TenantSettings::default()
        };
        Self::from_settings(&tenant, auth)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn secret_key(&self) -> &Secret<String> {
        &self.secret_key
    }

    pub fn access_key(&self) -> &Secret<String> {
        &self.access_key
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn set_default(&mut self, default: bool) {
        self.default = default;
    }

    /// Export back into settings form, e.g. to register the same tenant elsewhere.
    pub fn to_settings(&self) -> TenantSettings {
        TenantSettings {
            key: Some(self.key.clone()),
            client_id: Some(self.client_id.clone()),
            kind: Some(self.kind.to_string()),
            secret_key: Some(self.secret_key.clone()),
            access_key: Some(self.access_key.clone()),
            default: Some(self.default),
        }
    }
}

/// Canonical alias: trimmed, with runs of whitespace or `-` collapsed to `_`.
pub fn normalize_key(key: &str) -> Result<String> {
    let mut out = String::with_capacity(key.len());
    let mut pending_sep = false;
    for c in key.trim().chars() {
        if c.is_whitespace() || c == '-' {
            pending_sep = true;
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.push(c);
    }
    if out.is_empty() {
        return Err(Error::invalid_parameter(
            "client key must not be empty",
            "key",
            "non-empty String",
        ));
    }
    Ok(out)
}

fn fallback(own: &Option<Secret<String>>, default: &Option<Secret<String>>) -> Secret<String> {
    own.as_ref()
        .or(default.as_ref())
        .cloned()
        .unwrap_or_else(|| Secret::new(String::new()))
}

fn missing(field: &str) -> Error {
    Error::invalid_parameter(
        format!("missing data for credentials: {field}"),
        field,
        "String",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthSettings {
        AuthSettings {
            client_id: Some("100".into()),
            secret_key: Some("global-secret".into()),
            access_key: Some("global-access".into()),
            ..AuthSettings::default()
        }
    }

    #[test]
    fn kind_parses_both_spellings() {
        assert_eq!("pdv".parse::<AccountKind>().unwrap(), AccountKind::Pdv);
        assert_eq!(
            "e_commerce".parse::<AccountKind>().unwrap(),
            AccountKind::ECommerce
        );
        assert_eq!(
            "E_COMERCE".parse::<AccountKind>().unwrap(),
            AccountKind::ECommerce
        );
    }

    #[test]
    fn unknown_kind_is_invalid_parameter() {
        let err = "marketplace".parse::<AccountKind>().unwrap_err();
        match err {
            Error::InvalidParameter { parameter, .. } => assert_eq!(parameter, "kind"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn tenant_fills_gaps_from_auth_defaults() {
        let tenant = TenantSettings {
            key: Some("store-a".into()),
            client_id: Some("7".into()),
            ..TenantSettings::default()
        };
        let credential = Credential::from_settings(&tenant, &auth()).unwrap();
        assert_eq!(credential.key(), "store_a");
        assert_eq!(credential.client_id(), "7");
        assert_eq!(credential.kind(), AccountKind::Pdv);
        assert_eq!(credential.secret_key().expose_str(), "global-secret");
        assert_eq!(credential.access_key().expose_str(), "global-access");
        assert!(credential.is_default());
    }

    #[test]
    fn tenant_keys_override_defaults() {
        let tenant = TenantSettings {
            key: Some("shop".into()),
            client_id: Some("8".into()),
            kind: Some("e_commerce".into()),
            secret_key: Some("own-secret".into()),
            default: Some(false),
            ..TenantSettings::default()
        };
        let credential = Credential::from_settings(&tenant, &auth()).unwrap();
        assert_eq!(credential.kind(), AccountKind::ECommerce);
        assert_eq!(credential.secret_key().expose_str(), "own-secret");
        assert_eq!(credential.access_key().expose_str(), "global-access");
        assert!(!credential.is_default());
    }

    #[test]
    fn missing_client_id_is_invalid_parameter() {
        let tenant = TenantSettings {
            key: Some("shop".into()),
            ..TenantSettings::default()
        };
        let err = Credential::from_settings(&tenant, &auth()).unwrap_err();
        assert!(err.to_string().contains("client_id"), "got: {err}");
    }

    #[test]
    fn single_tenant_uses_default_alias() {
        let credential = Credential::single_tenant(&auth()).unwrap();
        assert_eq!(credential.key(), "default");
        assert_eq!(credential.client_id(), "100");
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_key("  store a ").unwrap(), "store_a");
        assert_eq!(normalize_key("store--a").unwrap(), "store_a");
        assert_eq!(normalize_key("store_a").unwrap(), "store_a");
        assert!(normalize_key("   ").is_err());
    }

    #[test]
    fn export_round_trips_through_settings() {
        let mut credential = Credential::new("shop", "9", "s", "a")
            .unwrap()
            .with_kind(AccountKind::ECommerce);
        credential.set_default(false);
        let again = Credential::from_settings(&credential.to_settings(), &AuthSettings::default())
            .unwrap();
        assert_eq!(again, credential);
    }

    #[test]
    fn debug_does_not_leak_keys() {
        let credential = Credential::new("shop", "9", "top-secret", "a").unwrap();
        assert!(!format!("{credential:?}").contains("top-secret"));
    }
}
