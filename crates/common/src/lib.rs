//! Common types shared by the Conexa client crates
//!
//! Holds the redacting `Secret` wrapper and the process-wide settings that
//! supply defaults for credentials and the API host.

mod error;
mod secret;
pub mod settings;

pub use error::{Error, Result};
pub use secret::Secret;
pub use settings::{ApiSettings, AuthSettings, Settings, TenantSettings};
