//! Multi-tenant session registry for the Conexa API
//!
//! Maps alias keys to logged-in [`conexa_auth::Session`]s and hands out valid
//! access tokens per alias. [`SessionRegistry`] implements
//! [`conexa_request::TokenSource`], so a `Pipeline` can authenticate calls
//! through it.
//!
//! Registry lifecycle:
//! 1. `SessionRegistry::connect()` logs in every configured tenant (all or nothing)
//! 2. `token_for()` returns the alias's token, refreshing it when expired
//! 3. `add_client()` logs in and registers further tenants at runtime

pub mod registry;

pub use registry::SessionRegistry;
