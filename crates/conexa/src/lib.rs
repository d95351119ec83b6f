//! Conexa billing API client
//!
//! One entry point over the request pipeline, tenant authentication and the
//! session registry:
//!
//! 1. Load [`Settings`] (`Settings::load`) or build them in code
//! 2. `Client::connect(&settings)` logs in every configured tenant
//! 3. Use the helpers (`find`, `list`, `create`, `update`, `destroy`) or run
//!    a hand-built [`Call`]; `with_client_key` picks another tenant

pub mod client;

pub use client::{Client, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use common::Settings;
pub use conexa_auth::{AccountKind, Credential};
pub use conexa_pool::SessionRegistry;
pub use conexa_request::{
    Call, Error, FieldError, Method, Object, Payload, Resource, Result, StatusCode,
};
