//! Conexa tenant authentication
//!
//! Credentials, login/refresh against the Conexa auth endpoints, and the
//! per-tenant [`Session`] that keeps an access token fresh. Has no knowledge
//! of the registry; it can be used and tested on its own.
//!
//! Session flow:
//! 1. A [`Credential`] is built from settings (`Credential::from_settings`)
//! 2. `Session::login()` posts it to `/pdvauth` and stores the token pair
//! 3. `Session::token()` checks the access token's `exp` claim and, when it
//!    has passed, trades the refresh token at `/refresh-token` first

pub mod constants;
pub mod credential;
pub mod jwt;
pub mod session;
pub mod token;

pub use constants::*;
pub use credential::{AccountKind, Credential, normalize_key};
pub use session::Session;
pub use token::{TokenPair, login, refresh};
