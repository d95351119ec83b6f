//! Request pipeline for the Conexa billing API
//!
//! Describes, authenticates, executes and classifies HTTP calls against
//! `<host>/index.php/api/v2`. Token acquisition is abstracted behind the
//! [`TokenSource`] trait so the session registry can live in its own crate.
//!
//! Call flow:
//! 1. Caller builds a [`Call`] (`Call::get("/customers").client_key("shop")`)
//! 2. [`Pipeline::execute`] asks the `TokenSource` for the alias's token
//! 3. [`Transport::send`] builds URL/headers/body and performs the request
//! 4. Success is decoded (`data` envelope unwrapped); failure becomes an [`Error`]

pub mod call;
pub mod case;
pub mod classify;
pub mod error;
pub mod pipeline;
pub mod resource;
pub mod transport;

pub use call::Call;
pub use classify::{Payload, classify_failure, decode_success};
pub use error::{Error, FieldError, RequestSummary, Result};
pub use pipeline::{Pipeline, TokenFuture, TokenSource};
pub use resource::{Object, Resource};
pub use transport::Transport;

pub use reqwest::{Method, StatusCode};
