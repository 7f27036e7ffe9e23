//! Client-side request dispatcher for the game backend.
//!
//! # Overview
//! Builds requests, sends them through a pluggable `Transport`, and
//! classifies each completed exchange into exactly one `Outcome`, which is
//! delivered once to the caller's callback together with the name of the
//! operation that issued it.
//!
//! # Design
//! - `RequestBuilder` is pure: it decides URL, headers and body.
//! - `classify` is pure: the same `RawResponse` always yields the same
//!   `Outcome`. The backend's real status travels in a `REAL_STATUS` header.
//! - `Backend` owns the only suspension point, awaiting the transport.
//! - No request failure is ever returned as an error; the callback is the
//!   only channel for both success and failure.

pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod request;
pub mod transport;

pub use classify::{classify, resolve_status, Outcome, OutcomeKind};
pub use client::{callback, Backend, ResponseCallback};
pub use config::BackendConfig;
pub use error::{ConfigError, DispatchError, TransportError};
pub use form::Form;
pub use http::{HttpMethod, HttpRequest, RawResponse};
pub use request::{RequestBuilder, RequestSpec};
pub use transport::{Transport, UreqTransport};
