//! Error types for configuration loading, dispatch and the wire transport.
//!
//! # Design
//! Request failures never surface as Rust errors: the dispatcher reports
//! them as an `Outcome`. These types cover the places where a plain
//! `Result` still makes sense. `ConfigError` is returned to whoever loads the
//! configuration, `DispatchError` to a caller of `Backend::send` when no
//! request could be started, and `TransportError` is rendered into
//! `RawResponse::error` by the transport.

use thiserror::Error;

/// Errors returned by `BackendConfig::from_env`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A boolean variable held something other than true/false/1/0.
    #[error("{var} must be a boolean, got {value:?}")]
    InvalidFlag { var: String, value: String },

    /// A numeric variable did not parse.
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: String, value: String },

    /// A base URL variable was set but empty.
    #[error("{var} must not be empty")]
    EmptyUrl { var: String },
}

/// Raised by `Backend::send` when the request cannot be started at all. No
/// callback is invoked in that case.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no tokio runtime to dispatch on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Failures below HTTP, produced while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] ureq::Error),

    #[error("could not read response body: {0}")]
    Body(String),

    #[error("transport task aborted: {0}")]
    Aborted(String),
}
