//! Asynchronous request dispatcher.
//!
//! # Design
//! `Backend` combines a `RequestBuilder`, a `Transport` and the classifier.
//! `request` is the awaitable form: build, execute, classify. `send` is the
//! fire-and-forget form: it spawns one task per request which awaits
//! `request` and then hands the outcome to the callback. The callback is an
//! `FnOnce`, so it can be invoked at most once, and every path through the
//! task ends by invoking it.
//!
//! Requests share no mutable state. Each task owns its request and response,
//! and concurrent requests complete in whatever order the transport finishes
//! them.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;

use crate::classify::{classify, Outcome};
use crate::config::BackendConfig;
use crate::error::DispatchError;
use crate::request::{RequestBuilder, RequestSpec};
use crate::transport::{Transport, UreqTransport};

/// Receives the outcome of one request together with the name of the
/// operation that issued it.
pub type ResponseCallback = Box<dyn FnOnce(Outcome, &str) + Send + 'static>;

/// Wrap a closure as a `ResponseCallback`.
pub fn callback<F>(f: F) -> Option<ResponseCallback>
where
    F: FnOnce(Outcome, &str) + Send + 'static,
{
    Some(Box::new(f))
}

/// Dispatcher for one backend.
#[derive(Clone)]
pub struct Backend {
    config: BackendConfig,
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl Backend {
    pub fn new(config: BackendConfig, transport: Arc<dyn Transport>) -> Self {
        let builder = RequestBuilder::new(config.base_url());
        Self {
            config,
            builder,
            transport,
        }
    }

    /// Backend using `UreqTransport` with the configured timeout.
    pub fn with_ureq(config: BackendConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout()));
        Self::new(config, transport)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Dispatch `spec` and wait for its outcome.
    ///
    /// Resolves to `BackendDisabled` without dispatching when the backend is
    /// switched off in the config.
    pub async fn request(&self, spec: RequestSpec, callee: &str) -> Outcome {
        if !self.config.enabled {
            debug!(callee, path = %spec.path, "backend disabled, request not sent");
            return Outcome::BackendDisabled;
        }

        let request = self.builder.build(&spec);
        debug!(
            callee,
            method = spec.method.as_str(),
            url = %request.url,
            authenticated = !spec.token.is_empty(),
            "dispatching request"
        );

        let response = self.transport.execute(request).await;
        let outcome = classify(&response);
        debug!(callee, outcome = ?outcome.kind(), "request completed");
        outcome
    }

    /// Dispatch `spec` in the background and deliver its outcome to
    /// `callback`.
    ///
    /// Returns immediately. Without a callback the request is still sent but
    /// nothing is delivered. Outside a tokio runtime nothing is sent, the
    /// callback is dropped uninvoked and `DispatchError::NoRuntime` is
    /// returned.
    pub fn send(
        &self,
        spec: RequestSpec,
        callee: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let handle = Handle::try_current()?;
        let backend = self.clone();
        let callee = callee.to_string();
        handle.spawn(async move {
            let outcome = backend.request(spec, &callee).await;
            if let Some(callback) = callback {
                callback(outcome, &callee);
            }
        });
        Ok(())
    }

    /// Deliver an outcome decided before dispatch, on a task of its own so
    /// callers observe the same asynchronous delivery as `send`.
    pub(crate) fn deliver(
        &self,
        outcome: Outcome,
        callee: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let handle = Handle::try_current()?;
        let Some(callback) = callback else {
            return Ok(());
        };
        let callee = callee.to_string();
        debug!(callee = %callee, outcome = ?outcome.kind(), "request not sent");
        handle.spawn(async move {
            callback(outcome, &callee);
        });
        Ok(())
    }
}
