//! The wire transport.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. It takes a fully built
//! `HttpRequest` and resolves once the exchange is complete. Failures below
//! HTTP come back inside `RawResponse::error`, never as a Rust error, so the
//! classifier sees every exchange the same way.
//!
//! `UreqTransport` runs the blocking `ureq` call on tokio's blocking pool;
//! awaiting it never ties up a runtime worker.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpRequest, RawResponse};

/// Executes one request and reports how it completed.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> RawResponse;
}

/// `ureq`-backed transport.
///
/// Every request goes out as a POST carrying the request body; the real verb
/// is conveyed by the method-override header. HTTP statuses are never turned
/// into errors here; they are left to the classifier.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> RawResponse {
        let agent = self.agent.clone();
        let url = request.url.clone();
        let result = tokio::task::spawn_blocking(move || exchange(&agent, &request))
            .await
            .map_err(|e| TransportError::Aborted(e.to_string()))
            .and_then(|inner| inner);

        match result {
            Ok(response) => response,
            Err(err) => {
                debug!(%url, error = %err, "transport failure");
                RawResponse::failed(err.to_string())
            }
        }
    }
}

fn exchange(agent: &ureq::Agent, request: &HttpRequest) -> Result<RawResponse, TransportError> {
    let mut builder = agent.post(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let mut response = builder.send(&request.body[..])?;

    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    // Whole body; ureq caps read_to_string at 10 MB unless told otherwise.
    let text = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_string()
        .map_err(|e| TransportError::Body(e.to_string()))?;

    Ok(RawResponse::completed(text, headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[tokio::test]
    async fn unreachable_host_reports_error() {
        // Bind then drop to obtain a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://127.0.0.1:{port}/api/score/"),
            headers: Vec::new(),
            body: vec![1],
        };

        let response = UreqTransport::default().execute(request).await;
        assert!(!response.error.is_empty());
        assert!(response.text.is_empty());
    }

    #[tokio::test]
    async fn malformed_url_reports_error() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "not a url".to_string(),
            headers: Vec::new(),
            body: vec![1],
        };
        let response = UreqTransport::new(Some(Duration::from_secs(1)))
            .execute(request)
            .await;
        assert!(!response.error.is_empty());
    }
}
