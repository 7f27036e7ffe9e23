//! Request assembly.
//!
//! # Design
//! `RequestBuilder` holds only the active base URL and performs no I/O, so
//! building a request cannot fail. Everything the backend needs to see on the
//! wire is decided here: the content negotiation header, the method-override
//! header carrying the real verb, the optional token and the body.

use crate::form::Form;
use crate::http::{HttpMethod, HttpRequest};

/// Header carrying the real verb; the transport itself always POSTs.
pub const METHOD_OVERRIDE_HEADER: &str = "UNITY_METHOD";

/// Body sent when the caller has none. The transport refuses empty bodies.
pub const EMPTY_BODY_SENTINEL: &[u8] = &[1];

/// Everything a caller decides about one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub form: Option<Form>,
    /// Empty for anonymous requests.
    pub token: String,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            form: None,
            token: String::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

/// Turns a `RequestSpec` into an `HttpRequest` against one base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build(&self, spec: &RequestSpec) -> HttpRequest {
        let (body, mut headers) = match spec.form.as_ref().filter(|form| !form.is_empty()) {
            Some(form) => (form.data(), form.headers()),
            None => (EMPTY_BODY_SENTINEL.to_vec(), Vec::new()),
        };

        headers.push(("Accept".to_string(), "application/json".to_string()));
        headers.push((
            METHOD_OVERRIDE_HEADER.to_string(),
            spec.method.as_str().to_string(),
        ));
        if !spec.token.is_empty() {
            headers.push(("Authorization".to_string(), format!("Token {}", spec.token)));
        }

        HttpRequest {
            method: spec.method,
            url: format!("{}{}", self.base_url, spec.path),
            headers,
            body,
        }
    }
}
