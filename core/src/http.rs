//! HTTP transport types for the backend dispatcher.
//!
//! # Design
//! These types describe requests and responses as plain data. The request
//! builder produces `HttpRequest` values and the classifier consumes
//! `RawResponse` values; only a `Transport` implementation ever touches the
//! network. Keeping both ends as plain data makes classification a pure
//! function that tests can drive with hand-built responses.

/// Request verb understood by the backend.
///
/// The wire transport always issues a POST; the real verb travels in the
/// method-override header as [`HttpMethod::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Update,
    Delete,
}

impl HttpMethod {
    /// Uppercase verb name sent in the method-override header.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Update => "UPDATE",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A fully-formed request ready for dispatch.
///
/// Built by `RequestBuilder::build`. `url` is absolute and `body` is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// First header value matching `name`, compared ASCII-case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// What the transport hands back once a request has completed.
///
/// `error` is empty unless the exchange failed below HTTP (unreachable host,
/// timeout, broken connection). The transport's own status code is not
/// carried; the authoritative status is echoed by the server in the
/// `REAL_STATUS` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub error: String,
    pub text: String,
    pub headers: Vec<(String, String)>,
}

impl RawResponse {
    /// A completed exchange with a body and headers.
    pub fn completed(text: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            error: String::new(),
            text: text.into(),
            headers,
        }
    }

    /// A transport-level failure.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    /// Header lookup; HTTP stacks normalise header case so this ignores it.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
