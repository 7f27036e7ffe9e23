//! Response classification.
//!
//! # Design
//! `classify` is a pure function of a `RawResponse`: the same captured
//! response always yields the same `Outcome`. The decision runs in a fixed
//! order and each step short-circuits:
//!
//! 1. a non-empty transport error is a `RequestError`;
//! 2. the status comes from the `REAL_STATUS` header, defaulting to 200;
//! 3. statuses in `[200, 206]` are successful, everything else is not;
//! 4. the body is parsed as a JSON array (if it starts with `[`) or object,
//!    and the parse result combined with the status band picks the outcome.

use serde_json::Value;
use tracing::warn;

use crate::http::RawResponse;

/// Header in which the backend echoes the authoritative status line.
pub const REAL_STATUS_HEADER: &str = "REAL_STATUS";

pub const DEFAULT_STATUS: u16 = 200;

/// Result of one request, carrying its payload where there is one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Successful status. `None` when the body was empty (e.g. 204).
    Success(Option<Value>),
    /// Rejected by caller-side validation before dispatch.
    ErrorFromClient(Value),
    /// Unsuccessful status with a well-formed body describing the error.
    ErrorFromServer(Value),
    /// The body was not a JSON array or object where one was required.
    ParseError,
    /// The backend is switched off; nothing was dispatched.
    BackendDisabled,
    /// The exchange failed below HTTP.
    RequestError,
}

/// Payload-free discriminant of an `Outcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    ErrorFromClient,
    ErrorFromServer,
    ParseError,
    BackendDisabled,
    RequestError,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success(_) => OutcomeKind::Success,
            Outcome::ErrorFromClient(_) => OutcomeKind::ErrorFromClient,
            Outcome::ErrorFromServer(_) => OutcomeKind::ErrorFromServer,
            Outcome::ParseError => OutcomeKind::ParseError,
            Outcome::BackendDisabled => OutcomeKind::BackendDisabled,
            Outcome::RequestError => OutcomeKind::RequestError,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Outcome::Success(payload) => payload.as_ref(),
            Outcome::ErrorFromClient(payload) | Outcome::ErrorFromServer(payload) => Some(payload),
            Outcome::ParseError | Outcome::BackendDisabled | Outcome::RequestError => None,
        }
    }

    pub fn into_payload(self) -> Option<Value> {
        match self {
            Outcome::Success(payload) => payload,
            Outcome::ErrorFromClient(payload) | Outcome::ErrorFromServer(payload) => Some(payload),
            Outcome::ParseError | Outcome::BackendDisabled | Outcome::RequestError => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Status the server reported in `REAL_STATUS`, or 200 without the header.
///
/// The header value is a status line such as `"404 Not Found"`; only the
/// leading integer token counts. A header that does not start with a number
/// resolves to 0, which falls outside the successful band.
pub fn resolve_status(response: &RawResponse) -> u16 {
    let Some(value) = response.header(REAL_STATUS_HEADER) else {
        return DEFAULT_STATUS;
    };
    match value.split_whitespace().next().map(str::parse::<u16>) {
        Some(Ok(status)) => status,
        _ => {
            warn!(value, "unparsable REAL_STATUS header");
            0
        }
    }
}

pub fn is_successful(status: u16) -> bool {
    (200..=206).contains(&status)
}

/// Parse a body as a top-level JSON array or object.
///
/// Text starting with `[` must be an array; anything else must be an object.
pub fn parse_payload(text: &str) -> Result<Value, serde_json::Error> {
    if text.starts_with('[') {
        serde_json::from_str::<Vec<Value>>(text).map(Value::Array)
    } else {
        serde_json::from_str::<serde_json::Map<String, Value>>(text).map(Value::Object)
    }
}

/// Turn a completed exchange into its `Outcome`.
pub fn classify(response: &RawResponse) -> Outcome {
    if !response.error.is_empty() {
        return Outcome::RequestError;
    }

    let status = resolve_status(response);
    let successful = is_successful(status);

    match parse_payload(&response.text) {
        Ok(payload) if successful => Outcome::Success(Some(payload)),
        Ok(payload) => Outcome::ErrorFromServer(payload),
        Err(_) if successful && response.text.is_empty() => Outcome::Success(None),
        Err(err) => {
            warn!(status, text = %response.text, error = %err, "could not parse the response");
            Outcome::ParseError
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn with_status(status: &str, text: &str) -> RawResponse {
        RawResponse::completed(
            text,
            vec![(REAL_STATUS_HEADER.to_string(), status.to_string())],
        )
    }

    #[test]
    fn transport_error_wins_over_everything() {
        let response = RawResponse {
            error: "Couldn't connect to server".to_string(),
            text: r#"{"ok":true}"#.to_string(),
            headers: vec![(REAL_STATUS_HEADER.to_string(), "200 OK".to_string())],
        };
        assert_eq!(classify(&response), Outcome::RequestError);
    }

    #[test]
    fn status_defaults_to_200() {
        assert_eq!(resolve_status(&RawResponse::completed("", Vec::new())), 200);
    }

    #[test]
    fn status_takes_leading_token() {
        assert_eq!(resolve_status(&with_status("404 Not Found", "")), 404);
        assert_eq!(resolve_status(&with_status("  201   Created", "")), 201);
        assert_eq!(resolve_status(&with_status("204", "")), 204);
    }

    #[test]
    fn garbage_status_is_unsuccessful() {
        let response = with_status("teapot", r#"{"a":1}"#);
        assert_eq!(resolve_status(&response), 0);
        assert_eq!(classify(&response), Outcome::ErrorFromServer(json!({"a": 1})));
    }

    #[test]
    fn success_band_is_200_through_206() {
        assert!(!is_successful(199));
        assert!(is_successful(200));
        assert!(is_successful(206));
        assert!(!is_successful(207));
        assert!(!is_successful(302));
        assert!(!is_successful(404));
    }

    #[test]
    fn empty_body_on_success_has_no_payload() {
        assert_eq!(classify(&with_status("204 No Content", "")), Outcome::Success(None));
        assert_eq!(classify(&RawResponse::completed("", Vec::new())), Outcome::Success(None));
    }

    #[test]
    fn object_and_array_bodies_on_success() {
        let response = RawResponse::completed("{}", Vec::new());
        assert_eq!(classify(&response), Outcome::Success(Some(json!({}))));

        let response = RawResponse::completed("[1,2,3]", Vec::new());
        assert_eq!(classify(&response), Outcome::Success(Some(json!([1, 2, 3]))));
    }

    #[test]
    fn error_status_with_json_keeps_detail() {
        let response = with_status("404 Not Found", r#"{"detail":"not found"}"#);
        let outcome = classify(&response);
        assert_eq!(outcome, Outcome::ErrorFromServer(json!({"detail": "not found"})));
        assert_eq!(outcome.payload(), Some(&json!({"detail": "not found"})));
    }

    #[test]
    fn error_status_with_html_is_parse_error() {
        let response = with_status("500 Internal Server Error", "<html>error</html>");
        assert_eq!(classify(&response), Outcome::ParseError);
    }

    #[test]
    fn error_status_with_empty_body_is_parse_error() {
        assert_eq!(classify(&with_status("404 Not Found", "")), Outcome::ParseError);
    }

    #[test]
    fn malformed_body_on_success_is_parse_error() {
        assert_eq!(classify(&RawResponse::completed("not json", Vec::new())), Outcome::ParseError);
    }

    #[test]
    fn top_level_scalars_are_rejected() {
        assert!(parse_payload("42").is_err());
        assert!(parse_payload(r#""text""#).is_err());
        assert!(parse_payload("[1,").is_err());
        assert_eq!(parse_payload(r#"{"a":[1]}"#).unwrap(), json!({"a": [1]}));
    }

    #[test]
    fn classification_is_repeatable() {
        let response = with_status("400 Bad Request", r#"{"score":["required"]}"#);
        assert_eq!(classify(&response), classify(&response));
    }

    #[test]
    fn kind_and_payload_accessors() {
        assert_eq!(Outcome::RequestError.kind(), OutcomeKind::RequestError);
        assert_eq!(Outcome::BackendDisabled.payload(), None);
        assert_eq!(Outcome::Success(None).into_payload(), None);
        assert!(Outcome::Success(None).is_success());
        assert!(!Outcome::ParseError.is_success());
    }
}
