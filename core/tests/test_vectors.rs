//! Verify request building and response classification against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Payloads are compared as parsed JSON, never as raw strings, so key order
//! in the vectors does not matter.

use backend_core::{
    classify, resolve_status, Form, HttpMethod, OutcomeKind, RawResponse, RequestBuilder,
    RequestSpec,
};
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "UPDATE" => HttpMethod::Update,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_kind(s: &str) -> OutcomeKind {
    match s {
        "Success" => OutcomeKind::Success,
        "ErrorFromClient" => OutcomeKind::ErrorFromClient,
        "ErrorFromServer" => OutcomeKind::ErrorFromServer,
        "ParseError" => OutcomeKind::ParseError,
        "BackendDisabled" => OutcomeKind::BackendDisabled,
        "RequestError" => OutcomeKind::RequestError,
        other => panic!("unknown outcome kind: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["response"];
        let expected = &case["expected"];

        let response = RawResponse {
            error: input["error"].as_str().unwrap().to_string(),
            text: input["text"].as_str().unwrap().to_string(),
            headers: pairs(&input["headers"]),
        };

        assert_eq!(
            resolve_status(&response),
            expected["status"].as_u64().unwrap() as u16,
            "{name}: status"
        );

        let outcome = classify(&response);
        assert_eq!(outcome.kind(), parse_kind(expected["kind"].as_str().unwrap()), "{name}: kind");
        assert_eq!(outcome.payload(), Some(&expected["payload"]).filter(|p| !p.is_null()), "{name}: payload");

        // Classification depends on nothing but the captured response.
        assert_eq!(classify(&response), outcome, "{name}: repeatable");
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/request.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let builder = RequestBuilder::new(vectors["base_url"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected = &case["expected_request"];

        let mut spec = RequestSpec::new(
            parse_method(input["method"].as_str().unwrap()),
            input["path"].as_str().unwrap(),
        )
        .token(input["token"].as_str().unwrap());
        if !input["form"].is_null() {
            let form = pairs(&input["form"])
                .into_iter()
                .fold(Form::new(), |form, (k, v)| form.field(k, v));
            spec = spec.form(form);
        }

        let req = builder.build(&spec);
        assert_eq!(req.method, spec.method, "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");

        let expected_body = match &expected["body"] {
            Value::String(s) => s.as_bytes().to_vec(),
            Value::Array(bytes) => bytes.iter().map(|b| b.as_u64().unwrap() as u8).collect(),
            other => panic!("{name}: unexpected body vector {other}"),
        };
        assert_eq!(req.body, expected_body, "{name}: body");
    }
}
