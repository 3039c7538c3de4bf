//! The outbound response envelope and its builder helpers.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, io::Read};
use tinytemplate::TinyTemplate;

/// The response returned to the host for one invocation.
///
/// Built by a single constructor call, returned from the handler, and
/// serialized by the runtime. The constructors take an [`http::StatusCode`]
/// so only valid statuses can be expressed; `headers` and
/// `multiValueHeaders` are omitted from the wire document while empty, as
/// is a false `isBase64Encoded` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

impl Response {
    /// An empty 200 response.
    pub fn ok() -> Self {
        Self::status(StatusCode::OK)
    }

    /// An empty response with the given status.
    pub fn status(code: StatusCode) -> Self {
        Self::text_status(code, "")
    }

    /// A 200 response carrying a plain text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::text_status(StatusCode::OK, body)
    }

    /// A response carrying a plain text body with the given status.
    pub fn text_status(code: StatusCode, body: impl Into<String>) -> Self {
        Response {
            status_code: code.as_u16(),
            headers: HashMap::new(),
            multi_value_headers: HashMap::new(),
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    /// A 200 response whose body is `value` serialized as JSON.
    ///
    /// Serialization failure is folded into a 500 response carrying the
    /// error's message; it never reaches the handler's caller.
    pub fn json<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        Self::json_status(StatusCode::OK, value)
    }

    /// A response whose body is `value` serialized as JSON, with the given
    /// status.
    pub fn json_status<T>(code: StatusCode, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(value) {
            Ok(body) => Self::text_status(code, body),
            Err(err) => Self::render_err(err),
        }
    }

    /// A 200 response carrying a base64 encoded binary body.
    pub fn binary(content: impl AsRef<[u8]>) -> Self {
        Self::binary_status(StatusCode::OK, content)
    }

    /// A response carrying a base64 encoded binary body with the given
    /// status.
    pub fn binary_status(code: StatusCode, content: impl AsRef<[u8]>) -> Self {
        let mut response = Self::text_status(code, base64::encode(content));
        response.is_base64_encoded = true;
        response
    }

    /// A 200 response produced by interpolating `data` into `template`.
    ///
    /// Both parse and interpolation failures are folded into a 500
    /// response carrying the error's message.
    pub fn render<T>(template: &str, data: &T) -> Self
    where
        T: Serialize,
    {
        let mut templates = TinyTemplate::new();
        if let Err(err) = templates.add_template("response", template) {
            return Self::render_err(err);
        }
        match templates.render("response", data) {
            Ok(body) => Self::text(body),
            Err(err) => Self::render_err(err),
        }
    }

    /// Like [`Response::render`], reading the template text from `template`.
    pub fn render_reader<R, T>(mut template: R, data: &T) -> Self
    where
        R: Read,
        T: Serialize,
    {
        let mut text = String::new();
        if let Err(err) = template.read_to_string(&mut text) {
            return Self::render_err(err);
        }
        Self::render(&text, data)
    }

    /// A 500 response carrying the error's message as its body.
    pub fn err(err: impl fmt::Display) -> Self {
        Self::err_status(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// A response carrying the error's message as its body, with the given
    /// status.
    pub fn err_status(code: StatusCode, err: impl fmt::Display) -> Self {
        Self::text_status(code, err.to_string())
    }

    fn render_err(err: impl fmt::Display) -> Self {
        Self::err(format!("server encountered an error while rendering a response: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;
    use serde_json::{json, Value};
    use std::io;

    #[test]
    fn text_status_sets_status_and_body() {
        let response = Response::text_status(StatusCode::CREATED, "made");
        assert_eq!(response.status_code, 201);
        assert_eq!(response.body, "made");
        assert!(!response.is_base64_encoded);
    }

    #[test]
    fn ok_status_and_empty_text_agree() {
        assert_eq!(Response::ok(), Response::status(StatusCode::OK));
        assert_eq!(Response::ok(), Response::text_status(StatusCode::OK, ""));
    }

    #[test]
    fn json_serializes_the_payload() {
        let response = Response::json(&json!({ "msg": "ok" }));
        assert_eq!(response.status_code, 200);
        let body: Value = serde_json::from_str(&response.body).expect("body was not JSON");
        assert_eq!(body, json!({ "msg": "ok" }));
    }

    #[test]
    fn json_failures_become_a_500_response() {
        // non-string map keys cannot be serialized as JSON
        let payload = hashmap! { vec![1u8] => "value" };
        let response = Response::json(&payload);
        assert_eq!(response.status_code, 500);
        assert!(!response.body.is_empty());
    }

    #[test]
    fn err_status_carries_the_message() {
        let failure = io::Error::new(io::ErrorKind::Other, "boom");
        let response = Response::err_status(StatusCode::BAD_GATEWAY, failure);
        assert_eq!(response.status_code, 502);
        assert_eq!(response.body, "boom");
    }

    #[test]
    fn err_defaults_to_500() {
        let failure = io::Error::new(io::ErrorKind::Other, "boom");
        let response = Response::err(failure);
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "boom");
    }

    #[test]
    fn render_interpolates_data() {
        let response = Response::render("Hello {name}", &json!({ "name": "Netlify" }));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "Hello Netlify");
    }

    #[test]
    fn render_failures_become_a_500_response() {
        let response = Response::render("Hello {name", &json!({ "name": "Netlify" }));
        assert_eq!(response.status_code, 500);
        assert!(response
            .body
            .starts_with("server encountered an error while rendering a response"));
    }

    #[test]
    fn render_reader_reads_the_template() {
        let template = io::Cursor::new("Hello {name}");
        let response = Response::render_reader(template, &json!({ "name": "Netlify" }));
        assert_eq!(response.body, "Hello Netlify");
    }

    #[test]
    fn binary_bodies_are_encoded() {
        let response = Response::binary(b"\x00\x01");
        assert_eq!(response.body, "AAE=");
        assert!(response.is_base64_encoded);
        let json = serde_json::to_string(&response).expect("failed to serialize response");
        assert_eq!(json, r#"{"statusCode":200,"body":"AAE=","isBase64Encoded":true}"#);
    }

    #[test]
    fn serialize_text_response() {
        let json = serde_json::to_string(&Response::text("Hello Netlify")).expect("failed to serialize response");
        assert_eq!(json, r#"{"statusCode":200,"body":"Hello Netlify"}"#);
    }

    #[test]
    fn serialize_json_response() {
        let json = serde_json::to_string(&Response::json(&json!({ "msg": "ok" }))).expect("failed to serialize response");
        assert_eq!(json, r#"{"statusCode":200,"body":"{\"msg\":\"ok\"}"}"#);
    }

    #[test]
    fn serialize_error_response() {
        let failure = io::Error::new(io::ErrorKind::Other, "boom");
        let json = serde_json::to_string(&Response::err(failure)).expect("failed to serialize response");
        assert_eq!(json, r#"{"statusCode":500,"body":"boom"}"#);
    }

    #[test]
    fn serialize_headers() {
        let response = Response {
            headers: hashmap! { "content-type".to_string() => "text/html".to_string() },
            multi_value_headers: hashmap! {
                "set-cookie".to_string() => vec!["a=1".to_string(), "b=2".to_string()],
            },
            ..Response::ok()
        };
        let json = serde_json::to_string(&response).expect("failed to serialize response");
        assert_eq!(
            json,
            r#"{"statusCode":200,"headers":{"content-type":"text/html"},"multiValueHeaders":{"set-cookie":["a=1","b=2"]},"body":""}"#
        );
    }

    #[test]
    fn round_trips_through_the_wire_format() {
        let response = Response::text_status(StatusCode::NOT_FOUND, "nope");
        let json = serde_json::to_string(&response).expect("failed to serialize response");
        let parsed: Response = serde_json::from_str(&json).expect("failed to parse response");
        assert_eq!(parsed, response);
    }
}
