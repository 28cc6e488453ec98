//! HTTP wire format for comment requests.
//!
//! Requests are flat `key=value` lists. Writes send them as a
//! form-url-encoded body against the base path; reads append them to the
//! base path as a query string. Responses are JSON objects whose `response`
//! field carries the result.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, TransportError};

/// Content type used for write requests.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Function used to percent-encode keys and values.
pub type UriEncoder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Characters escaped by [`encode_uri_component`]: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a string the way browsers' `encodeURIComponent` does.
///
/// ```
/// use comment_kit::wire::encode_uri_component;
///
/// assert_eq!(encode_uri_component("a b&c"), "a%20b%26c");
/// assert_eq!(encode_uri_component("héllo"), "h%C3%A9llo");
/// ```
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// The default [`UriEncoder`].
pub fn default_encoder() -> UriEncoder {
    Arc::new(encode_uri_component)
}

/// HTTP method of an exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully serialized request, ready for a [`Transport`](crate::Transport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Base path, plus the query string for reads.
    pub target: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Form body for writes; `None` for reads.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A completed exchange: status code and raw body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status / 100 == 2
    }
}

/// Join encoded pairs with `&`.
pub(crate) fn encode_pairs(pairs: &[(&str, String)], encoder: &UriEncoder) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encoder(*key), encoder(value.as_str())))
        .collect::<Vec<_>>()
        .join("&")
}

/// Serialize pairs into a request against `path`.
pub(crate) fn build_request(
    method: HttpMethod,
    path: &str,
    pairs: &[(&str, String)],
    encoder: &UriEncoder,
) -> HttpRequest {
    let encoded = encode_pairs(pairs, encoder);
    match method {
        HttpMethod::Post => HttpRequest {
            method,
            target: path.to_string(),
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(encoded),
        },
        HttpMethod::Get => {
            let target = if encoded.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{encoded}")
            };
            HttpRequest {
                method,
                target,
                headers: Vec::new(),
                body: None,
            }
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Value,
}

/// Turn a completed exchange into the delivered value.
///
/// A missing `response` field yields `null`. With `single`, an array result
/// is unwrapped to its first element, or `null` when empty.
pub(crate) fn normalize_response(response: HttpResponse, single: bool) -> Result<Value, Error> {
    if !response.is_success() {
        return Err(TransportError::status(response.status, response.body).into());
    }

    let envelope: Envelope = serde_json::from_str(&response.body)?;
    match envelope.response {
        Value::Array(items) if single => Ok(items.into_iter().next().unwrap_or(Value::Null)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_uri_component_keeps_unreserved() {
        assert_eq!(encode_uri_component("AZaz09-_.!~*'()"), "AZaz09-_.!~*'()");
        assert_eq!(encode_uri_component("a=b/c?d"), "a%3Db%2Fc%3Fd");
        assert_eq!(encode_uri_component(""), "");
    }

    #[test]
    fn test_post_request_carries_form_body() {
        let encoder = default_encoder();
        let pairs = [("body", "hello world".to_string()), ("username", "alice".to_string())];
        let req = build_request(HttpMethod::Post, "/comments", &pairs, &encoder);

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.target, "/comments");
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(req.body.as_deref(), Some("body=hello%20world&username=alice"));
    }

    #[test]
    fn test_get_request_omits_empty_query() {
        let encoder = default_encoder();
        let req = build_request(HttpMethod::Get, "/", &[], &encoder);
        assert_eq!(req.target, "/");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());

        let req = build_request(
            HttpMethod::Get,
            "/",
            &[("postId", "42".to_string()), ("limit", "1".to_string())],
            &encoder,
        );
        assert_eq!(req.target, "/?postId=42&limit=1");
    }

    #[test]
    fn test_custom_encoder_is_used_for_keys_and_values() {
        let encoder: UriEncoder = Arc::new(|s: &str| s.to_uppercase());
        let req = build_request(
            HttpMethod::Get,
            "/c",
            &[("assoc", "x".to_string())],
            &encoder,
        );
        assert_eq!(req.target, "/c?ASSOC=X");
    }

    #[test]
    fn test_normalize_unwraps_single() {
        let ok = HttpResponse::new(200, r#"{"response":[{"id":1},{"id":2}]}"#);
        assert_eq!(normalize_response(ok, true).unwrap(), json!({"id": 1}));

        let empty = HttpResponse::new(200, r#"{"response":[]}"#);
        assert_eq!(normalize_response(empty, true).unwrap(), Value::Null);
    }

    #[test]
    fn test_normalize_keeps_arrays_for_multi() {
        let ok = HttpResponse::new(200, r#"{"response":[{"id":1}]}"#);
        assert_eq!(normalize_response(ok, false).unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn test_normalize_passes_scalars_through() {
        let ok = HttpResponse::new(204, r#"{"response":3}"#);
        assert_eq!(normalize_response(ok, true).unwrap(), json!(3));

        let missing = HttpResponse::new(200, r#"{"other":true}"#);
        assert_eq!(normalize_response(missing, false).unwrap(), Value::Null);
    }

    #[test]
    fn test_normalize_non_2xx_is_status_error() {
        let err = normalize_response(HttpResponse::new(500, "boom"), false).unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Status { status: 500, ref body }) if body == "boom"
        ));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_normalize_invalid_json_is_json_error() {
        let err = normalize_response(HttpResponse::new(200, "not json"), false).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
