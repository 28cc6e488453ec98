//! HTTP transport used to perform exchanges.
//!
//! A [`Transport`] takes one serialized [`HttpRequest`] and resolves once,
//! when the exchange reaches its final state. [`ReqwestTransport`] is the
//! default implementation; [`MockTransport`](crate::mock::MockTransport)
//! records requests for tests.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::TransportError;
use crate::wire::{HttpMethod, HttpRequest, HttpResponse};

/// Future returned by [`Transport::exchange`].
pub type ExchangeFuture = BoxFuture<'static, Result<HttpResponse, TransportError>>;

/// Trait for performing a single HTTP exchange.
///
/// Implementations must not interpret the status code: any completed
/// exchange, including non-2xx, resolves to `Ok(HttpResponse)`. `Err` is
/// reserved for exchanges that never completed (connection refused, etc.).
///
/// # Example Implementation
///
/// ```rust
/// use comment_kit::{ExchangeFuture, HttpRequest, HttpResponse, Transport};
///
/// struct Canned;
///
/// impl Transport for Canned {
///     fn exchange(&self, _request: HttpRequest) -> ExchangeFuture {
///         Box::pin(async { Ok(HttpResponse::new(200, r#"{"response":0}"#)) })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Send the request and resolve with the final response.
    fn exchange(&self, request: HttpRequest) -> ExchangeFuture;
}

impl Transport for Arc<dyn Transport> {
    fn exchange(&self, request: HttpRequest) -> ExchangeFuture {
        (**self).exchange(request)
    }
}

/// [`Transport`] backed by a `reqwest` client.
///
/// Request targets are paths (`/comments?...`), so the transport resolves
/// them against an origin such as `https://example.com`. A target that is
/// already an absolute URL is sent as-is.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    origin: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport resolving targets against `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(origin, reqwest::Client::new())
    }

    /// Create a transport around an existing client.
    pub fn with_client(origin: impl Into<String>, client: reqwest::Client) -> Self {
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Self { origin, client }
    }

    /// Get the origin.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve a request target to an absolute URL.
    pub fn url_for(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else if target.starts_with('/') {
            format!("{}{}", self.origin, target)
        } else {
            format!("{}/{}", self.origin, target)
        }
    }
}

impl Transport for ReqwestTransport {
    fn exchange(&self, request: HttpRequest) -> ExchangeFuture {
        let url = self.url_for(&request.target);
        let client = self.client.clone();

        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => client.get(&url),
                HttpMethod::Post => client.post(&url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;

            Ok::<_, TransportError>(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_origin_and_path() {
        let transport = ReqwestTransport::new("https://example.com/");
        assert_eq!(transport.origin(), "https://example.com");
        assert_eq!(
            transport.url_for("/comments?postId=1"),
            "https://example.com/comments?postId=1"
        );
        assert_eq!(transport.url_for("api"), "https://example.com/api");
    }

    #[test]
    fn test_url_for_keeps_absolute_targets() {
        let transport = ReqwestTransport::new("https://example.com");
        assert_eq!(
            transport.url_for("http://other.test/c"),
            "http://other.test/c"
        );
    }
}
