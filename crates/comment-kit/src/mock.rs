//! Recording transport for testing code built on comment-kit.
//!
//! [`MockTransport`] stores every request it receives and answers with
//! scripted responses in FIFO order. Once the script runs out it answers
//! `200 {"response":null}`. Clones share state, so keep one handle for
//! assertions and hand another to the client.
//!
//! # Example
//!
//! ```no_run
//! use comment_kit::Comments;
//! use comment_kit::mock::MockTransport;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_find() {
//!     let mock = MockTransport::new();
//!     mock.respond_json(json!([{ "id": 42 }]));
//!
//!     let comments = Comments::builder("/").transport(mock.clone()).build().unwrap();
//!     let found = comments.find(false).of(42).fire().unwrap().await.unwrap();
//!
//!     assert_eq!(found, json!({ "id": 42 }));
//!     assert_eq!(mock.last_request().unwrap().target, "/?action=findById&postId=42&isRecursive=false&limit=1");
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{ExchangeFuture, Transport};
use crate::wire::{HttpRequest, HttpResponse};

#[derive(Default)]
struct MockState {
    requests: Vec<HttpRequest>,
    script: VecDeque<Result<HttpResponse, TransportError>>,
}

/// Scriptable in-memory [`Transport`].
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // Recover from poisoning; the recorded state is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a raw response.
    pub fn respond_with(&self, status: u16, body: impl Into<String>) -> &Self {
        self.state()
            .script
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a `200` response wrapping `value` in the `response` envelope.
    pub fn respond_json(&self, value: Value) -> &Self {
        let body = serde_json::json!({ "response": value }).to_string();
        self.respond_with(200, body)
    }

    /// Queue an exchange that never completes successfully.
    pub fn fail_with(&self, error: TransportError) -> &Self {
        self.state().script.push_back(Err(error));
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state().requests.last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("MockTransport")
            .field("requests", &state.requests.len())
            .field("scripted", &state.script.len())
            .finish()
    }
}

impl Transport for MockTransport {
    fn exchange(&self, request: HttpRequest) -> ExchangeFuture {
        let outcome = {
            let mut state = self.state();
            state.requests.push(request);
            state
                .script
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, r#"{"response":null}"#)))
        };
        Box::pin(async move { outcome })
    }
}
