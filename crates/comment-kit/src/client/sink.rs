//! Result delivery for dispatched requests.
//!
//! Dispatch hands its outcome to a [`ResultSink`] exactly once. The sink
//! either invokes a caller-supplied callback or completes a [`Pending`]
//! future; dispatch itself never knows which.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, TransportError};

/// Callback accepted by [`PreparedAction::fire_with`](crate::PreparedAction::fire_with).
pub type Callback = Box<dyn FnOnce(Result<Value, Error>) + Send + 'static>;

/// One-shot destination for a dispatch outcome.
///
/// A sink dropped without delivering (the exchange task was cancelled,
/// for instance because its runtime shut down) delivers
/// [`TransportError::Dropped`] instead.
pub(crate) struct ResultSink {
    target: Option<Target>,
}

enum Target {
    Callback(Callback),
    Channel(oneshot::Sender<Result<Value, Error>>),
}

impl Target {
    fn send(self, outcome: Result<Value, Error>) {
        match self {
            Target::Callback(callback) => callback(outcome),
            Target::Channel(tx) => {
                // The receiver may have been dropped; the exchange still ran.
                let _ = tx.send(outcome);
            }
        }
    }
}

impl ResultSink {
    /// Create a sink invoking `callback`.
    pub(crate) fn callback(callback: Callback) -> Self {
        Self {
            target: Some(Target::Callback(callback)),
        }
    }

    /// Create a sink feeding a [`Pending`] future.
    pub(crate) fn channel<T>() -> (Self, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            target: Some(Target::Channel(tx)),
        };
        (sink, Pending::new(rx))
    }

    /// Deliver the outcome. Consumes the sink, so delivery happens once.
    pub(crate) fn deliver(mut self, outcome: Result<Value, Error>) {
        if let Some(target) = self.target.take() {
            target.send(outcome);
        }
    }
}

impl Drop for ResultSink {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            tracing::debug!("comment request dropped before completing");
            target.send(Err(TransportError::Dropped.into()));
        }
    }
}

/// Future resolving to the normalized result of a dispatched request.
///
/// The exchange runs on the executor independently of this handle:
/// dropping a `Pending` does not stop it.
///
/// `T` defaults to [`serde_json::Value`]; use
/// [`PreparedAction::fire_as`](crate::PreparedAction::fire_as) to decode into
/// your own type.
#[must_use = "a Pending does nothing unless awaited; the exchange runs regardless"]
pub struct Pending<T = Value> {
    rx: oneshot::Receiver<Result<Value, Error>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Pending<T> {
    fn new(rx: oneshot::Receiver<Result<Value, Error>>) -> Self {
        Self {
            rx,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> Future for Pending<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Ok(value))) => Poll::Ready(serde_json::from_value(value).map_err(Error::from)),
            Poll::Ready(Ok(Err(e))) => Poll::Ready(Err(e)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TransportError::Dropped.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_channel_sink_resolves_pending() {
        let (sink, pending) = ResultSink::channel::<Value>();
        sink.deliver(Ok(json!({"id": 1})));
        assert_eq!(pending.await.unwrap(), json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_pending_decodes_typed_value() {
        let (sink, pending) = ResultSink::channel::<Option<u64>>();
        sink.deliver(Ok(Value::Null));
        assert_eq!(pending.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dropped_sink_yields_dropped_error() {
        let (sink, pending) = ResultSink::channel::<Value>();
        drop(sink);
        let err = pending.await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Dropped)));
    }

    #[test]
    fn test_callback_sink_invokes_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = seen.clone();
        let sink = ResultSink::callback(Box::new(move |outcome| {
            seen_in_cb.lock().unwrap().push(outcome.map_err(|e| e.to_string()));
        }));

        sink.deliver(Err(TransportError::status(500, "boom").into()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], Err("boom".to_string()));
    }

    #[test]
    fn test_undelivered_callback_sink_reports_dropped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = seen.clone();
        let sink = ResultSink::callback(Box::new(move |outcome| {
            seen_in_cb.lock().unwrap().push(outcome);
        }));

        drop(sink);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(
            seen[0],
            Err(Error::Transport(TransportError::Dropped))
        ));
    }
}
