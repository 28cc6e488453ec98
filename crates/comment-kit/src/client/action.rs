//! The fluent request builder.
//!
//! A [`PreparedAction`] is created by one of the [`Comments`](crate::Comments)
//! constructors, refined with modifiers, and consumed by a terminal
//! `fire*` call. Ownership enforces the lifecycle: modifiers take and return
//! `self`, and dispatch consumes it, so one chain produces at most one
//! exchange.
//!
//! # Example
//!
//! ```rust,no_run
//! # use comment_kit::*;
//! # async fn example(comments: Comments) -> Result<(), Error> {
//! // Reply to comment 12 as bob
//! comments
//!     .reply("Agreed")
//!     .by("bob")?
//!     .on("article-7")?
//!     .to(12)
//!     .fire()?
//!     .await?;
//!
//! // The ten latest comments by alice, with their replies
//! let latest = comments.find_all(false).by("alice")?.only(10).fire()?.await?;
//!
//! // Callback style
//! comments.count().fire_with(|outcome| match outcome {
//!     Ok(n) => println!("{n} comments"),
//!     Err(e) => eprintln!("count failed: {e}"),
//! })?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;

use crate::error::{Error, ValidationError};
use crate::types::{CommentId, OperationKind};
use crate::wire::{self, HttpMethod, HttpRequest};

use super::comments::Context;
use super::sink::{Pending, ResultSink};
use super::transition::{Modifier, Warning, transition};

/// A request being built against a comment resource.
pub struct PreparedAction {
    ctx: Arc<Context>,
    kind: OperationKind,
    post_id: Option<CommentId>,
    username: Option<String>,
    body: Option<String>,
    association: Option<String>,
    parent_id: Option<CommentId>,
    opaque: Option<String>,
    is_recursive: bool,
    limit: Option<u32>,
    return_single: bool,
    warnings: Vec<Warning>,
}

impl PreparedAction {
    pub(crate) fn new(ctx: Arc<Context>, kind: OperationKind) -> Self {
        Self {
            ctx,
            kind,
            post_id: None,
            username: None,
            body: None,
            association: None,
            parent_id: None,
            opaque: None,
            is_recursive: false,
            limit: None,
            return_single: false,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_payload(mut self, body: String, opaque: Option<String>) -> Self {
        self.body = Some(body);
        // An empty opaque value counts as unset.
        self.opaque = opaque.filter(|o| !o.is_empty());
        self
    }

    pub(crate) fn finding(mut self, recursive: bool, single: bool) -> Self {
        self.is_recursive = recursive;
        self.return_single = single;
        if single {
            self.limit = Some(1);
        }
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The current operation kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn post_id(&self) -> Option<&CommentId> {
        self.post_id.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn association(&self) -> Option<&str> {
        self.association.as_deref()
    }

    pub fn parent_id(&self) -> Option<&CommentId> {
        self.parent_id.as_ref()
    }

    pub fn opaque(&self) -> Option<&str> {
        self.opaque.as_deref()
    }

    /// Whether descendants are included. Always `false` outside finds.
    pub fn is_recursive(&self) -> bool {
        self.is_recursive
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Whether the result is unwrapped to a single value.
    pub fn returns_single(&self) -> bool {
        self.return_single
    }

    /// Warnings raised by modifiers so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    // ========================================================================
    // Modifiers
    // ========================================================================

    /// Set the author. Narrows an unresolved find to a username/association
    /// search.
    ///
    /// # Errors
    ///
    /// Fails if `username` is empty, or if this narrows a recursive find.
    pub fn by(mut self, username: impl Into<String>) -> Result<Self, Error> {
        let username = username.into();
        if username.is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        self.username = Some(username);
        self.apply(Modifier::By, ValidationError::RecursiveByUsername)?;
        Ok(self)
    }

    /// Target a comment id. Resolves an unresolved find to a lookup by id,
    /// overriding any username/association filter.
    pub fn of(mut self, post_id: impl Into<CommentId>) -> Self {
        self.post_id = Some(post_id.into());
        self.step(Modifier::Of);
        self
    }

    /// Set the association key: the external object the thread is attached
    /// to, such as an article id.
    ///
    /// # Errors
    ///
    /// Fails if this narrows a recursive find.
    pub fn on(mut self, association: impl Into<String>) -> Result<Self, Error> {
        self.association = Some(association.into());
        self.apply(Modifier::On, ValidationError::RecursiveByAssociation)?;
        Ok(self)
    }

    /// Set the parent comment, making a created comment a reply. Ignored by
    /// finds.
    pub fn to(mut self, parent_id: impl Into<CommentId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self.step(Modifier::To);
        self
    }

    /// Cap the number of results. Ignored outside finds, and overridden to
    /// `1` by single-result finds.
    ///
    /// A limit of `0` is not sent to the server: [`validate`](Self::validate)
    /// rejects it with [`ValidationError::ZeroLimit`] unless a single-result
    /// find overrides it.
    pub fn only(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self.step(Modifier::Only);
        self
    }

    fn apply(&mut self, modifier: Modifier, rejection: ValidationError) -> Result<(), Error> {
        let narrows = self.step(modifier);
        if narrows && self.is_recursive {
            return Err(rejection.into());
        }
        Ok(())
    }

    /// Apply the transition table; returns whether the search was narrowed.
    fn step(&mut self, modifier: Modifier) -> bool {
        let t = transition(self.kind, modifier);
        if let Some(warning) = t.warning {
            tracing::warn!(kind = %self.kind, %modifier, "{}", warning);
            self.warnings.push(warning);
        }
        self.kind = t.kind;
        t.narrows_search
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Check that the request can be dispatched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            OperationKind::FindByPrototype | OperationKind::FindAllByPrototype => {
                return Err(ValidationError::UnresolvedFind);
            }
            OperationKind::Insert => {
                require(&self.username, ValidationError::UsernameRequired)?;
                require(&self.body, ValidationError::BodyRequired)?;
            }
            OperationKind::Update => {
                require(&self.post_id, ValidationError::PostIdRequired)?;
                require(&self.body, ValidationError::BodyRequired)?;
            }
            OperationKind::Delete | OperationKind::Count => {}
            OperationKind::FindById => {
                require(&self.post_id, ValidationError::PostIdRequired)?;
            }
            OperationKind::FindByUsernameAndAssociation => {
                if self.username.is_none() && self.association.is_none() {
                    return Err(ValidationError::UsernameOrAssociationRequired);
                }
            }
            OperationKind::FindRootByAssociation => {
                require(&self.association, ValidationError::AssociationRequired)?;
            }
        }

        if self.effective_limit() == Some(0) {
            return Err(ValidationError::ZeroLimit);
        }

        Ok(())
    }

    fn effective_limit(&self) -> Option<u32> {
        if self.return_single { Some(1) } else { self.limit }
    }

    /// Defined fields in wire order. `return_single` is never included;
    /// `action` and `isRecursive` always are.
    fn wire_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("action", self.kind.as_str().to_string())];

        let optional = [
            ("postId", self.post_id.as_ref().map(|id| id.to_string())),
            ("username", self.username.clone()),
            ("body", self.body.clone()),
            ("assoc", self.association.clone()),
            ("parentId", self.parent_id.as_ref().map(|id| id.to_string())),
            ("opaque", self.opaque.clone()),
            ("isRecursive", Some(self.is_recursive.to_string())),
            ("limit", self.effective_limit().map(|l| l.to_string())),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );
        fields
    }

    /// Validate and serialize into the request `fire` would send.
    pub fn to_request(&self) -> Result<HttpRequest, Error> {
        self.validate()?;

        let method = if self.kind.is_write() {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        };
        Ok(wire::build_request(
            method,
            &self.ctx.path,
            &self.wire_fields(),
            &self.ctx.encoder,
        ))
    }

    /// Dispatch and return a future resolving to the normalized result.
    ///
    /// Single-result finds resolve to the first match or `null`; everything
    /// else resolves to the server's `response` value unchanged.
    ///
    /// # Errors
    ///
    /// Validation and configuration failures are returned immediately.
    /// Transport failures, including non-2xx responses, come out of the
    /// returned future.
    pub fn fire(self) -> Result<Pending<Value>, Error> {
        self.fire_as()
    }

    /// Like [`fire`](Self::fire), decoding the result into `T`.
    pub fn fire_as<T: DeserializeOwned>(self) -> Result<Pending<T>, Error> {
        let (sink, pending) = ResultSink::channel();
        self.dispatch(sink)?;
        Ok(pending)
    }

    /// Dispatch and invoke `callback` exactly once with the outcome.
    ///
    /// The callback runs on the runtime driving the exchange.
    ///
    /// # Errors
    ///
    /// Validation and configuration failures are returned immediately and
    /// the callback is not invoked.
    pub fn fire_with<F>(self, callback: F) -> Result<(), Error>
    where
        F: FnOnce(Result<Value, Error>) + Send + 'static,
    {
        self.dispatch(ResultSink::callback(Box::new(callback)))
    }

    fn dispatch(self, sink: ResultSink) -> Result<(), Error> {
        let request = self.to_request()?;
        let runtime = self.runtime()?;

        tracing::debug!(
            method = %request.method,
            target = %request.target,
            kind = %self.kind,
            "dispatching comment request"
        );

        let transport = self.ctx.transport.clone();
        let single = self.return_single;
        runtime.spawn(async move {
            let outcome = match transport.exchange(request).await {
                Ok(response) => {
                    if !response.is_success() {
                        tracing::debug!(status = response.status, "comment request failed");
                    }
                    wire::normalize_response(response, single)
                }
                Err(e) => Err(e.into()),
            };
            sink.deliver(outcome);
        });

        Ok(())
    }

    fn runtime(&self) -> Result<Handle, Error> {
        self.ctx
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or_else(|| {
                Error::Config(
                    "no tokio runtime available to drive the request; dispatch from within a runtime or configure one with .runtime()"
                        .into(),
                )
            })
    }
}

fn require<T>(field: &Option<T>, missing: ValidationError) -> Result<(), ValidationError> {
    match field {
        Some(_) => Ok(()),
        None => Err(missing),
    }
}

impl std::fmt::Debug for PreparedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedAction")
            .field("kind", &self.kind)
            .field("post_id", &self.post_id)
            .field("username", &self.username)
            .field("body", &self.body)
            .field("association", &self.association)
            .field("parent_id", &self.parent_id)
            .field("opaque", &self.opaque)
            .field("is_recursive", &self.is_recursive)
            .field("limit", &self.limit)
            .field("return_single", &self.return_single)
            .finish()
    }
}
