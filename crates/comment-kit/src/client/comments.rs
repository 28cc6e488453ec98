//! The `Comments` entry point.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::error::Error;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::OperationKind;
use crate::wire::{UriEncoder, default_encoder};

use super::action::PreparedAction;

/// Environment variable holding the server origin for [`Comments::from_env`].
pub const ENV_ORIGIN: &str = "COMMENTS_ORIGIN";

/// Environment variable holding the resource path for [`Comments::from_env`].
pub const ENV_PATH: &str = "COMMENTS_PATH";

/// The hosting environment a [`Comments`] client is bound to.
///
/// Holds the capabilities a request needs: a transport to perform the
/// exchange, an encoder for keys and values, and the tokio runtime that
/// drives the exchange. Transport and encoder are required at configuration
/// time; the runtime may instead be picked up from the caller's context at
/// dispatch time.
///
/// # Example
///
/// ```rust,no_run
/// use comment_kit::{Comments, Environment};
///
/// # fn example() -> Result<(), comment_kit::Error> {
/// let env = Environment::http("https://blog.example.com");
/// let comments = Comments::configure(env, "/api/comments/")?;
/// assert_eq!(comments.path(), "/api/comments");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Environment {
    transport: Option<Arc<dyn Transport>>,
    encoder: Option<UriEncoder>,
    runtime: Option<Handle>,
}

impl Environment {
    /// An environment with no capabilities.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A `reqwest` transport against `origin` and the default encoder.
    ///
    /// No runtime is stored: exchanges run on the caller's runtime at
    /// dispatch time unless [`with_runtime`](Self::with_runtime) is used.
    pub fn http(origin: impl Into<String>) -> Self {
        Self {
            transport: Some(Arc::new(ReqwestTransport::new(origin))),
            encoder: Some(default_encoder()),
            runtime: None,
        }
    }

    /// Set the transport.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the key/value encoder.
    pub fn with_encoder(mut self, encoder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Set the runtime that drives exchanges.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("transport", &self.transport.is_some())
            .field("encoder", &self.encoder.is_some())
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}

/// Shared state behind every builder created by a [`Comments`] client.
pub(crate) struct Context {
    pub(crate) path: String,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) encoder: UriEncoder,
    pub(crate) runtime: Option<Handle>,
}

/// Normalize a base path: empty becomes `/`, and one trailing `/` is
/// stripped from anything longer than `/`.
///
/// ```
/// use comment_kit::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("/"), "/");
/// assert_eq!(normalize_path("/comments/"), "/comments");
/// ```
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    match path.strip_suffix('/') {
        Some(stripped) if path.len() > 1 => stripped.to_string(),
        _ => path.to_string(),
    }
}

/// Client for a comment resource.
///
/// `Comments` is the single entry point: each constructor returns a fresh
/// [`PreparedAction`] that is refined with modifiers and then dispatched
/// with `.fire()` or `.fire_with(callback)`.
///
/// # Example
///
/// ```rust,no_run
/// use comment_kit::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Error> {
///     let comments = Comments::builder("/comments")
///         .origin("https://blog.example.com")
///         .build()?;
///
///     // Post a comment on an article
///     comments.comment("Great read!").by("alice")?.on("article-7")?.fire()?.await?;
///
///     // The first comment with id 42
///     let first = comments.find(false).of(42).fire()?.await?;
///     println!("{first}");
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Comments {
    ctx: Arc<Context>,
}

impl Comments {
    /// Bind to `environment` and the resource at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the environment lacks a transport or an
    /// encoder.
    pub fn configure(environment: Environment, path: impl AsRef<str>) -> Result<Self, Error> {
        let transport = environment
            .transport
            .ok_or_else(|| Error::Config("no HTTP transport in environment".into()))?;
        let encoder = environment
            .encoder
            .ok_or_else(|| Error::Config("no URI encoder in environment".into()))?;

        Ok(Self {
            ctx: Arc::new(Context {
                path: normalize_path(path.as_ref()),
                transport,
                encoder,
                runtime: environment.runtime,
            }),
        })
    }

    /// Create a builder for the resource at `path`.
    pub fn builder(path: impl Into<String>) -> CommentsBuilder {
        CommentsBuilder::new(path)
    }

    /// Create a configured client from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `COMMENTS_ORIGIN` (required): server origin, e.g. `https://blog.example.com`.
    /// - `COMMENTS_PATH` (optional): resource path. Defaults to `/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `COMMENTS_ORIGIN` is not set.
    pub fn from_env() -> Result<Self, Error> {
        let origin = std::env::var(ENV_ORIGIN)
            .map_err(|_| Error::Config(format!("{ENV_ORIGIN} is not set")))?;
        let path = std::env::var(ENV_PATH).unwrap_or_default();

        Comments::builder(path).origin(origin).build()
    }

    /// The normalized resource path.
    pub fn path(&self) -> &str {
        &self.ctx.path
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a comment. Chain `.by(author)` before firing; chain
    /// `.to(parent)` to post it as a reply.
    pub fn comment(&self, body: impl Into<String>) -> PreparedAction {
        self.write(OperationKind::Insert, body.into(), None)
    }

    /// Create a comment carrying an opaque value that the server round-trips.
    /// An empty value is treated as absent.
    pub fn comment_with(&self, body: impl Into<String>, opaque: impl Into<String>) -> PreparedAction {
        self.write(OperationKind::Insert, body.into(), Some(opaque.into()))
    }

    /// Alias of [`comment`](Self::comment).
    pub fn reply(&self, body: impl Into<String>) -> PreparedAction {
        self.comment(body)
    }

    /// Alias of [`comment_with`](Self::comment_with).
    pub fn reply_with(&self, body: impl Into<String>, opaque: impl Into<String>) -> PreparedAction {
        self.comment_with(body, opaque)
    }

    /// Replace the body of a comment. Chain `.of(id)` before firing.
    pub fn update(&self, body: impl Into<String>) -> PreparedAction {
        self.write(OperationKind::Update, body.into(), None)
    }

    /// Update with an opaque value.
    pub fn update_with(&self, body: impl Into<String>, opaque: impl Into<String>) -> PreparedAction {
        self.write(OperationKind::Update, body.into(), Some(opaque.into()))
    }

    /// Delete comments.
    pub fn remove(&self) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), OperationKind::Delete)
    }

    /// Alias of [`remove`](Self::remove).
    pub fn delete(&self) -> PreparedAction {
        self.remove()
    }

    /// Count comments.
    pub fn count(&self) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), OperationKind::Count)
    }

    fn write(&self, kind: OperationKind, body: String, opaque: Option<String>) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), kind).with_payload(body, opaque)
    }

    // ========================================================================
    // Finds
    // ========================================================================

    /// Find a single comment. Resolves to one value, or `null` if nothing
    /// matched. Refine with `.of()`, `.by()` or `.on()`.
    pub fn find(&self, recursive: bool) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), OperationKind::FindByPrototype).finding(recursive, true)
    }

    /// Find all matching comments.
    pub fn find_all(&self, recursive: bool) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), OperationKind::FindAllByPrototype)
            .finding(recursive, false)
    }

    /// Find the first top-level comment on an association. Chain `.on()`.
    pub fn find_root(&self, recursive: bool) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), OperationKind::FindRootByAssociation)
            .finding(recursive, true)
    }

    /// Find all top-level comments on an association. Chain `.on()`.
    pub fn find_root_all(&self, recursive: bool) -> PreparedAction {
        PreparedAction::new(self.ctx.clone(), OperationKind::FindRootByAssociation)
            .finding(recursive, false)
    }
}

impl std::fmt::Debug for Comments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comments")
            .field("path", &self.ctx.path)
            .finish()
    }
}

/// Builder for creating a [`Comments`] client.
///
/// # Example
///
/// ```rust,ignore
/// use comment_kit::*;
///
/// // Against a live server
/// let comments = Comments::builder("/comments")
///     .origin("https://blog.example.com")
///     .build()?;
///
/// // Against a custom transport
/// let comments = Comments::builder("/")
///     .transport(my_transport)
///     .encoder(|s: &str| s.to_string())
///     .build()?;
/// ```
pub struct CommentsBuilder {
    path: String,
    origin: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    encoder: Option<UriEncoder>,
    runtime: Option<Handle>,
}

impl CommentsBuilder {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            origin: None,
            transport: None,
            encoder: None,
            runtime: None,
        }
    }

    /// Send requests with `reqwest` against `origin`.
    ///
    /// Ignored when [`transport`](Self::transport) is also set.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Use a custom transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a custom key/value encoder instead of `encodeURIComponent` rules.
    pub fn encoder(mut self, encoder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Drive exchanges on `runtime` instead of the caller's runtime.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if neither an origin nor a transport was set.
    pub fn build(self) -> Result<Comments, Error> {
        let transport = match (self.transport, self.origin) {
            (Some(transport), _) => Some(transport),
            (None, Some(origin)) => Some(Arc::new(ReqwestTransport::new(origin)) as Arc<dyn Transport>),
            (None, None) => None,
        };

        let environment = Environment {
            transport,
            encoder: Some(self.encoder.unwrap_or_else(default_encoder)),
            runtime: self.runtime,
        };

        Comments::configure(environment, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/api/comments/"), "/api/comments");
        assert_eq!(normalize_path("/api/comments"), "/api/comments");
        assert_eq!(normalize_path("c/"), "c");
        // Only one trailing slash is stripped.
        assert_eq!(normalize_path("/c//"), "/c/");
    }

    #[test]
    fn test_configure_requires_transport() {
        let env = Environment::empty().with_encoder(|s: &str| s.to_string());
        let err = Comments::configure(env, "/").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("transport"));
    }

    #[test]
    fn test_configure_requires_encoder() {
        let env = Environment::empty().with_transport(MockTransport::new());
        let err = Comments::configure(env, "/").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("encoder"));
    }

    #[test]
    fn test_configure_normalizes_path_once() {
        let env = Environment::empty()
            .with_transport(MockTransport::new())
            .with_encoder(|s: &str| s.to_string());
        let comments = Comments::configure(env, "/comments/").unwrap();
        assert_eq!(comments.path(), "/comments");

        let env = Environment::empty()
            .with_transport(MockTransport::new())
            .with_encoder(|s: &str| s.to_string());
        assert_eq!(Comments::configure(env, "").unwrap().path(), "/");
    }

    #[test]
    fn test_builder_requires_origin_or_transport() {
        let err = Comments::builder("/").build().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_builder_with_origin() {
        let comments = Comments::builder("/comments/")
            .origin("https://blog.example.com")
            .build()
            .unwrap();
        assert_eq!(comments.path(), "/comments");
    }

    #[test]
    fn test_constructors_seed_kinds() {
        let comments = Comments::builder("/")
            .transport(MockTransport::new())
            .build()
            .unwrap();

        assert_eq!(comments.comment("hi").kind(), OperationKind::Insert);
        assert_eq!(comments.reply("hi").kind(), OperationKind::Insert);
        assert_eq!(comments.update("hi").kind(), OperationKind::Update);
        assert_eq!(comments.remove().kind(), OperationKind::Delete);
        assert_eq!(comments.delete().kind(), OperationKind::Delete);
        assert_eq!(comments.count().kind(), OperationKind::Count);
        assert_eq!(comments.find(false).kind(), OperationKind::FindByPrototype);
        assert_eq!(
            comments.find_all(false).kind(),
            OperationKind::FindAllByPrototype
        );
        assert_eq!(
            comments.find_root(false).kind(),
            OperationKind::FindRootByAssociation
        );
        assert_eq!(
            comments.find_root_all(true).kind(),
            OperationKind::FindRootByAssociation
        );
    }

    #[test]
    fn test_find_constructors_seed_single_and_limit() {
        let comments = Comments::builder("/")
            .transport(MockTransport::new())
            .build()
            .unwrap();

        let find = comments.find(true);
        assert!(find.returns_single());
        assert_eq!(find.limit(), Some(1));
        assert!(find.is_recursive());

        let all = comments.find_all(false);
        assert!(!all.returns_single());
        assert_eq!(all.limit(), None);
        assert!(!all.is_recursive());

        let root = comments.find_root(false);
        assert!(root.returns_single());
        assert_eq!(root.limit(), Some(1));

        let root_all = comments.find_root_all(false);
        assert!(!root_all.returns_single());
        assert_eq!(root_all.limit(), None);
    }

    #[test]
    fn test_write_constructors_seed_payload() {
        let comments = Comments::builder("/")
            .transport(MockTransport::new())
            .build()
            .unwrap();

        let create = comments.comment("hello");
        assert_eq!(create.body(), Some("hello"));
        assert_eq!(create.opaque(), None);
        assert!(!create.is_recursive());

        let update = comments.update_with("edited", "ctx-1");
        assert_eq!(update.body(), Some("edited"));
        assert_eq!(update.opaque(), Some("ctx-1"));

        let remove = comments.remove();
        assert_eq!(remove.body(), None);
        assert_eq!(remove.opaque(), None);

        assert_eq!(comments.reply_with("hi", "").opaque(), None);
    }

    #[test]
    fn test_built_client_does_not_keep_build_time_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let comments = runtime.block_on(async {
            Comments::builder("/")
                .transport(MockTransport::new())
                .build()
                .unwrap()
        });
        assert!(comments.ctx.runtime.is_none());

        let env = runtime.block_on(async { Environment::http("https://blog.example.com") });
        assert!(env.runtime.is_none());
    }

    #[test]
    fn test_from_env_scenarios() {
        fn clear_env() {
            // SAFETY: This is the only test in the crate touching these vars
            unsafe {
                std::env::remove_var(ENV_ORIGIN);
                std::env::remove_var(ENV_PATH);
            }
        }

        // Scenario 1: No origin - configuration error
        clear_env();
        {
            let err = Comments::from_env().unwrap_err();
            assert!(err.is_config());
            assert!(err.to_string().contains(ENV_ORIGIN));
        }

        // Scenario 2: Origin only - path defaults to "/"
        clear_env();
        unsafe {
            std::env::set_var(ENV_ORIGIN, "https://blog.example.com");
        }
        {
            let comments = Comments::from_env().unwrap();
            assert_eq!(comments.path(), "/");
        }

        // Scenario 3: Path with trailing slash is normalized
        clear_env();
        unsafe {
            std::env::set_var(ENV_ORIGIN, "https://blog.example.com/");
            std::env::set_var(ENV_PATH, "/api/comments/");
        }
        {
            let comments = Comments::from_env().unwrap();
            assert_eq!(comments.path(), "/api/comments");
        }

        clear_env();
    }
}
