//! A fluent client for a remote comment resource.
//!
//! **comment-kit** describes one operation against a comment endpoint
//! (create, update, delete, count, or a find) through chained calls, then
//! sends it as a single HTTP exchange and normalizes the JSON response.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use comment_kit::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), comment_kit::Error> {
//!     // Configure once
//!     let comments = Comments::builder("/api/comments")
//!         .origin("https://blog.example.com")
//!         .build()?;
//!
//!     // Post a comment
//!     comments.comment("First!").by("alice")?.on("article-7")?.fire()?.await?;
//!
//!     // Read the thread back
//!     let thread = comments.find_all(false).on("article-7")?.fire()?.await?;
//!     println!("{thread}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # How a chain resolves
//!
//! `find()` and `find_all()` start unresolved. The first filter decides the
//! lookup:
//!
//! - `.of(id)` → find by id (wins over username and association)
//! - `.by(user)` / `.on(assoc)` → find by username and/or association
//!
//! Conflicting modifiers never fail; they log a `tracing` warning and are
//! recorded in [`PreparedAction::warnings`]. Missing inputs fail at
//! `.fire()` with a [`ValidationError`] before anything is sent.
//!
//! # Wire format
//!
//! Writes are `POST <path>` with a form-url-encoded body; reads are
//! `GET <path>?key=value&...`. The server answers `{"response": ...}`.

pub mod client;
pub mod error;
pub mod mock;
pub mod transport;
pub mod types;
pub mod wire;

// Re-export commonly used types at crate root
pub use error::{Error, TransportError, ValidationError};
pub use types::*;

// Re-export client types
pub use client::{
    Callback, Comments, CommentsBuilder, ENV_ORIGIN, ENV_PATH, Environment, Modifier, Pending,
    PreparedAction, Transition, Warning, normalize_path,
};

// Re-export transport types
pub use transport::{ExchangeFuture, ReqwestTransport, Transport};
pub use wire::{HttpMethod, HttpRequest, HttpResponse, UriEncoder};
