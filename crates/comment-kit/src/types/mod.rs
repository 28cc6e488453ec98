//! Core types for comment requests.

mod id;
mod kind;

pub use id::CommentId;
pub use kind::OperationKind;
