//! Comment identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a comment, used by `.of()` and `.to()`.
///
/// Servers hand out either numeric or string ids, so both convert in and the
/// id travels on the wire as its textual form.
///
/// ```
/// use comment_kit::CommentId;
///
/// assert_eq!(CommentId::from(42u64).as_str(), "42");
/// assert_eq!(CommentId::from("c-9").as_str(), "c-9");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Returns the textual form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&String> for CommentId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CommentId {
                fn from(n: $t) -> Self {
                    Self(n.to_string())
                }
            }
        )*
    };
}

impl_from_int!(u32, u64, i32, i64, usize);
