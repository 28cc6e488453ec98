//! Operation kinds for comment requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The concrete remote action a [`PreparedAction`](crate::PreparedAction) will perform.
///
/// [`FindByPrototype`](OperationKind::FindByPrototype) and
/// [`FindAllByPrototype`](OperationKind::FindAllByPrototype) are unresolved:
/// a modifier such as `.by()`, `.on()` or `.of()` must refine them into a
/// concrete find before the request can be dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Create a comment or a reply.
    #[serde(rename = "insert")]
    Insert,
    /// Replace the body of an existing comment.
    #[serde(rename = "update")]
    Update,
    /// Delete a comment.
    #[serde(rename = "delete")]
    Delete,
    /// Count comments.
    #[serde(rename = "count")]
    Count,
    /// Unresolved single-result find.
    #[serde(rename = "find_proto")]
    FindByPrototype,
    /// Unresolved multi-result find.
    #[serde(rename = "find_all_proto")]
    FindAllByPrototype,
    /// Find by comment id.
    #[serde(rename = "findById")]
    FindById,
    /// Find by author and/or association key.
    #[serde(rename = "findByUsernameAndAssoc")]
    FindByUsernameAndAssociation,
    /// Find top-level comments attached to an association key.
    #[serde(rename = "findRootByAssoc")]
    FindRootByAssociation,
}

impl OperationKind {
    /// All kinds, in declaration order.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Count,
        OperationKind::FindByPrototype,
        OperationKind::FindAllByPrototype,
        OperationKind::FindById,
        OperationKind::FindByUsernameAndAssociation,
        OperationKind::FindRootByAssociation,
    ];

    /// Returns the name sent as the `action` field on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Count => "count",
            OperationKind::FindByPrototype => "find_proto",
            OperationKind::FindAllByPrototype => "find_all_proto",
            OperationKind::FindById => "findById",
            OperationKind::FindByUsernameAndAssociation => "findByUsernameAndAssoc",
            OperationKind::FindRootByAssociation => "findRootByAssoc",
        }
    }

    /// Returns true for the unresolved find kinds.
    pub fn is_prototype(&self) -> bool {
        matches!(
            self,
            OperationKind::FindByPrototype | OperationKind::FindAllByPrototype
        )
    }

    /// Returns true for every find kind, resolved or not.
    pub fn is_find(&self) -> bool {
        matches!(
            self,
            OperationKind::FindByPrototype
                | OperationKind::FindAllByPrototype
                | OperationKind::FindById
                | OperationKind::FindByUsernameAndAssociation
                | OperationKind::FindRootByAssociation
        )
    }

    /// Returns true for kinds sent with a request body (POST).
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            OperationKind::Insert | OperationKind::Update | OperationKind::Delete
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_matches_wire_name() {
        assert_eq!(OperationKind::Insert.to_string(), "insert");
        assert_eq!(OperationKind::FindById.to_string(), "findById");
        assert_eq!(
            OperationKind::FindByUsernameAndAssociation.to_string(),
            "findByUsernameAndAssoc"
        );
        assert_eq!(
            OperationKind::FindRootByAssociation.to_string(),
            "findRootByAssoc"
        );
    }

    #[test]
    fn test_kind_serde_uses_wire_name() {
        for kind in OperationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: OperationKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_kind_predicates() {
        assert!(OperationKind::FindByPrototype.is_prototype());
        assert!(OperationKind::FindAllByPrototype.is_prototype());
        assert!(!OperationKind::FindById.is_prototype());

        assert!(OperationKind::FindRootByAssociation.is_find());
        assert!(!OperationKind::Count.is_find());

        assert!(OperationKind::Delete.is_write());
        assert!(!OperationKind::Count.is_write());
        assert!(!OperationKind::FindById.is_write());
    }
}
