//! Operation-kind transitions applied by the fluent modifiers.
//!
//! Every modifier stores its value unconditionally; this table only decides
//! whether the operation kind changes and whether a warning is raised. It is
//! a pure function so the precedence rules can be checked without building
//! or dispatching a request.

use std::fmt;

use crate::types::OperationKind;

/// A fluent modifier on [`PreparedAction`](crate::PreparedAction).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `.by(username)`
    By,
    /// `.of(post_id)`
    Of,
    /// `.on(association)`
    On,
    /// `.to(parent_id)`
    To,
    /// `.only(limit)`
    Only,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::By => "by",
            Modifier::Of => "of",
            Modifier::On => "on",
            Modifier::To => "to",
            Modifier::Only => "only",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal conflict between modifiers. The chain continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Warning {
    /// `.by()` after `.of()`.
    UsernameIgnoredForId,
    /// `.by()` or `.of()` on a root lookup.
    UsernameIgnoredForRoot,
    /// `.of()` after `.by()`/`.on()`.
    UsernameAndAssociationIgnored,
    /// `.on()` after `.of()`.
    AssociationIgnoredForId,
    /// `.to()` on a find.
    ParentIdIgnored,
    /// `.only()` outside a find.
    LimitIgnored,
}

impl Warning {
    pub fn message(&self) -> &'static str {
        match self {
            Warning::UsernameIgnoredForId => "username will be ignored as .of(...) is called",
            // Also raised by `.of()`: the text names username, not postId.
            Warning::UsernameIgnoredForRoot => {
                "username will be ignored as we are finding root comments"
            }
            Warning::UsernameAndAssociationIgnored => {
                "username and assoc will be ignored as .of(...) is given"
            }
            Warning::AssociationIgnoredForId => "assoc will be ignored as .of(...) is called",
            Warning::ParentIdIgnored => {
                "parentId will be ignored since we are calling .find/.findAll/.findRoot"
            }
            Warning::LimitIgnored => {
                "limit will be ignored since we are not calling .find/.findAll/.findRoot"
            }
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of applying a modifier to a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The kind after the modifier.
    pub kind: OperationKind,
    /// Warning to surface, if any.
    pub warning: Option<Warning>,
    /// The modifier scoped an unresolved find by username or association.
    /// Recursive searches reject this.
    pub narrows_search: bool,
}

impl Transition {
    fn stay(kind: OperationKind) -> Self {
        Self {
            kind,
            warning: None,
            narrows_search: false,
        }
    }

    fn warn(kind: OperationKind, warning: Warning) -> Self {
        Self {
            kind,
            warning: Some(warning),
            narrows_search: false,
        }
    }

    fn resolve(kind: OperationKind) -> Self {
        Self::stay(kind)
    }

    fn narrow() -> Self {
        Self {
            kind: OperationKind::FindByUsernameAndAssociation,
            warning: None,
            narrows_search: true,
        }
    }
}

/// Look up the transition for `modifier` applied while the kind is `kind`.
pub fn transition(kind: OperationKind, modifier: Modifier) -> Transition {
    use Modifier::*;
    use OperationKind::*;

    match (kind, modifier) {
        // .by(username)
        (FindByPrototype | FindAllByPrototype, By) => Transition::narrow(),
        (FindById, By) => Transition::warn(kind, Warning::UsernameIgnoredForId),
        (FindRootByAssociation, By) => Transition::warn(kind, Warning::UsernameIgnoredForRoot),
        (_, By) => Transition::stay(kind),

        // .of(post_id)
        (FindByPrototype | FindAllByPrototype, Of) => Transition::resolve(FindById),
        (FindByUsernameAndAssociation, Of) => {
            Transition::warn(FindById, Warning::UsernameAndAssociationIgnored)
        }
        (FindRootByAssociation, Of) => Transition::warn(kind, Warning::UsernameIgnoredForRoot),
        (_, Of) => Transition::stay(kind),

        // .on(association)
        (FindByPrototype | FindAllByPrototype, On) => Transition::narrow(),
        (FindById, On) => Transition::warn(kind, Warning::AssociationIgnoredForId),
        (_, On) => Transition::stay(kind),

        // .to(parent_id)
        (_, To) if kind.is_find() => Transition::warn(kind, Warning::ParentIdIgnored),
        (_, To) => Transition::stay(kind),

        // .only(limit)
        (_, Only) if kind.is_find() => Transition::stay(kind),
        (_, Only) => Transition::warn(kind, Warning::LimitIgnored),
    }
}
