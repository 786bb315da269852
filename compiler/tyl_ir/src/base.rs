//! Base type references.

use std::fmt;

use crate::{Access, TypeIdx};

/// How a base is shared across inheritance paths.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseKind {
    /// Replicated once per inheritance path.
    Owned,
    /// Placed exactly once in the most-derived object, however many paths
    /// reach it (a virtual base).
    Shared,
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BaseKind::Owned => "owned",
            BaseKind::Shared => "shared",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BaseSpec {
    pub ty: TypeIdx,
    pub access: Access,
    pub kind: BaseKind,
}

impl BaseSpec {
    pub fn owned(ty: TypeIdx) -> Self {
        Self {
            ty,
            access: Access::Public,
            kind: BaseKind::Owned,
        }
    }

    pub fn shared(ty: TypeIdx) -> Self {
        Self {
            ty,
            access: Access::Public,
            kind: BaseKind::Shared,
        }
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn is_shared(&self) -> bool {
        self.kind == BaseKind::Shared
    }
}
