//! Classification of composite types.
//!
//! Two independent verdicts are computed for every type in a
//! [`TypePool`](tyl_ir::TypePool):
//!
//! - **Trivial**: no dispatch pointer and no shared base anywhere in the
//!   hierarchy, no user-provided special member, no default member
//!   initializer, and every base and composite member is itself trivial.
//!
//! - **Standard layout**: no dispatch pointer and no shared base anywhere,
//!   one access group among the type's fields, at most one type in the
//!   hierarchy declares fields, no owned base repeated along two paths, the
//!   first field is not of a base type, and every base and composite member
//!   is itself standard layout.
//!
//! A type that is both is POD ([`Classification::is_pod`]).
//!
//! Classification never fails. Unknown, undefined, and cyclic types are
//! conservatively neither trivial nor standard layout.

mod classify;
mod violation;

pub use classify::{classify, explain, Classifier};
pub use violation::{Explanation, Violation};

use tyl_ir::TypeIdx;

/// Verdicts for one type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Classification {
    pub is_trivial: bool,
    pub is_standard_layout: bool,
}

impl Classification {
    /// Neither verdict holds.
    pub const NEITHER: Self = Self {
        is_trivial: false,
        is_standard_layout: false,
    };

    /// Both verdicts hold. Scalars and pointers classify this way.
    pub const POD: Self = Self {
        is_trivial: true,
        is_standard_layout: true,
    };

    /// Plain old data: trivial and standard layout.
    pub const fn is_pod(self) -> bool {
        self.is_trivial && self.is_standard_layout
    }
}

/// Classification queries over pool indices.
///
/// Implemented by [`Classifier`], which caches verdicts and detects cycles.
pub trait TypeClassification {
    fn classification(&self, idx: TypeIdx) -> Classification;

    fn is_trivial(&self, idx: TypeIdx) -> bool {
        self.classification(idx).is_trivial
    }

    fn is_standard_layout(&self, idx: TypeIdx) -> bool {
        self.classification(idx).is_standard_layout
    }

    fn is_pod(&self, idx: TypeIdx) -> bool {
        self.classification(idx).is_pod()
    }
}
