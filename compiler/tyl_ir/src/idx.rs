//! Arena handle for type descriptors.

use std::fmt;

/// A 32-bit index into a [`TypePool`](crate::TypePool).
///
/// Identity of a type is identity of its index: two base references name the
/// same shared base iff their `TypeIdx` values are equal. Descriptors are never
/// compared structurally.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeIdx(u32);

impl TypeIdx {
    /// Create an index from a raw value.
    ///
    /// The index is only meaningful for the pool that produced it.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position in the pool's entry vector.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdx({})", self.0)
    }
}

impl fmt::Display for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
