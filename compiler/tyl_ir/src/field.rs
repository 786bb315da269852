//! Field descriptors: the atomic unit of a composite type.

use std::fmt;

use crate::TypeIdx;

/// Access qualifier of a field or base.
///
/// Layout ignores it; the standard-layout predicate requires all fields of a
/// type to share one access group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        })
    }
}

/// What a field stores.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A fixed-size scalar with its natural alignment.
    Scalar { size: u64, align: u64 },
    /// A data pointer; size and alignment come from the target model.
    Pointer,
    /// A nested member whose layout is another type in the same pool.
    Composite(TypeIdx),
}

impl FieldType {
    pub const CHAR: Self = Self::scalar(1, 1);
    pub const BOOL: Self = Self::scalar(1, 1);
    pub const SHORT: Self = Self::scalar(2, 2);
    pub const INT: Self = Self::scalar(4, 4);
    pub const LONG_LONG: Self = Self::scalar(8, 8);
    pub const FLOAT: Self = Self::scalar(4, 4);
    pub const DOUBLE: Self = Self::scalar(8, 8);

    pub const fn scalar(size: u64, align: u64) -> Self {
        Self::Scalar { size, align }
    }

    /// The nested type, if this is a composite member.
    pub const fn composite(self) -> Option<TypeIdx> {
        match self {
            Self::Composite(idx) => Some(idx),
            Self::Scalar { .. } | Self::Pointer => None,
        }
    }
}

/// A single declared field.
///
/// `bit_width` turns the field into a bit-field whose storage unit is the
/// scalar size of `ty`. A width of zero is a flush marker: it closes the
/// current storage unit without occupying storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Empty for anonymous members (usually unnamed bit-fields).
    pub name: String,
    pub ty: FieldType,
    pub bit_width: Option<u32>,
    /// Member-level `alignas`; can only raise the field's alignment.
    pub forced_align: Option<u64>,
    pub access: Access,
    /// The field has a default member initializer.
    pub default_init: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            bit_width: None,
            forced_align: None,
            access: Access::Public,
            default_init: false,
        }
    }

    /// Shorthand for a scalar field.
    pub fn scalar(name: impl Into<String>, size: u64, align: u64) -> Self {
        Self::new(name, FieldType::scalar(size, align))
    }

    /// Shorthand for a nested member of another pool type.
    pub fn composite(name: impl Into<String>, ty: TypeIdx) -> Self {
        Self::new(name, FieldType::Composite(ty))
    }

    #[must_use]
    pub fn bits(mut self, width: u32) -> Self {
        self.bit_width = Some(width);
        self
    }

    #[must_use]
    pub fn align_as(mut self, align: u64) -> Self {
        self.forced_align = Some(align);
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_default_init(mut self) -> Self {
        self.default_init = true;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_bit_field(&self) -> bool {
        self.bit_width.is_some()
    }

    /// Zero-width bit-fields are layout markers, not members.
    pub fn is_flush_marker(&self) -> bool {
        self.bit_width == Some(0)
    }
}
