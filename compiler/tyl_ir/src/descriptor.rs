//! Composite type descriptors.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{Access, BaseSpec, FieldSpec};

bitflags! {
    /// Special-member categories that the type provides itself.
    ///
    /// A set flag means "user-provided". An absent or explicitly defaulted
    /// member leaves its flag clear. Any set flag makes the type non-trivial.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct SpecialMembers: u8 {
        /// Default construction.
        const CONSTRUCT = 1 << 0;
        /// Copy construction or copy assignment.
        const COPY = 1 << 1;
        /// Move construction or move assignment.
        const MOVE = 1 << 2;
        /// Destruction.
        const DESTROY = 1 << 3;
    }
}

/// A composite type: ordered bases, ordered fields, and layout directives.
///
/// Declaration order of bases and fields is the only placement order.
/// `forced_align` and `pack_clamp` are mutually exclusive; layout rejects a
/// descriptor that sets both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub bases: SmallVec<[BaseSpec; 2]>,
    /// The type declares dynamically dispatched methods.
    pub introduces_dispatch: bool,
    /// Type-level `alignas`.
    pub forced_align: Option<u64>,
    /// `#pragma pack(n)` in effect for this type.
    pub pack_clamp: Option<u64>,
    pub special_members: SpecialMembers,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            bases: SmallVec::new(),
            introduces_dispatch: false,
            forced_align: None,
            pack_clamp: None,
            special_members: SpecialMembers::empty(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    #[must_use]
    pub fn base(mut self, base: BaseSpec) -> Self {
        self.bases.push(base);
        self
    }

    #[must_use]
    pub fn polymorphic(mut self) -> Self {
        self.introduces_dispatch = true;
        self
    }

    #[must_use]
    pub fn align_as(mut self, align: u64) -> Self {
        self.forced_align = Some(align);
        self
    }

    #[must_use]
    pub fn packed(mut self, clamp: u64) -> Self {
        self.pack_clamp = Some(clamp);
        self
    }

    #[must_use]
    pub fn user_provided(mut self, members: SpecialMembers) -> Self {
        self.special_members |= members;
        self
    }

    /// Distinct access tags among data-bearing fields, in first-seen order.
    ///
    /// Zero-width bit-fields are markers, not members, and are skipped.
    pub fn access_groups(&self) -> SmallVec<[Access; 3]> {
        let mut groups = SmallVec::new();
        for field in self.fields.iter().filter(|f| !f.is_flush_marker()) {
            if !groups.contains(&field.access) {
                groups.push(field.access);
            }
        }
        groups
    }

    /// True if the type declares at least one data-bearing field.
    pub fn declares_data(&self) -> bool {
        self.fields.iter().any(|f| !f.is_flush_marker())
    }

    pub fn owned_bases(&self) -> impl Iterator<Item = &BaseSpec> {
        self.bases.iter().filter(|b| !b.is_shared())
    }

    pub fn shared_bases(&self) -> impl Iterator<Item = &BaseSpec> {
        self.bases.iter().filter(|b| b.is_shared())
    }
}
