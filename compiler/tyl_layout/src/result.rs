//! Computed layouts.

use tyl_ir::{BaseKind, TypeIdx};

/// Position of a bit-field inside its storage unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BitPlacement {
    /// Bit index within the storage unit that starts at the field's offset.
    pub bit_offset: u64,
    pub bit_width: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldPlacement {
    pub name: String,
    /// Byte offset from the start of the object. For bit-fields, the offset
    /// of the storage unit holding the bits.
    pub offset: u64,
    /// Bytes occupied; the storage unit size for bit-fields, zero for a
    /// zero-width marker.
    pub size: u64,
    pub bits: Option<BitPlacement>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BasePlacement {
    pub ty: TypeIdx,
    pub offset: u64,
    /// Bytes the subobject's own part spans; zero for an empty base.
    pub size: u64,
    pub kind: BaseKind,
}

/// Size, alignment, and member offsets of one type.
///
/// Fields appear in declaration order. Bases list the direct owned bases in
/// declaration order followed by every shared base of the hierarchy, each
/// once.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeLayout {
    pub size: u64,
    pub align: u64,
    /// End of the last byte holding data; `size` minus tail padding.
    pub data_size: u64,
    /// Offset of the dispatch slot, if the type has one.
    pub dispatch_offset: Option<u64>,
    pub fields: Vec<FieldPlacement>,
    pub bases: Vec<BasePlacement>,
}

impl TypeLayout {
    pub fn field(&self, name: &str) -> Option<&FieldPlacement> {
        self.fields.iter().find(|f| !f.name.is_empty() && f.name == name)
    }

    pub fn field_offset(&self, name: &str) -> Option<u64> {
        self.field(name).map(|f| f.offset)
    }

    /// `(name, offset)` for every named field, in declaration order.
    pub fn field_offsets(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.fields
            .iter()
            .filter(|f| !f.name.is_empty())
            .map(|f| (f.name.as_str(), f.offset))
    }

    /// Offset of the first subobject of type `ty`.
    pub fn base_offset(&self, ty: TypeIdx) -> Option<u64> {
        self.bases.iter().find(|b| b.ty == ty).map(|b| b.offset)
    }

    pub fn tail_padding(&self) -> u64 {
        self.size - self.data_size
    }

    pub fn has_dispatch(&self) -> bool {
        self.dispatch_offset.is_some()
    }
}
