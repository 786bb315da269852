//! Bit-field packing.
//!
//! A run of consecutive bit-fields that share a storage unit size becomes one
//! region of whole storage units. Members are assigned bit positions in
//! declaration order; a member that would straddle a unit boundary starts the
//! next unit instead. A zero-width member closes the current unit.

/// One member of a run, as seen by the packer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitMember<'a> {
    pub name: &'a str,
    pub width: u32,
}

/// Bit position assigned to a member, counted from the start of the region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PackedBit<'a> {
    pub name: &'a str,
    pub bit_offset: u64,
    pub width: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedRegion<'a> {
    /// Bytes occupied: a whole number of storage units.
    pub size: u64,
    /// Equals the storage unit size.
    pub align: u64,
    /// One entry per input member, in input order.
    pub bits: Vec<PackedBit<'a>>,
}

impl PackedRegion<'_> {
    pub fn bit_offset(&self, name: &str) -> Option<u64> {
        self.bits
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.bit_offset)
    }
}

/// Pack `members` into units of `storage_unit` bytes.
///
/// Every width must fit in one unit; validation rejects wider members before
/// they reach the packer.
///
/// # Panics
///
/// Panics if `storage_unit` is zero.
pub fn pack_bits<'a>(members: &[BitMember<'a>], storage_unit: u64) -> PackedRegion<'a> {
    assert!(storage_unit > 0, "bit-field storage unit must be at least one byte");
    let unit_bits = storage_unit * 8;
    let mut pos = 0u64;
    let mut bits = Vec::with_capacity(members.len());

    for member in members {
        let width = u64::from(member.width);
        if width == 0 || pos % unit_bits + width > unit_bits {
            pos = pos.div_ceil(unit_bits) * unit_bits;
        }
        bits.push(PackedBit {
            name: member.name,
            bit_offset: pos,
            width: member.width,
        });
        pos += width;
    }

    PackedRegion {
        size: pos.div_ceil(unit_bits) * storage_unit,
        align: storage_unit,
        bits,
    }
}
