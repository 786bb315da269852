//! Memory layout of composite types.
//!
//! Given a [`TypePool`] and a [`TargetModel`], computes for a type:
//!
//! - **Size and alignment**, including tail padding and forced alignment.
//! - **Field offsets**, with bit-fields packed into storage units
//!   ([`pack_bits`]).
//! - **Base subobjects**: owned bases embedded in declaration order, shared
//!   bases placed once after the non-virtual part of the most-derived type.
//! - **The dispatch slot**, introduced at offset 0 or reused from an owned
//!   base that already has one.
//!
//! Descriptors are validated before anything is placed; a malformed one is an
//! [`InvalidSpecError`], never a partial layout. Results depend only on the
//! pool, the index and the target.

mod align;
mod bitfield;
mod cache;
mod engine;
mod error;
mod placer;
mod result;
mod target;
mod validate;

pub use align::{align_up, padding_for};
pub use bitfield::{pack_bits, BitMember, PackedBit, PackedRegion};
pub use cache::LayoutCache;
pub use engine::LayoutEngine;
pub use error::InvalidSpecError;
pub use result::{BasePlacement, BitPlacement, FieldPlacement, TypeLayout};
pub use target::{TailPadding, TargetModel};

use tyl_ir::{TypeIdx, TypePool};

/// Lay out one type with a fresh engine.
pub fn layout(
    pool: &TypePool,
    idx: TypeIdx,
    target: &TargetModel,
) -> Result<TypeLayout, InvalidSpecError> {
    LayoutEngine::new(pool, *target).layout(idx)
}
