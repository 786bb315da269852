//! Layout errors.

use thiserror::Error;
use tyl_ir::TypeIdx;

/// A descriptor the layout algorithm refuses to place.
///
/// Reported by validation before any offset is computed, except
/// [`SizeOverflow`](Self::SizeOverflow), which placement detects. The engine
/// is pure, so a given pool and index fail the same way on every call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidSpecError {
    #[error("type index {0} does not belong to the pool")]
    UnknownType(TypeIdx),

    #[error("type `{name}` ({idx}) is declared but never defined")]
    UndefinedType { idx: TypeIdx, name: String },

    #[error("type `{ty}` contains itself through its bases or members")]
    CyclicHierarchy { ty: String },

    #[error("`{ty}`: alignment {align} of {member} is not a power of two")]
    NonPowerOfTwoAlignment {
        ty: String,
        member: String,
        align: u64,
    },

    #[error("`{ty}`: alignment {align} of {member} exceeds the target maximum {max}")]
    AlignmentExceedsMaximum {
        ty: String,
        member: String,
        align: u64,
        max: u64,
    },

    #[error("`{ty}`: field `{field}` has zero size")]
    ZeroSizedField { ty: String, field: String },

    #[error("`{ty}`: field `{field}` is declared more than once")]
    DuplicateField { ty: String, field: String },

    #[error("`{ty}`: bit-field `{field}` is {width} bits wide but its storage unit holds {storage_bits}")]
    BitWidthTooWide {
        ty: String,
        field: String,
        width: u32,
        storage_bits: u64,
    },

    #[error("`{ty}`: bit-field `{field}` must have a scalar storage type")]
    NonScalarBitField { ty: String, field: String },

    #[error("`{ty}`: bit-field `{field}` cannot carry a forced alignment")]
    AlignedBitField { ty: String, field: String },

    #[error("`{ty}`: forced alignment and packing clamp cannot both be set")]
    ForcedAlignmentAndPackClamp { ty: String },

    #[error("`{ty}`: forced alignment {forced} is below the {required} its members require")]
    ForcedAlignmentTooSmall {
        ty: String,
        forced: u64,
        required: u64,
    },

    #[error("`{ty}`: size does not fit in 64 bits")]
    SizeOverflow { ty: String },
}
