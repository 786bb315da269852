//! Alignment arithmetic.

/// Round `value` up to the next multiple of `align`.
///
/// `align` must be a non-zero power of two; validation guarantees this for
/// every alignment that reaches placement.
#[inline]
pub fn align_up(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    (value + align - 1) & !(align - 1)
}

/// [`align_up`] that returns `None` instead of overflowing.
#[inline]
pub(crate) fn checked_align_up(value: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    value.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Bytes of padding needed to bring `value` to `align`.
#[inline]
pub fn padding_for(value: u64, align: u64) -> u64 {
    align_up(value, align) - value
}
