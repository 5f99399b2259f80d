/// Rounds `value` down to a multiple of `alignment`.
///
/// # Panics
/// Panics if `alignment` is zero.
#[inline]
#[must_use]
pub const fn align_down(value: u64, alignment: u64) -> u64 {
    value - (value % alignment)
}

/// Rounds `value` up to a multiple of `alignment`.
///
/// Returns `None` if the result does not fit into a `u64`.
///
/// # Panics
/// Panics if `alignment` is zero.
#[inline]
#[must_use]
pub const fn align_up(value: u64, alignment: u64) -> Option<u64> {
    match value.checked_add(alignment - 1) {
        Some(v) => Some(align_down(v, alignment)),
        None => None,
    }
}

/// `true` if `value` is a multiple of `alignment`.
///
/// # Panics
/// Panics if `alignment` is zero.
#[inline]
#[must_use]
pub const fn is_aligned(value: u64, alignment: u64) -> bool {
    value % alignment == 0
}
