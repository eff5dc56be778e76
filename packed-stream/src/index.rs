//! Index mapping from traversal position to physical slot.
//!
//! With `multi_pixel_out > 1` the inner axis is carved into blocks and
//! reversal applies to each block on its own; elements never move across
//! block boundaries.

use crate::shape::AxisSplit;

/// Slot for traversal position `ii` of an `inner`-element axis.
#[inline]
pub fn slot_index(ii: usize, inner: usize, reverse_inner: bool) -> usize {
    if reverse_inner {
        inner - ii - 1
    } else {
        ii
    }
}

/// Slot for traversal position `ii` within sub-block `block`.
#[inline]
pub fn block_slot_index(block: usize, ii: usize, inner: usize, reverse_inner: bool) -> usize {
    block * inner + slot_index(ii, inner, reverse_inner)
}

/// Physical slots of one outer position in traversal order (block-major).
pub fn slot_order(split: &AxisSplit, reverse_inner: bool) -> impl Iterator<Item = usize> {
    let inner = split.inner;
    (0..split.multi_pixel_out).flat_map(move |block| {
        (0..inner).map(move |ii| block_slot_index(block, ii, inner, reverse_inner))
    })
}
