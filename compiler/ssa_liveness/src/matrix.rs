//! Dense bit matrix backing the per-block reachability relations.
//!
//! All rows live in one flat `BitVec` rather than one allocation per block,
//! so the whole matrix of a typical function fits in a few cache lines and
//! row unions are bit-parallel word operations.

use bitvec::prelude::*;

/// A `rows x width` matrix of bits backed by a single allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BitMatrix {
    width: usize,
    bits: BitVec,
}

impl BitMatrix {
    /// All-zero matrix with `rows` rows of `width` bits each.
    pub(crate) fn new(rows: usize, width: usize) -> Self {
        Self {
            width,
            bits: bitvec![0; rows * width],
        }
    }

    /// Set bit `col` in row `row`.
    pub(crate) fn set(&mut self, row: usize, col: usize) {
        debug_assert!(col < self.width, "column {col} out of range");
        self.bits.set(row * self.width + col, true);
    }

    /// Returns `true` iff bit `col` is set in row `row`.
    pub(crate) fn contains(&self, row: usize, col: usize) -> bool {
        debug_assert!(col < self.width, "column {col} out of range");
        self.bits[row * self.width + col]
    }

    /// The row as a bit slice; iterate its set bits with `iter_ones()`.
    pub(crate) fn row(&self, row: usize) -> &BitSlice {
        &self.bits[row * self.width..(row + 1) * self.width]
    }

    /// Bitwise-or row `src` into row `dst`. The rows must be distinct.
    pub(crate) fn union_rows(&mut self, src: usize, dst: usize) {
        assert_ne!(src, dst, "cannot union a matrix row into itself");
        let w = self.width;
        let (lo_idx, hi_idx) = if src < dst { (src, dst) } else { (dst, src) };
        let (lo, hi) = self.bits.split_at_mut(hi_idx * w);
        let lo_row = &mut lo[lo_idx * w..(lo_idx + 1) * w];
        let hi_row = &mut hi[..w];
        if src < dst {
            *hi_row |= &*lo_row;
        } else {
            *lo_row |= &*hi_row;
        }
    }
}
