//! Fixed-size cell sets

use std::ops::BitOr;

use super::{Pos, TOTAL_CELLS};

const WORDS: usize = TOTAL_CELLS.div_ceil(64);

/// Set of cells, one bit each, packed into 4 x u64 (256 >= 225).
///
/// Bits past cell 224 are never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    bits: [u64; WORDS],
}

#[inline]
fn split(pos: Pos) -> (usize, u64) {
    let idx = pos.to_index();
    (idx / 64, 1u64 << (idx % 64))
}

impl Bitboard {
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    #[inline]
    pub fn set(&mut self, pos: Pos) {
        let (word, mask) = split(pos);
        self.bits[word] |= mask;
    }

    /// Set `pos`, returning `false` if it was already present.
    #[inline]
    pub fn insert(&mut self, pos: Pos) -> bool {
        let (word, mask) = split(pos);
        let fresh = self.bits[word] & mask == 0;
        self.bits[word] |= mask;
        fresh
    }

    #[inline]
    pub fn clear(&mut self, pos: Pos) {
        let (word, mask) = split(pos);
        self.bits[word] &= !mask;
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> bool {
        let (word, mask) = split(pos);
        self.bits[word] & mask != 0
    }

    /// Number of cells in the set
    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Cells in row-major order
    pub fn iter_ones(&self) -> impl Iterator<Item = Pos> + '_ {
        self.bits.iter().enumerate().flat_map(|(w, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(Pos::from_index(w * 64 + bit))
            })
        })
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;

    fn bitor(mut self, rhs: Bitboard) -> Bitboard {
        for (a, b) in self.bits.iter_mut().zip(rhs.bits) {
            *a |= b;
        }
        self
    }
}
