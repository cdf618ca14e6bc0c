//! Bit-packed boolean grid.

use super::{Aggregate, Grid};
use crate::error::MaskError;

const BITS_PER_WORD: usize = 64;

/// Number of `u64` words needed for a `size × size` bit grid.
#[inline]
pub fn word_count(size: usize) -> usize {
    (size * size).div_ceil(BITS_PER_WORD)
}

#[inline]
fn bit_index(x: usize, y: usize, size: usize) -> usize {
    x * size + y
}

#[inline]
fn word_index(bit: usize) -> usize {
    bit / BITS_PER_WORD
}

#[inline]
fn bit_mask(bit: usize) -> u64 {
    1u64 << (bit % BITS_PER_WORD)
}

/// Boolean grid stored as 64-bit words, bit `x * size + y`.
///
/// Bits past `size²` in the last word are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    size: usize,
    words: Vec<u64>,
}

impl BitGrid {
    /// Build a grid by evaluating `f` at every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut grid = BitGrid::new(size);
        for x in 0..size {
            for y in 0..size {
                if f(x, y) {
                    grid.set_bit(x, y, true);
                }
            }
        }
        grid
    }

    /// Backing words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn get_bit(&self, x: usize, y: usize) -> bool {
        let bit = bit_index(x, y, self.size);
        self.words[word_index(bit)] & bit_mask(bit) != 0
    }

    #[inline]
    pub fn set_bit(&mut self, x: usize, y: usize, value: bool) {
        let bit = bit_index(x, y, self.size);
        let word = &mut self.words[word_index(bit)];
        if value {
            *word |= bit_mask(bit);
        } else {
            *word &= !bit_mask(bit);
        }
    }

    /// Signed read; out-of-bounds cells read as `false`.
    #[inline]
    pub fn get_or_false(&self, x: i64, y: i64) -> bool {
        self.in_bounds(x, y) && self.get_bit(x as usize, y as usize)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether a cell differs from at least one of its 4-neighbours.
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        let value = self.get_bit(x, y);
        let last = self.size - 1;
        (x > 0 && self.get_bit(x - 1, y) != value)
            || (y > 0 && self.get_bit(x, y - 1) != value)
            || (x < last && self.get_bit(x + 1, y) != value)
            || (y < last && self.get_bit(x, y + 1) != value)
    }

    /// Word-at-a-time OR.
    pub fn or_assign(&mut self, other: &BitGrid) {
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word |= *other;
        }
    }

    /// Word-at-a-time AND.
    pub fn and_assign(&mut self, other: &BitGrid) {
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word &= *other;
        }
    }

    /// Word-at-a-time AND NOT.
    pub fn and_not_assign(&mut self, other: &BitGrid) {
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word &= !*other;
        }
    }

    /// Word-at-a-time XOR.
    pub fn xor_assign(&mut self, other: &BitGrid) {
        for (word, other) in self.words.iter_mut().zip(&other.words) {
            *word ^= *other;
        }
    }

    /// Flip every cell.
    pub fn invert(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_tail();
    }

    fn clear_tail(&mut self) {
        let used = (self.size * self.size) % BITS_PER_WORD;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

impl Grid for BitGrid {
    type Value = bool;

    const KIND: &'static str = "boolean";

    fn new(size: usize) -> Self {
        Self {
            size,
            words: vec![0; word_count(size)],
        }
    }

    fn default_value() -> bool {
        false
    }

    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> bool {
        self.get_bit(x, y)
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: bool) {
        self.set_bit(x, y, value);
    }

    fn fill(&mut self, value: bool) {
        let word = if value { !0 } else { 0 };
        self.words.iter_mut().for_each(|w| *w = word);
        self.clear_tail();
    }

    fn write_value_bytes(value: bool, out: &mut Vec<u8>) {
        out.push(value as u8);
    }
}

impl Aggregate for BitGrid {
    fn count(&self) -> Result<usize, MaskError> {
        Ok(self.count_ones())
    }

    fn average(&self) -> Result<f64, MaskError> {
        let cells = self.size * self.size;
        if cells == 0 {
            return Ok(0.0);
        }
        Ok(self.count_ones() as f64 / cells as f64)
    }
}
