//! Numeric grids (float and integer).

use std::fmt;

use super::{Aggregate, BitGrid, Grid};
use crate::error::MaskError;

/// Numeric cell types stored by [`ScalarGrid`].
pub trait Scalar:
    Copy
    + PartialOrd
    + PartialEq
    + Default
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    const KIND: &'static str;

    /// Cell sum. Integers wrap on overflow.
    fn cell_add(self, rhs: Self) -> Self;

    /// Cell difference. Integers wrap on overflow.
    fn cell_sub(self, rhs: Self) -> Self;

    /// Cell product. Integers wrap on overflow.
    fn cell_mul(self, rhs: Self) -> Self;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;

    fn write_bytes(self, out: &mut Vec<u8>);
}

impl Scalar for f32 {
    const KIND: &'static str = "float";

    #[inline]
    fn cell_add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline]
    fn cell_sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline]
    fn cell_mul(self, rhs: Self) -> Self {
        self * rhs
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn write_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl Scalar for i32 {
    const KIND: &'static str = "integer";

    #[inline]
    fn cell_add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline]
    fn cell_sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }

    #[inline]
    fn cell_mul(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value.round() as i32
    }

    fn write_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// Dense numeric grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid<T: Scalar> {
    size: usize,
    data: Vec<T>,
}

pub type FloatGrid = ScalarGrid<f32>;
pub type IntegerGrid = ScalarGrid<i32>;

impl<T: Scalar> ScalarGrid<T> {
    /// Build a grid from x-major values.
    pub fn from_values(size: usize, data: Vec<T>) -> Result<Self, MaskError> {
        if data.len() != size * size {
            return Err(MaskError::SizeMismatch {
                expected: size * size,
                actual: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    /// Build a grid by evaluating `f` at every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                data.push(f(x, y));
            }
        }
        Self { size, data }
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Apply `f` to every cell value in place.
    pub fn map_in_place(&mut self, mut f: impl FnMut(T) -> T) {
        self.data.iter_mut().for_each(|v| *v = f(*v));
    }

    /// Combine with another grid of the same size cell by cell.
    pub fn zip_in_place(&mut self, other: &ScalarGrid<T>, mut f: impl FnMut(T, T) -> T) {
        for (v, o) in self.data.iter_mut().zip(&other.data) {
            *v = f(*v, *o);
        }
    }

    /// Signed read clamped to the grid edge.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> T {
        let last = self.size as i64 - 1;
        self.get(x.clamp(0, last) as usize, y.clamp(0, last) as usize)
    }

    /// Cells whose value lies in `[min, max]`.
    pub fn threshold(&self, min: T, max: T) -> BitGrid {
        BitGrid::from_fn(self.size, |x, y| {
            let value = self.get(x, y);
            value >= min && value <= max
        })
    }

    /// Smallest and largest value, ignoring NaN.
    pub fn range(&self) -> Option<(T, T)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| {
            (
                if v < lo { v } else { lo },
                if v > hi { v } else { hi },
            )
        }))
    }
}

impl<T: Scalar> Grid for ScalarGrid<T> {
    type Value = T;

    const KIND: &'static str = T::KIND;

    fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![T::default(); size * size],
        }
    }

    fn default_value() -> T {
        T::default()
    }

    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> T {
        self.data[x * self.size + y]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[x * self.size + y] = value;
    }

    fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    fn write_value_bytes(value: T, out: &mut Vec<u8>) {
        value.write_bytes(out);
    }
}

impl<T: Scalar> Aggregate for ScalarGrid<T> {
    fn sum(&self) -> Result<f64, MaskError> {
        Ok(self.data.iter().map(|v| v.to_f64()).sum())
    }

    fn min(&self) -> Result<T, MaskError> {
        self.range()
            .map(|(lo, _)| lo)
            .ok_or_else(|| MaskError::invalid("min of an empty grid"))
    }

    fn max(&self) -> Result<T, MaskError> {
        self.range()
            .map(|(_, hi)| hi)
            .ok_or_else(|| MaskError::invalid("max of an empty grid"))
    }

    fn average(&self) -> Result<f64, MaskError> {
        if self.data.is_empty() {
            return Ok(0.0);
        }
        Ok(self.sum()? / self.data.len() as f64)
    }
}
