//! Square grid storage backing every mask type.
//!
//! Grids are plain values: they know nothing about symmetry or the pipeline.
//! Cells are addressed `(x, y)` and laid out x-major (`x * size + y`), matching
//! the bit layout of [`BitGrid`].

mod bits;
mod scalar;
mod summed_area;
mod vector;

use std::fmt;

use crate::error::MaskError;

pub use bits::{word_count, BitGrid};
pub use scalar::{FloatGrid, IntegerGrid, Scalar, ScalarGrid};
pub use summed_area::SummedArea;
pub use vector::{NormalGrid, VectorField, VectorGrid, VectorValue};

/// Storage capability shared by every grid type.
pub trait Grid: Clone + fmt::Debug + Send + Sync + 'static {
    /// Cell value type.
    type Value: Copy + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Short element-kind name used in error messages.
    const KIND: &'static str;

    /// Whether masks of this grid carry symmetry; normals are derived quantities
    /// and always use no symmetry.
    const SYMMETRIC: bool = true;

    /// A grid of `size × size` cells holding [`Grid::default_value`].
    fn new(size: usize) -> Self;

    /// Value of a freshly created or cleared cell.
    fn default_value() -> Self::Value;

    fn size(&self) -> usize;

    /// Read a cell. Callers validate bounds.
    fn get(&self, x: usize, y: usize) -> Self::Value;

    /// Write a cell. Callers validate bounds.
    fn set(&mut self, x: usize, y: usize, value: Self::Value);

    /// Set every cell to `value`.
    fn fill(&mut self, value: Self::Value);

    /// Append the canonical byte encoding of `value` for hashing.
    fn write_value_bytes(value: Self::Value, out: &mut Vec<u8>);

    /// Whether signed coordinates fall inside the grid.
    #[inline]
    fn in_bounds(&self, x: i64, y: i64) -> bool {
        let size = self.size() as i64;
        x >= 0 && y >= 0 && x < size && y < size
    }
}

/// Whole-grid statistics; element types that have no meaningful answer keep the
/// default implementations, which report [`MaskError::Unsupported`].
pub trait Aggregate: Grid {
    /// Number of set cells.
    fn count(&self) -> Result<usize, MaskError> {
        Err(MaskError::unsupported("count", Self::KIND))
    }

    fn sum(&self) -> Result<f64, MaskError> {
        Err(MaskError::unsupported("sum", Self::KIND))
    }

    fn min(&self) -> Result<Self::Value, MaskError> {
        Err(MaskError::unsupported("min", Self::KIND))
    }

    fn max(&self) -> Result<Self::Value, MaskError> {
        Err(MaskError::unsupported("max", Self::KIND))
    }

    fn average(&self) -> Result<f64, MaskError> {
        Err(MaskError::unsupported("average", Self::KIND))
    }
}
