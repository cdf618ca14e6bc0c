//! Vector grids built on `glam` vectors.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3, Vec4};

use super::{Aggregate, Grid};

/// Vector cell types stored by [`VectorGrid`].
pub trait VectorValue:
    Copy
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
{
    const KIND: &'static str;
    const COMPONENTS: usize;

    const ZERO: Self;

    fn component(&self, index: usize) -> f32;

    fn set_component(&mut self, index: usize, value: f32);

    fn normalize_or_zero(self) -> Self;
}

macro_rules! impl_vector_value {
    ($ty:ty, $kind:literal, $components:literal) => {
        impl VectorValue for $ty {
            const KIND: &'static str = $kind;
            const COMPONENTS: usize = $components;
            const ZERO: Self = <$ty>::ZERO;

            #[inline]
            fn component(&self, index: usize) -> f32 {
                self[index]
            }

            #[inline]
            fn set_component(&mut self, index: usize, value: f32) {
                self[index] = value;
            }

            #[inline]
            fn normalize_or_zero(self) -> Self {
                <$ty>::normalize_or_zero(self)
            }
        }
    };
}

impl_vector_value!(Vec2, "vector2", 2);
impl_vector_value!(Vec3, "vector3", 3);
impl_vector_value!(Vec4, "vector4", 4);

/// Grid types whose cells are vectors; users bound `Self::Value: VectorValue`.
pub trait VectorField: Grid {
    fn vectors(&self) -> &[Self::Value];

    fn vectors_mut(&mut self) -> &mut [Self::Value];
}

/// Dense vector grid.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorGrid<V: VectorValue> {
    size: usize,
    data: Vec<V>,
}

impl<V: VectorValue> VectorGrid<V> {
    fn filled(size: usize, value: V) -> Self {
        Self {
            size,
            data: vec![value; size * size],
        }
    }
}

impl<V: VectorValue> Grid for VectorGrid<V> {
    type Value = V;

    const KIND: &'static str = V::KIND;

    fn new(size: usize) -> Self {
        Self::filled(size, V::ZERO)
    }

    fn default_value() -> V {
        V::ZERO
    }

    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> V {
        self.data[x * self.size + y]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: V) {
        self.data[x * self.size + y] = value;
    }

    fn fill(&mut self, value: V) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    fn write_value_bytes(value: V, out: &mut Vec<u8>) {
        for i in 0..V::COMPONENTS {
            out.extend_from_slice(&value.component(i).to_le_bytes());
        }
    }
}

impl<V: VectorValue> VectorField for VectorGrid<V> {
    fn vectors(&self) -> &[V] {
        &self.data
    }

    fn vectors_mut(&mut self) -> &mut [V] {
        &mut self.data
    }
}

impl<V: VectorValue> Aggregate for VectorGrid<V> {}

/// Surface normal grid; cells default to straight up `(0, 1, 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalGrid(VectorGrid<Vec3>);

impl Grid for NormalGrid {
    type Value = Vec3;

    const KIND: &'static str = "normal";
    const SYMMETRIC: bool = false;

    fn new(size: usize) -> Self {
        NormalGrid(VectorGrid::filled(size, Vec3::Y))
    }

    fn default_value() -> Vec3 {
        Vec3::Y
    }

    fn size(&self) -> usize {
        self.0.size
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> Vec3 {
        self.0.get(x, y)
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: Vec3) {
        self.0.set(x, y, value);
    }

    fn fill(&mut self, value: Vec3) {
        self.0.fill(value);
    }

    fn write_value_bytes(value: Vec3, out: &mut Vec<u8>) {
        VectorGrid::<Vec3>::write_value_bytes(value, out);
    }
}

impl VectorField for NormalGrid {
    fn vectors(&self) -> &[Vec3] {
        self.0.vectors()
    }

    fn vectors_mut(&mut self) -> &mut [Vec3] {
        self.0.vectors_mut()
    }
}

impl Aggregate for NormalGrid {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaskError;

    #[test]
    fn test_normal_grid_defaults_up() {
        let grid = NormalGrid::new(4);
        assert_eq!(grid.get(3, 2), Vec3::new(0.0, 1.0, 0.0));
        assert!(!NormalGrid::SYMMETRIC);
        assert!(VectorGrid::<Vec3>::SYMMETRIC);
    }

    #[test]
    fn test_component_access() {
        let mut v = Vec4::ZERO;
        v.set_component(2, 5.0);
        assert_eq!(v.component(2), 5.0);
        assert_eq!(<Vec4 as VectorValue>::COMPONENTS, 4);
    }

    #[test]
    fn test_hash_bytes_cover_components() {
        let mut out = Vec::new();
        VectorGrid::<Vec2>::write_value_bytes(Vec2::new(1.0, 2.0), &mut out);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_aggregates_unsupported() {
        let grid = VectorGrid::<Vec2>::new(2);
        assert!(matches!(
            grid.sum(),
            Err(MaskError::Unsupported { op: "sum", kind: "vector2" })
        ));
    }
}
