//! Operators on vector and normal masks.

use glam::Vec3;

use super::{op, FloatMask, Mask, MaskData, NormalMask};
use crate::error::MaskError;
use crate::grid::{FloatGrid, Grid, NormalGrid, VectorField, VectorGrid, VectorValue};

/// Surface normals of a height field, using central differences with clamped reads.
pub(crate) fn normals_from_height(heights: &FloatGrid, scale: f32) -> NormalGrid {
    let size = heights.size();
    let mut normals = NormalGrid::new(size);
    for x in 0..size {
        for y in 0..size {
            let (ix, iy) = (x as i64, y as i64);
            let dx = (heights.get_clamped(ix + 1, iy) - heights.get_clamped(ix - 1, iy)) / 2.0;
            let dy = (heights.get_clamped(ix, iy + 1) - heights.get_clamped(ix, iy - 1)) / 2.0;
            normals.set(x, y, Vec3::new(-dx * scale, 1.0, -dy * scale).normalize());
        }
    }
    normals
}

impl<V: VectorValue> Mask<VectorGrid<V>> {
    pub fn add(&self, other: &Mask<VectorGrid<V>>) -> Result<&Self, MaskError> {
        self.update_with("add", other, |data, source| {
            for (v, o) in data.grid.vectors_mut().iter_mut().zip(source.vectors()) {
                *v = *v + *o;
            }
            Ok(())
        })
    }

    pub fn subtract(&self, other: &Mask<VectorGrid<V>>) -> Result<&Self, MaskError> {
        self.update_with("subtract", other, |data, source| {
            for (v, o) in data.grid.vectors_mut().iter_mut().zip(source.vectors()) {
                *v = *v - *o;
            }
            Ok(())
        })
    }

    pub fn multiply_scalar(&self, value: f32) -> Result<&Self, MaskError> {
        self.update("multiply_scalar", move |data| {
            data.grid.vectors_mut().iter_mut().for_each(|v| *v = *v * value);
            Ok(())
        })
    }

    /// Scale every vector to unit length; zero vectors stay zero.
    pub fn normalize(&self) -> Result<&Self, MaskError> {
        self.update("normalize", |data| {
            data.grid
                .vectors_mut()
                .iter_mut()
                .for_each(|v| *v = v.normalize_or_zero());
            Ok(())
        })
    }

    /// Overwrite every component from one float mask per component.
    pub fn from_components(&self, components: &[&FloatMask]) -> Result<&Self, MaskError> {
        if components.len() != V::COMPONENTS {
            return Err(MaskError::invalid(format!(
                "{} masks need {} components, got {}",
                V::KIND,
                V::COMPONENTS,
                components.len()
            )));
        }
        for component in components {
            self.check_compatible(component)?;
        }
        self.schedule("from_components", |plan| {
            let sources: Vec<_> = components.iter().map(|mask| plan.read(mask)).collect();
            Ok(op(move |data: &mut MaskData<VectorGrid<V>>| {
                let size = data.size();
                for (index, source) in sources.iter().enumerate() {
                    let source = source.get()?;
                    for x in 0..size {
                        for y in 0..size {
                            let mut value = data.grid.get(x, y);
                            value.set_component(index, source.get(x, y));
                            data.grid.set(x, y, value);
                        }
                    }
                }
                Ok(())
            }))
        })
    }

    /// A float mask named `<name>component<index>` holding one component.
    pub fn copy_as_component_mask(&self, index: usize) -> Result<FloatMask, MaskError> {
        if index >= V::COMPONENTS {
            return Err(MaskError::invalid(format!(
                "component {} is out of range for {} masks",
                index,
                V::KIND
            )));
        }
        let suffix = format!("component{}", index);
        self.derive(&suffix, "copy_as_component_mask", move |grid: &VectorGrid<V>| {
            FloatGrid::from_fn(grid.size(), |x, y| grid.get(x, y).component(index))
        })
    }
}

impl Mask<NormalGrid> {
    /// Replace the contents with the normals of `heights`, steepened by `scale`.
    pub fn from_height(&self, heights: &FloatMask, scale: f32) -> Result<&Self, MaskError> {
        self.update_with("from_height", heights, move |data, source| {
            data.grid = normals_from_height(source, scale);
            Ok(())
        })
    }

    /// Cell-wise cross product with `other`.
    pub fn cross(&self, other: &NormalMask) -> Result<&Self, MaskError> {
        self.update_with("cross", other, |data, source: &NormalGrid| {
            for (v, o) in data.grid.vectors_mut().iter_mut().zip(source.vectors()) {
                *v = v.cross(*o);
            }
            Ok(())
        })
    }

    /// Cross every normal with `vector`, normalized first.
    pub fn cross_vector(&self, vector: Vec3) -> Result<&Self, MaskError> {
        let axis = vector.normalize_or_zero();
        if axis == Vec3::ZERO {
            return Err(MaskError::invalid("cannot cross normals with a zero vector"));
        }
        self.update("cross_vector", move |data| {
            data.grid.vectors_mut().iter_mut().for_each(|v| *v = v.cross(axis));
            Ok(())
        })
    }
}
