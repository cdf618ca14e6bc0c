//! Operators on float and integer masks.

use glam::Vec2;
use neroxis_map::SymmetryType;

use super::vector::normals_from_height;
use super::{BooleanMask, FloatMask, Mask, NormalMask};
use crate::brush::{resample, BrushSource};
use crate::error::MaskError;
use crate::grid::{BitGrid, FloatGrid, Grid, IntegerGrid, Scalar, ScalarGrid, SummedArea};
use crate::ops::distance::{local_maxima, local_minima};
use crate::ops::stamp::{stamp, Placement};

impl<T: Scalar> Mask<ScalarGrid<T>> {
    /// Cell-wise sum with `other`.
    pub fn add(&self, other: &Mask<ScalarGrid<T>>) -> Result<&Self, MaskError> {
        self.update_with("add", other, |data, source| {
            data.grid.zip_in_place(source, |a, b| a.cell_add(b));
            Ok(())
        })
    }

    pub fn subtract(&self, other: &Mask<ScalarGrid<T>>) -> Result<&Self, MaskError> {
        self.update_with("subtract", other, |data, source| {
            data.grid.zip_in_place(source, |a, b| a.cell_sub(b));
            Ok(())
        })
    }

    pub fn multiply(&self, other: &Mask<ScalarGrid<T>>) -> Result<&Self, MaskError> {
        self.update_with("multiply", other, |data, source| {
            data.grid.zip_in_place(source, |a, b| a.cell_mul(b));
            Ok(())
        })
    }

    pub fn add_scalar(&self, value: T) -> Result<&Self, MaskError> {
        self.update("add_scalar", move |data| {
            data.grid.map_in_place(|v| v.cell_add(value));
            Ok(())
        })
    }

    pub fn subtract_scalar(&self, value: T) -> Result<&Self, MaskError> {
        self.update("subtract_scalar", move |data| {
            data.grid.map_in_place(|v| v.cell_sub(value));
            Ok(())
        })
    }

    pub fn multiply_scalar(&self, value: T) -> Result<&Self, MaskError> {
        self.update("multiply_scalar", move |data| {
            data.grid.map_in_place(|v| v.cell_mul(value));
            Ok(())
        })
    }

    /// Add `value` wherever `area` is true.
    pub fn add_where(&self, area: &BooleanMask, value: T) -> Result<&Self, MaskError> {
        self.update_with("add_where", area, move |data, source: &BitGrid| {
            let size = data.size();
            for x in 0..size {
                for y in 0..size {
                    if source.get_bit(x, y) {
                        let current = data.grid.get(x, y);
                        data.grid.set(x, y, current.cell_add(value));
                    }
                }
            }
            Ok(())
        })
    }

    /// Raise every value below `min` to `min`.
    pub fn clamp_min(&self, min: T) -> Result<&Self, MaskError> {
        self.update("clamp_min", move |data| {
            data.grid.map_in_place(|v| if v < min { min } else { v });
            Ok(())
        })
    }

    /// Lower every value above `max` to `max`.
    pub fn clamp_max(&self, max: T) -> Result<&Self, MaskError> {
        self.update("clamp_max", move |data| {
            data.grid.map_in_place(|v| if v > max { max } else { v });
            Ok(())
        })
    }

    /// A boolean mask named `<name>toBoolean`, true where the value is at least `min`.
    pub fn copy_as_boolean_mask(&self, min: T) -> Result<BooleanMask, MaskError> {
        self.derive("toBoolean", "copy_as_boolean_mask", move |grid: &ScalarGrid<T>| {
            BitGrid::from_fn(grid.size(), |x, y| grid.get(x, y) >= min)
        })
    }

    /// A boolean mask named `<name>toBoolean`, true where the value lies in `[min, max]`.
    pub fn copy_as_boolean_mask_in_range(&self, min: T, max: T) -> Result<BooleanMask, MaskError> {
        self.derive("toBoolean", "copy_as_boolean_mask", move |grid: &ScalarGrid<T>| {
            grid.threshold(min, max)
        })
    }
}

impl Mask<FloatGrid> {
    /// Cell-wise quotient; division by zero follows IEEE rules.
    pub fn divide(&self, other: &FloatMask) -> Result<&Self, MaskError> {
        self.update_with("divide", other, |data, source| {
            data.grid.zip_in_place(source, |a, b| a / b);
            Ok(())
        })
    }

    pub fn divide_scalar(&self, value: f32) -> Result<&Self, MaskError> {
        if value == 0.0 {
            return Err(MaskError::invalid("cannot divide a mask by zero"));
        }
        self.update("divide_scalar", move |data| {
            data.grid.map_in_place(|v| v / value);
            Ok(())
        })
    }

    /// Replace each value with the average of its window of half-width `radius`.
    ///
    /// Averages are taken at spawn representatives and copied to their orbits,
    /// so rounding in the window sums cannot break symmetry.
    pub fn blur(&self, radius: usize) -> Result<&Self, MaskError> {
        self.update("blur", move |data| {
            let table = SummedArea::from_scalars(&data.grid);
            data.fill_with_symmetry(SymmetryType::Spawn, |_, _, x, y| {
                table.area_average(radius, x, y) as f32
            });
            Ok(())
        })
    }

    /// Fill each terrain orbit with a uniform value in `[min, max)`.
    pub fn randomize(&self, min: f32, max: f32) -> Result<&Self, MaskError> {
        if !(min <= max) {
            return Err(MaskError::invalid(format!(
                "randomize range is empty: {}..{}",
                min, max
            )));
        }
        self.update("randomize", move |data| {
            data.fill_with_symmetry(SymmetryType::Terrain, |_, rng, _, _| {
                rng.gen_f32() * (max - min) + min
            });
            Ok(())
        })
    }

    /// Replace each value with the slope magnitude from central differences.
    pub fn gradient(&self) -> Result<&Self, MaskError> {
        self.update("gradient", |data| {
            let source = data.grid.clone();
            let size = data.size();
            data.grid = FloatGrid::from_fn(size, |x, y| {
                let (x, y) = (x as i64, y as i64);
                let dx = (source.get_clamped(x + 1, y) - source.get_clamped(x - 1, y)) / 2.0;
                let dy = (source.get_clamped(x, y + 1) - source.get_clamped(x, y - 1)) / 2.0;
                (dx * dx + dy * dy).sqrt()
            });
            Ok(())
        })
    }

    /// Add a brush resampled to `size` and scaled by `intensity`, centred at
    /// `location`. A negative intensity carves the brush out instead.
    pub fn add_brush(
        &self,
        brushes: &dyn BrushSource,
        location: Vec2,
        name: &str,
        intensity: f32,
        size: usize,
        wrap: bool,
    ) -> Result<&Self, MaskError> {
        if !location.is_finite() {
            return Err(MaskError::invalid(format!("brush location must be finite, got {}", location)));
        }
        if size == 0 {
            return Err(MaskError::invalid("brush size must be at least 1"));
        }
        let mut brush = resample(&*brushes.load(name)?, size);
        brush.map_in_place(|v| v * intensity);
        self.update("add_brush", move |data| {
            let spawn = data.symmetry(SymmetryType::Spawn);
            let placement = Placement::centered(location.x as i64, location.y as i64).wrapping(wrap);
            stamp(&mut data.grid, spawn, &brush, placement, |grid: &mut FloatGrid, x, y, v| {
                let current = grid.get(x, y);
                grid.set(x, y, current + v);
            });
            Ok(())
        })
    }

    /// A boolean mask named `<name>maxima` marking local maxima valued in `[min, max]`.
    pub fn copy_as_local_maxima(&self, min: f32, max: f32) -> Result<BooleanMask, MaskError> {
        self.derive("maxima", "copy_as_local_maxima", move |grid: &FloatGrid| {
            local_maxima(grid, min, max)
        })
    }

    /// A boolean mask named `<name>minima` marking local minima valued in `[min, max]`.
    pub fn copy_as_local_minima(&self, min: f32, max: f32) -> Result<BooleanMask, MaskError> {
        self.derive("minima", "copy_as_local_minima", move |grid: &FloatGrid| {
            local_minima(grid, min, max)
        })
    }

    /// A normal mask named `<name>Normals` computed from these heights.
    pub fn copy_as_normal_mask(&self, scale: f32) -> Result<NormalMask, MaskError> {
        self.derive("Normals", "copy_as_normal_mask", move |grid: &FloatGrid| {
            normals_from_height(grid, scale)
        })
    }
}

impl Mask<IntegerGrid> {
    /// A float mask named `<name>toFloat` with the same values.
    pub fn copy_as_float_mask(&self) -> Result<FloatMask, MaskError> {
        self.derive("toFloat", "copy_as_float_mask", |grid: &IntegerGrid| {
            FloatGrid::from_fn(grid.size(), |x, y| grid.get(x, y) as f32)
        })
    }
}
