//! Operators on boolean masks.

use glam::Vec2;
use neroxis_map::SymmetryType;
use serde::{Deserialize, Serialize};

use super::{op, BooleanMask, FloatMask, IntegerMask, Mask, MaskData};
use crate::brush::{resample, BrushSource};
use crate::error::MaskError;
use crate::grid::{BitGrid, FloatGrid, Grid, IntegerGrid, Scalar, ScalarGrid};
use crate::ops::distance::{distance_field, fill_gaps, local_maxima, local_minima, widen_gaps};
use crate::ops::path::{path, path_bezier, PathOptions};
use crate::ops::regions::{
    remove_areas_bigger_than, remove_areas_in_size_range, remove_areas_outside_size_range,
    remove_areas_smaller_than, shape_coordinates,
};
use crate::ops::sampling::{
    all_coordinates_equal_to, random_coordinates, random_position, spaced_coordinates,
    spaced_coordinates_equal_to,
};
use crate::ops::stamp::{stamp, Placement};
use crate::ops::{morphology, walk, write_orbit};

fn check_probability(name: &str, value: f32) -> Result<(), MaskError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MaskError::invalid(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_point(name: &str, point: Vec2) -> Result<(), MaskError> {
    if !point.is_finite() {
        return Err(MaskError::invalid(format!("{} must be finite, got {}", name, point)));
    }
    Ok(())
}

/// A brush dragged from `start` towards `target`, stamped once per use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushWalk {
    pub start: Vec2,
    pub target: Vec2,
    pub brush: String,
    /// Edge length the brush is resampled to.
    pub size: usize,
    pub uses: usize,
    /// Brush values in `[min_value, max_value]` become true.
    pub min_value: f32,
    pub max_value: f32,
    /// Largest per-axis move between two stamps.
    pub max_step_size: usize,
    pub wrap: bool,
}

fn or_cell(grid: &mut BitGrid, x: usize, y: usize, value: bool) {
    if value {
        grid.set_bit(x, y, true);
    }
}

fn and_not_cell(grid: &mut BitGrid, x: usize, y: usize, value: bool) {
    if value {
        grid.set_bit(x, y, false);
    }
}

impl Mask<BitGrid> {
    /// Set each terrain orbit to true with probability `density`.
    pub fn randomize(&self, density: f32) -> Result<&Self, MaskError> {
        self.randomize_with(density, SymmetryType::Terrain)
    }

    /// Set each orbit under `symmetry_type` to true with probability `density`.
    pub fn randomize_with(&self, density: f32, symmetry_type: SymmetryType) -> Result<&Self, MaskError> {
        check_probability("density", density)?;
        self.update("randomize", move |data| {
            data.fill_with_symmetry(symmetry_type, |_, rng, _, _| rng.gen_f32() < density);
            Ok(())
        })
    }

    /// Flip each spawn orbit with probability `density`.
    pub fn flip_values(&self, density: f32) -> Result<&Self, MaskError> {
        check_probability("density", density)?;
        self.update("flip_values", move |data| {
            data.fill_with_symmetry(SymmetryType::Spawn, |grid, rng, x, y| {
                let value = grid.get_bit(x, y);
                if rng.gen_f32() < density {
                    !value
                } else {
                    value
                }
            });
            Ok(())
        })
    }

    pub fn invert(&self) -> Result<&Self, MaskError> {
        self.update("invert", |data| {
            data.grid.invert();
            Ok(())
        })
    }

    /// Union with `other`.
    pub fn add(&self, other: &BooleanMask) -> Result<&Self, MaskError> {
        self.update_with("add", other, |data, source| {
            data.grid.or_assign(source);
            Ok(())
        })
    }

    /// Clear every cell set in `other`.
    pub fn subtract(&self, other: &BooleanMask) -> Result<&Self, MaskError> {
        self.update_with("subtract", other, |data, source| {
            data.grid.and_not_assign(source);
            Ok(())
        })
    }

    /// Intersection with `other`.
    pub fn multiply(&self, other: &BooleanMask) -> Result<&Self, MaskError> {
        self.update_with("multiply", other, |data, source| {
            data.grid.and_assign(source);
            Ok(())
        })
    }

    pub fn xor(&self, other: &BooleanMask) -> Result<&Self, MaskError> {
        self.update_with("xor", other, |data, source| {
            data.grid.xor_assign(source);
            Ok(())
        })
    }

    fn stamp_mask(
        &self,
        label: &'static str,
        other: &BooleanMask,
        placement: Placement,
        action: fn(&mut BitGrid, usize, usize, bool),
    ) -> Result<&Self, MaskError> {
        self.check_same_pipeline(other)?;
        self.schedule(label, |plan| {
            let source = plan.read(other);
            Ok(op(move |data: &mut MaskData<BitGrid>| {
                let spawn = data.symmetry(SymmetryType::Spawn);
                stamp(&mut data.grid, spawn, source.get()?, placement, action);
                Ok(())
            }))
        })
    }

    /// Set the true cells of `other`, shifted by `placement`. Sizes may differ.
    pub fn add_with_offset(&self, other: &BooleanMask, placement: Placement) -> Result<&Self, MaskError> {
        self.stamp_mask("add_with_offset", other, placement, or_cell)
    }

    /// Clear the true cells of `other`, shifted by `placement`. Sizes may differ.
    pub fn subtract_with_offset(&self, other: &BooleanMask, placement: Placement) -> Result<&Self, MaskError> {
        self.stamp_mask("subtract_with_offset", other, placement, and_not_cell)
    }

    /// Set cells whose window of half-width `radius` is at least `density` true.
    pub fn blur(&self, radius: usize, density: f32) -> Result<&Self, MaskError> {
        check_probability("density", density)?;
        self.update("blur", move |data| {
            morphology::blur(&mut data.grid, radius, density);
            Ok(())
        })
    }

    /// Clear cells with more than one false 4-neighbour.
    pub fn cut_corners(&self) -> Result<&Self, MaskError> {
        self.update("cut_corners", |data| {
            morphology::cut_corners(&mut data.grid);
            Ok(())
        })
    }

    /// Keep only cells on a boundary between true and false.
    pub fn outline(&self) -> Result<&Self, MaskError> {
        self.update("outline", |data| {
            morphology::outline(&mut data.grid);
            Ok(())
        })
    }

    /// Punch holes of radius `size` at random spawn orbits chosen with probability `strength`.
    pub fn acid(&self, strength: f32, size: f32) -> Result<&Self, MaskError> {
        check_probability("strength", strength)?;
        let holes = self.child::<BitGrid>("holes")?;
        holes.randomize_with(strength, SymmetryType::Spawn)?.inflate(size)?;
        self.subtract(&holes)
    }

    /// Add blobs of radius `size` at random spawn orbits chosen with probability `strength`.
    pub fn splat(&self, strength: f32, size: f32) -> Result<&Self, MaskError> {
        check_probability("strength", strength)?;
        let splat = self.child::<BitGrid>("splat")?;
        splat.randomize_with(strength, SymmetryType::Spawn)?.inflate(size)?;
        self.add(&splat)
    }

    pub fn inflate(&self, radius: f32) -> Result<&Self, MaskError> {
        self.update("inflate", move |data| {
            morphology::inflate(&mut data.grid, radius);
            Ok(())
        })
    }

    pub fn deflate(&self, radius: f32) -> Result<&Self, MaskError> {
        self.update("deflate", move |data| {
            morphology::deflate(&mut data.grid, radius);
            Ok(())
        })
    }

    /// Clear true edge cells with probability `strength`, `count` times.
    pub fn erode(&self, strength: f32, count: usize) -> Result<&Self, MaskError> {
        check_probability("strength", strength)?;
        self.update("erode", move |data| {
            let symmetry = data.symmetry(SymmetryType::Spawn);
            morphology::erode(&mut data.grid, &mut data.rng, symmetry, strength, count);
            Ok(())
        })
    }

    /// Set false edge cells with probability `strength`, `count` times.
    pub fn dilute(&self, strength: f32, count: usize) -> Result<&Self, MaskError> {
        check_probability("strength", strength)?;
        self.update("dilute", move |data| {
            let symmetry = data.symmetry(SymmetryType::Spawn);
            morphology::dilute(&mut data.grid, &mut data.rng, symmetry, strength, count);
            Ok(())
        })
    }

    /// Write `value` to every cell within `radius` of `(x, y)`, mirrored by terrain symmetry.
    pub fn fill_circle(&self, x: f32, y: f32, radius: f32, value: bool) -> Result<&Self, MaskError> {
        check_point("circle centre", Vec2::new(x, y))?;
        self.update("fill_circle", move |data| {
            let size = data.size();
            let symmetry = data.symmetry(SymmetryType::Terrain);
            let radius2 = radius * radius;
            for cx in 0..size {
                for cy in 0..size {
                    let (dx, dy) = (cx as f32 - x, cy as f32 - y);
                    if dx * dx + dy * dy <= radius2 {
                        write_orbit(&mut data.grid, symmetry, cx, cy, value);
                    }
                }
            }
            Ok(())
        })
    }

    /// Write `value` to every cell within `width` cells of the grid border.
    pub fn fill_edge(&self, width: usize, value: bool) -> Result<&Self, MaskError> {
        self.update("fill_edge", move |data| {
            let size = data.size();
            for x in 0..size {
                for y in 0..size {
                    let border = x.min(y).min(size - 1 - x).min(size - 1 - y);
                    if border < width {
                        data.set_orbit(SymmetryType::Terrain, x, y, value);
                    }
                }
            }
            Ok(())
        })
    }

    /// Flip the 4-connected area containing `(x, y)` and its terrain images.
    pub fn fill_shape(&self, x: i64, y: i64) -> Result<&Self, MaskError> {
        let (x, y) = self.check_bounds(x, y)?;
        self.update("fill_shape", move |data| {
            let size = data.size();
            let value = !data.grid.get_bit(x, y);
            for (cx, cy) in shape_coordinates(&data.grid, x, y, size * size) {
                data.set_orbit(SymmetryType::Terrain, cx, cy, value);
            }
            Ok(())
        })
    }

    /// Clear every cell outside the team symmetry region.
    pub fn limit_to_symmetry_region(&self) -> Result<&Self, MaskError> {
        self.limit_to_region(SymmetryType::Team)
    }

    /// Clear every cell outside the region of `symmetry_type`.
    pub fn limit_to_region(&self, symmetry_type: SymmetryType) -> Result<&Self, MaskError> {
        self.update("limit_to_symmetry_region", move |data| {
            let size = data.size();
            let region = data.symmetry(symmetry_type).region(size);
            for x in 0..size {
                for y in 0..size {
                    if !region.contains(x, y) {
                        data.grid.set_bit(x, y, false);
                    }
                }
            }
            Ok(())
        })
    }

    /// Clear every cell further than `radius` from the grid centre.
    pub fn limit_to_centered_circle(&self, radius: f32) -> Result<&Self, MaskError> {
        self.update("limit_to_centered_circle", move |data| {
            let size = data.size();
            let center = (size - 1) as f32 / 2.0;
            let radius2 = radius * radius;
            for x in 0..size {
                for y in 0..size {
                    let (dx, dy) = (x as f32 - center, y as f32 - center);
                    if dx * dx + dy * dy > radius2 {
                        data.grid.set_bit(x, y, false);
                    }
                }
            }
            Ok(())
        })
    }

    /// `walkers` unbiased random walks of `steps` steps each, mirrored by terrain symmetry.
    pub fn random_walk(&self, walkers: usize, steps: usize) -> Result<&Self, MaskError> {
        self.update("random_walk", move |data| {
            let symmetry = data.symmetry(SymmetryType::Terrain);
            walk::random_walk(&mut data.grid, &mut data.rng, symmetry, walkers, steps);
            Ok(())
        })
    }

    /// Random walks that each never step in one randomly chosen direction.
    pub fn progressive_walk(&self, walkers: usize, steps: usize) -> Result<&Self, MaskError> {
        self.update("progressive_walk", move |data| {
            let symmetry = data.symmetry(SymmetryType::Terrain);
            walk::progressive_walk(&mut data.grid, &mut data.rng, symmetry, walkers, steps);
            Ok(())
        })
    }

    /// Carve a 4-connected corridor from `start` to `end`.
    pub fn path(&self, start: Vec2, end: Vec2, options: PathOptions) -> Result<&Self, MaskError> {
        check_point("path start", start)?;
        check_point("path end", end)?;
        if options.mid_point_min_distance > options.mid_point_max_distance {
            log::warn!(
                "Path on '{}' has a minimum midpoint distance above its maximum ({} > {})",
                self.name(),
                options.mid_point_min_distance,
                options.mid_point_max_distance
            );
        }
        self.update("path", move |data| {
            let settings = data.symmetry;
            path(&mut data.grid, &mut data.rng, &settings, start, end, &options);
            Ok(())
        })
    }

    /// Like [`Mask::path`], and also carve from `start` to the first image of
    /// `end` when the chosen symmetry has more than one point.
    pub fn connect(&self, start: Vec2, end: Vec2, options: PathOptions) -> Result<&Self, MaskError> {
        check_point("path start", start)?;
        check_point("path end", end)?;
        self.update("connect", move |data| {
            let settings = data.symmetry;
            let size = data.size();
            path(&mut data.grid, &mut data.rng, &settings, start, end, &options);
            let symmetry = settings.get(options.symmetry_type);
            if symmetry.num_sym_points() > 1 {
                if let Some(&(ix, iy)) = symmetry.images_unbounded(end.x, end.y, size).first() {
                    path(&mut data.grid, &mut data.rng, &settings, start, Vec2::new(ix, iy), &options);
                }
            }
            Ok(())
        })
    }

    /// Random Bézier curves of `order.0..order.1` control points through
    /// `mid_points` jittered waypoints.
    pub fn path_bezier(
        &self,
        start: Vec2,
        end: Vec2,
        order: (usize, usize),
        mid_points: usize,
    ) -> Result<&Self, MaskError> {
        check_point("path start", start)?;
        check_point("path end", end)?;
        if order.0 == 0 || order.1 < order.0 {
            return Err(MaskError::invalid(format!(
                "bezier order range must be non-empty and start at 1 or more, got {}..{}",
                order.0, order.1
            )));
        }
        self.update("path_bezier", move |data| {
            let settings = data.symmetry;
            path_bezier(&mut data.grid, &mut data.rng, &settings, start, end, order, mid_points);
            Ok(())
        })
    }

    /// Stamp a thresholded brush `walk.uses` times while stepping towards the target.
    ///
    /// With wrapping on, the target is moved across the nearer edge when that
    /// shortens the walk.
    pub fn guided_walk_with_brush(&self, brushes: &dyn BrushSource, walk: BrushWalk) -> Result<&Self, MaskError> {
        check_point("walk start", walk.start)?;
        check_point("walk target", walk.target)?;
        if walk.size == 0 {
            return Err(MaskError::invalid("brush size must be at least 1"));
        }
        let brush = resample(&*brushes.load(&walk.brush)?, walk.size).threshold(walk.min_value, walk.max_value);
        self.update("guided_walk_with_brush", move |data| {
            let spawn = data.symmetry(SymmetryType::Spawn);
            let size = data.size() as f32;
            let mut target = walk.target;
            if walk.wrap {
                let half = (data.size() / 2) as f32;
                let delta = target - walk.start;
                if delta.x.abs() > half {
                    target.x -= size * delta.x.signum();
                }
                if delta.y.abs() > half {
                    target.y -= size * delta.y.signum();
                }
            }
            let mut location = walk.start;
            for _ in 0..walk.uses {
                let placement = Placement::centered(location.x as i64, location.y as i64).wrapping(walk.wrap);
                stamp(&mut data.grid, spawn, &brush, placement, or_cell);
                let step = walk.max_step_size as i64;
                let sx = if target.x > location.x { 1 } else { -1 };
                let sy = if target.y > location.y { 1 } else { -1 };
                let dx = sx * data.rng.gen_range(0..=step);
                let dy = sy * data.rng.gen_range(0..=step);
                location += Vec2::new(dx as f32, dy as f32);
            }
            Ok(())
        })
    }

    /// Set the cells where the brush, resampled to `size` and centred at
    /// `location`, lies in `[min_value, max_value]`.
    pub fn add_brush(
        &self,
        brushes: &dyn BrushSource,
        location: Vec2,
        name: &str,
        min_value: f32,
        max_value: f32,
        size: usize,
    ) -> Result<&Self, MaskError> {
        check_point("brush location", location)?;
        if size == 0 {
            return Err(MaskError::invalid("brush size must be at least 1"));
        }
        let brush = resample(&*brushes.load(name)?, size).threshold(min_value, max_value);
        self.update("add_brush", move |data| {
            let spawn = data.symmetry(SymmetryType::Spawn);
            let placement = Placement::centered(location.x as i64, location.y as i64);
            stamp(&mut data.grid, spawn, &brush, placement, or_cell);
            Ok(())
        })
    }

    /// Flip every 4-connected area, of either value, with fewer than `max_area` cells.
    pub fn remove_areas_smaller_than(&self, max_area: usize) -> Result<&Self, MaskError> {
        self.update("remove_areas_smaller_than", move |data| {
            remove_areas_smaller_than(&mut data.grid, max_area);
            Ok(())
        })
    }

    /// Clear every true area with at least `min_area` cells.
    pub fn remove_areas_bigger_than(&self, min_area: usize) -> Result<&Self, MaskError> {
        self.update("remove_areas_bigger_than", move |data| {
            remove_areas_bigger_than(&mut data.grid, min_area);
            Ok(())
        })
    }

    pub fn remove_areas_outside_size_range(&self, min_area: usize, max_area: usize) -> Result<&Self, MaskError> {
        self.update("remove_areas_outside_size_range", move |data| {
            remove_areas_outside_size_range(&mut data.grid, min_area, max_area);
            Ok(())
        })
    }

    pub fn remove_areas_in_size_range(&self, min_area: usize, max_area: usize) -> Result<&Self, MaskError> {
        self.update("remove_areas_in_size_range", move |data| {
            remove_areas_in_size_range(&mut data.grid, min_area, max_area);
            Ok(())
        })
    }

    /// Close false gaps narrower than `min_dist`.
    pub fn fill_gaps(&self, min_dist: usize) -> Result<&Self, MaskError> {
        self.update("fill_gaps", move |data| {
            fill_gaps(&mut data.grid, min_dist);
            Ok(())
        })
    }

    /// Widen false gaps narrower than `min_dist`.
    pub fn widen_gaps(&self, min_dist: usize) -> Result<&Self, MaskError> {
        self.update("widen_gaps", move |data| {
            widen_gaps(&mut data.grid, min_dist);
            Ok(())
        })
    }

    /// Replace the contents with the local maxima of `other` valued in `[min, max]`.
    pub fn init_maxima<T: Scalar>(&self, other: &Mask<ScalarGrid<T>>, min: T, max: T) -> Result<&Self, MaskError> {
        self.update_with("init_maxima", other, move |data, source| {
            let maxima = local_maxima(source, min, max);
            data.fill_with_symmetry(SymmetryType::Spawn, |_, _, x, y| maxima.get_bit(x, y));
            Ok(())
        })
    }

    /// Replace the contents with the local minima of `other` valued in `[min, max]`.
    pub fn init_minima<T: Scalar>(&self, other: &Mask<ScalarGrid<T>>, min: T, max: T) -> Result<&Self, MaskError> {
        self.update_with("init_minima", other, move |data, source| {
            let minima = local_minima(source, min, max);
            data.fill_with_symmetry(SymmetryType::Spawn, |_, _, x, y| minima.get_bit(x, y));
            Ok(())
        })
    }

    /// Keep a random subset of true cells spaced `[min_spacing, max_spacing)` apart.
    ///
    /// Picks come from the team region and are mirrored by team symmetry.
    pub fn space(&self, min_spacing: f32, max_spacing: f32) -> Result<&Self, MaskError> {
        if min_spacing > max_spacing {
            return Err(MaskError::invalid(format!(
                "minimum spacing {} exceeds maximum spacing {}",
                min_spacing, max_spacing
            )));
        }
        self.update("space", move |data| {
            let size = data.size();
            let team = data.symmetry(SymmetryType::Team);
            let region = team.region(size);
            let candidates = all_coordinates_equal_to(&data.grid, true, 1)
                .into_iter()
                .filter(|c| region.contains(c.x as usize, c.y as usize))
                .collect();
            let picks = random_coordinates(candidates, &mut data.rng, Some(team), size, min_spacing, max_spacing);
            data.grid.fill(false);
            for pick in picks {
                data.set_orbit(SymmetryType::Team, pick.x as usize, pick.y as usize, true);
            }
            Ok(())
        })
    }

    /// Cells 4-connected to `(x, y)` holding its value.
    pub fn shape_coordinates(&self, x: i64, y: i64) -> Result<Vec<(usize, usize)>, MaskError> {
        let (x, y) = self.check_bounds(x, y)?;
        let data = self.final_data("shape_coordinates")?;
        let size = data.size();
        Ok(shape_coordinates(&data.grid, x, y, size * size))
    }

    /// Random true cells spaced `[min_spacing, max_spacing)` apart.
    ///
    /// With a symmetry type, picks come from its region and also keep their
    /// distance from the images of earlier picks. Consumes the mask's random stream.
    pub fn random_coordinates(
        &self,
        min_spacing: f32,
        max_spacing: f32,
        symmetry_type: Option<SymmetryType>,
    ) -> Result<Vec<Vec2>, MaskError> {
        let mut data = self.final_data("random_coordinates")?;
        let size = data.size();
        let symmetry = symmetry_type.map(|t| data.symmetry(t));
        let mut candidates = all_coordinates_equal_to(&data.grid, true, 1);
        if let Some(symmetry) = symmetry {
            let region = symmetry.region(size);
            candidates.retain(|c| region.contains(c.x as usize, c.y as usize));
        }
        Ok(random_coordinates(
            candidates,
            &mut data.rng,
            symmetry,
            size,
            min_spacing,
            max_spacing,
        ))
    }

    /// Every `spacing`-th cell, greedily spaced at least `radius` apart.
    pub fn spaced_coordinates(&self, radius: f32, spacing: usize) -> Result<Vec<Vec2>, MaskError> {
        let data = self.final_data("spaced_coordinates")?;
        Ok(spaced_coordinates(data.size(), radius, spacing))
    }

    /// Cells holding `value`, sampled every `spacing` and spaced at least `radius` apart.
    pub fn spaced_coordinates_equal_to(&self, value: bool, radius: f32, spacing: usize) -> Result<Vec<Vec2>, MaskError> {
        let data = self.final_data("spaced_coordinates_equal_to")?;
        Ok(spaced_coordinates_equal_to(&data.grid, value, radius, spacing))
    }

    pub fn all_coordinates_equal_to(&self, value: bool, spacing: usize) -> Result<Vec<Vec2>, MaskError> {
        let data = self.final_data("all_coordinates_equal_to")?;
        Ok(all_coordinates_equal_to(&data.grid, value, spacing))
    }

    /// A random true cell, if any. Consumes the mask's random stream.
    pub fn random_position(&self) -> Result<Option<Vec2>, MaskError> {
        let mut data = self.final_data("random_position")?;
        let MaskData { grid, rng, .. } = &mut *data;
        Ok(random_position(grid, rng))
    }

    /// A float mask named `<name>toFloat` holding `high` where true and `low` elsewhere.
    pub fn copy_as_float_mask(&self, low: f32, high: f32) -> Result<FloatMask, MaskError> {
        self.derive("toFloat", "copy_as_float_mask", move |grid: &BitGrid| {
            FloatGrid::from_fn(grid.size(), |x, y| if grid.get_bit(x, y) { high } else { low })
        })
    }

    /// An integer mask named `<name>toInteger` holding `high` where true and `low` elsewhere.
    pub fn copy_as_integer_mask(&self, low: i32, high: i32) -> Result<IntegerMask, MaskError> {
        self.derive("toInteger", "copy_as_integer_mask", move |grid: &BitGrid| {
            IntegerGrid::from_fn(grid.size(), |x, y| if grid.get_bit(x, y) { high } else { low })
        })
    }

    /// A float mask named `<name>DistanceField` holding the distance to the nearest true cell.
    pub fn copy_as_distance_field(&self) -> Result<FloatMask, MaskError> {
        self.derive("DistanceField", "copy_as_distance_field", distance_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushLibrary;
    use crate::mask::test_support::{assert_symmetric, inline_mask, settings};
    use crate::pipeline::{Pipeline, PipelineConfig};
    use neroxis_map::{Symmetry, SymmetrySettings};
    use pretty_assertions::assert_eq;

    fn pair(size: usize, symmetry: SymmetrySettings) -> (BooleanMask, BooleanMask) {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let build = |name: &str, seed| {
            BooleanMask::builder(&pipeline, name)
                .size(size)
                .seed(seed)
                .symmetry(symmetry)
                .parallel(false)
                .build()
                .unwrap()
        };
        (build("a", 1), build("b", 2))
    }

    #[test]
    fn test_randomize_count_is_binomial() {
        let mask: BooleanMask = inline_mask(129, SymmetrySettings::none());
        mask.randomize(0.5).unwrap();
        let n = (129 * 129) as f64;
        let count = mask.count().unwrap() as f64;
        let sigma = (n * 0.25).sqrt();
        assert!((count - n / 2.0).abs() < 5.0 * sigma, "count {}", count);
        assert_eq!(count, 8328.0);

        let again: BooleanMask = inline_mask(129, SymmetrySettings::none());
        again.randomize(0.5).unwrap();
        assert_eq!(again.to_hash().unwrap(), mask.to_hash().unwrap());
    }

    #[test]
    fn test_inflate_single_pixel() {
        let mask: BooleanMask = inline_mask(129, SymmetrySettings::none());
        mask.set(64, 64, true).unwrap().inflate(1.0).unwrap();
        assert_eq!(mask.count().unwrap(), 5);
        for (x, y) in [(64, 64), (63, 64), (65, 64), (64, 63), (64, 65)] {
            assert!(mask.get(x, y).unwrap());
        }
    }

    #[test]
    fn test_point4_set_counts() {
        let mask: BooleanMask = inline_mask(10, SymmetrySettings::uniform(Symmetry::Point(4)));
        mask.set(2, 3, true).unwrap();
        assert_eq!(mask.count().unwrap(), 4);

        // the centre of an odd grid is its own image
        let odd: BooleanMask = inline_mask(9, SymmetrySettings::uniform(Symmetry::Point(4)));
        odd.set(4, 4, true).unwrap();
        assert_eq!(odd.count().unwrap(), 1);
    }

    #[test]
    fn test_flip_draws_once_per_odd_point4_orbit() {
        let mask: BooleanMask = inline_mask(9, SymmetrySettings::uniform(Symmetry::Point(4)));
        mask.flip_values(1.0).unwrap();
        assert_eq!(mask.count().unwrap(), 81);
        assert!(mask.get(4, 0).unwrap());
        assert!(mask.get(0, 4).unwrap());

        let eroded: BooleanMask = inline_mask(9, SymmetrySettings::uniform(Symmetry::Point(4)));
        eroded.fill_circle(4.0, 4.0, 3.0, true).unwrap().erode(0.5, 3).unwrap();
        assert_symmetric(&eroded.final_mask().unwrap(), Symmetry::Point(4));
    }

    #[test]
    fn test_randomize_rejects_bad_density() {
        let mask: BooleanMask = inline_mask(8, SymmetrySettings::none());
        assert!(matches!(mask.randomize(1.5), Err(MaskError::InvalidParameter(_))));
        assert!(matches!(mask.erode(-0.1, 1), Err(MaskError::InvalidParameter(_))));
    }

    #[test]
    fn test_operators_keep_symmetry() {
        let symmetry = settings(Symmetry::Quad, Symmetry::Point(2), Symmetry::Point(2));
        let mask: BooleanMask = inline_mask(48, symmetry);
        mask.randomize(0.1)
            .unwrap()
            .inflate(2.0)
            .unwrap()
            .erode(0.5, 2)
            .unwrap()
            .dilute(0.5, 2)
            .unwrap()
            .flip_values(0.05)
            .unwrap()
            .random_walk(2, 30)
            .unwrap()
            .acid(0.01, 2.0)
            .unwrap()
            .splat(0.01, 2.0)
            .unwrap()
            .set_size(61)
            .unwrap();
        assert_symmetric(&mask.final_mask().unwrap(), Symmetry::Point(2));
    }

    #[test]
    fn test_terrain_operators_keep_terrain_symmetry() {
        let mask: BooleanMask = inline_mask(40, SymmetrySettings::uniform(Symmetry::Point(4)));
        mask.randomize(0.2)
            .unwrap()
            .progressive_walk(3, 20)
            .unwrap()
            .fill_circle(10.0, 12.0, 4.0, true)
            .unwrap()
            .fill_edge(2, false)
            .unwrap()
            .fill_gaps(4)
            .unwrap()
            .remove_areas_smaller_than(6)
            .unwrap();
        assert_symmetric(&mask.final_mask().unwrap(), Symmetry::Point(4));
    }

    #[test]
    fn test_binary_operators() {
        let (a, b) = pair(8, SymmetrySettings::none());
        a.fill_circle(2.0, 2.0, 1.0, true).unwrap();
        b.fill_circle(3.0, 2.0, 1.0, true).unwrap();
        let or = a.copy().unwrap();
        or.add(&b).unwrap();
        let and = a.copy().unwrap();
        and.multiply(&b).unwrap();
        let minus = a.copy().unwrap();
        minus.subtract(&b).unwrap();
        let xor = a.copy().unwrap();
        xor.xor(&b).unwrap();
        assert_eq!(or.count().unwrap(), 8);
        assert_eq!(and.count().unwrap(), 2);
        assert_eq!(minus.count().unwrap(), 3);
        assert_eq!(xor.count().unwrap(), 6);
    }

    #[test]
    fn test_binary_operator_checks_compatibility() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let a = BooleanMask::builder(&pipeline, "a").size(8).build().unwrap();
        let b = BooleanMask::builder(&pipeline, "b").size(9).build().unwrap();
        assert!(matches!(a.add(&b), Err(MaskError::SizeMismatch { .. })));

        let other: BooleanMask = inline_mask(8, SymmetrySettings::none());
        assert!(matches!(a.add(&other), Err(MaskError::InvalidParameter(_))));
    }

    #[test]
    fn test_add_with_offset_centres_smaller_mask() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let target = BooleanMask::builder(&pipeline, "target").size(16).parallel(false).build().unwrap();
        let dot = BooleanMask::builder(&pipeline, "dot").size(3).parallel(false).build().unwrap();
        dot.fill(true).unwrap();
        target.add_with_offset(&dot, Placement::centered(8, 8)).unwrap();
        assert_eq!(target.count().unwrap(), 9);
        assert!(target.get(7, 7).unwrap() && target.get(9, 9).unwrap());
        target.subtract_with_offset(&dot, Placement::at(8, 8)).unwrap();
        assert_eq!(target.count().unwrap(), 5);
    }

    #[test]
    fn test_limits() {
        let mask: BooleanMask = inline_mask(9, SymmetrySettings::uniform(Symmetry::X));
        mask.fill(true).unwrap().limit_to_symmetry_region().unwrap();
        assert_eq!(mask.count().unwrap(), 5 * 9);

        let circle: BooleanMask = inline_mask(9, SymmetrySettings::none());
        circle.fill(true).unwrap().limit_to_centered_circle(1.0).unwrap();
        assert_eq!(circle.count().unwrap(), 5);
    }

    #[test]
    fn test_fill_shape_flips_component() {
        let mask: BooleanMask = inline_mask(8, SymmetrySettings::none());
        mask.fill_circle(3.0, 3.0, 1.0, true).unwrap();
        mask.fill_shape(0, 0).unwrap();
        assert_eq!(mask.count().unwrap(), 64);
        mask.fill_shape(3, 3).unwrap();
        assert_eq!(mask.count().unwrap(), 0);
    }

    #[test]
    fn test_path_and_connect() {
        let mask: BooleanMask = inline_mask(64, SymmetrySettings::uniform(Symmetry::Point(2)));
        let options = PathOptions {
            max_step_size: 3.0,
            mid_points: 2,
            mid_point_max_distance: 16.0,
            mid_point_min_distance: 4.0,
            max_angle_error: 0.5,
            symmetry_type: SymmetryType::Terrain,
        };
        mask.connect(Vec2::new(4.0, 8.0), Vec2::new(40.0, 20.0), options).unwrap();
        let shape = mask.shape_coordinates(4, 8).unwrap();
        assert!(shape.contains(&(40, 20)));
        assert!(shape.contains(&(23, 43)));
        assert_symmetric(&mask.final_mask().unwrap(), Symmetry::Point(2));
    }

    #[test]
    fn test_path_bezier_rejects_empty_order() {
        let mask: BooleanMask = inline_mask(16, SymmetrySettings::none());
        assert!(mask.path_bezier(Vec2::ZERO, Vec2::splat(10.0), (3, 2), 1).is_err());
        assert!(mask
            .path_bezier(Vec2::new(f32::NAN, 0.0), Vec2::splat(10.0), (1, 2), 1)
            .is_err());
        mask.path_bezier(Vec2::ZERO, Vec2::splat(10.0), (2, 4), 1).unwrap();
        assert!(mask.get(0, 0).unwrap() && mask.get(10, 10).unwrap());
    }

    #[test]
    fn test_brush_operations() {
        let mut library = BrushLibrary::new();
        library
            .insert("round", FloatGrid::from_fn(5, |x, y| if x == 2 || y == 2 { 1.0 } else { 0.0 }))
            .unwrap();
        let mask: BooleanMask = inline_mask(32, SymmetrySettings::none());
        mask.add_brush(&library, Vec2::new(10.0, 10.0), "round", 0.5, 1.0, 5)
            .unwrap();
        assert_eq!(mask.count().unwrap(), 9);
        assert!(mask.get(10, 8).unwrap() && mask.get(12, 10).unwrap());

        let walk = BrushWalk {
            start: Vec2::new(4.0, 4.0),
            target: Vec2::new(28.0, 28.0),
            brush: "round".to_string(),
            size: 5,
            uses: 6,
            min_value: 0.5,
            max_value: 1.0,
            max_step_size: 3,
            wrap: false,
        };
        mask.guided_walk_with_brush(&library, walk.clone()).unwrap();
        assert!(mask.count().unwrap() > 9);

        let missing = BrushWalk {
            brush: "missing".to_string(),
            ..walk
        };
        assert!(matches!(
            mask.guided_walk_with_brush(&library, missing),
            Err(MaskError::Brush(_))
        ));
    }

    #[test]
    fn test_brush_walk_from_json() {
        let json = r#"{
            "start": [4.0, 4.0],
            "target": [28.0, 28.0],
            "brush": "round",
            "size": 5,
            "uses": 6,
            "min_value": 0.5,
            "max_value": 1.0,
            "max_step_size": 3,
            "wrap": true
        }"#;
        let walk: BrushWalk = serde_json::from_str(json).unwrap();
        assert_eq!(walk.target, Vec2::new(28.0, 28.0));
        assert!(walk.wrap);
    }

    #[test]
    fn test_area_filters() {
        let mask: BooleanMask = inline_mask(16, SymmetrySettings::none());
        mask.fill_circle(4.0, 4.0, 2.0, true)
            .unwrap()
            .set(12, 12, true)
            .unwrap();
        let small = mask.copy().unwrap();
        small.remove_areas_bigger_than(5).unwrap();
        assert_eq!(small.count().unwrap(), 1);
        mask.remove_areas_smaller_than(5).unwrap();
        assert_eq!(mask.count().unwrap(), 13);
        mask.remove_areas_in_size_range(10, 20).unwrap();
        assert_eq!(mask.count().unwrap(), 0);
    }

    #[test]
    fn test_space_and_coordinates() {
        let mask: BooleanMask = inline_mask(32, SymmetrySettings::uniform(Symmetry::Point(2)));
        mask.fill(true).unwrap().space(6.0, 6.0).unwrap();
        let grid = mask.final_mask().unwrap();
        assert_symmetric(&grid, Symmetry::Point(2));
        let points = mask.all_coordinates_equal_to(true, 1).unwrap();
        assert!(!points.is_empty());
        // picks come from the team region; their images may sit close to them
        let picks: Vec<Vec2> = points.into_iter().filter(|p| p.y < 16.0).collect();
        for (i, a) in picks.iter().enumerate() {
            for b in &picks[i + 1..] {
                assert!(a.distance(*b) >= 6.0);
            }
        }
        assert!(mask.random_position().unwrap().is_some());
        let picks = mask.random_coordinates(2.0, 2.0, Some(SymmetryType::Team)).unwrap();
        assert!(picks.iter().all(|p| p.y <= 15.5));
        assert_eq!(mask.spaced_coordinates(100.0, 1).unwrap(), vec![Vec2::ZERO]);
    }

    #[test]
    fn test_maxima_and_conversions() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let land = BooleanMask::builder(&pipeline, "land").size(9).parallel(false).build().unwrap();
        land.set(4, 4, true).unwrap();

        let distance = land.copy_as_distance_field().unwrap();
        assert_eq!(distance.name(), "landDistanceField");
        assert_eq!(distance.get(4, 7).unwrap(), 3.0);

        let peaks = BooleanMask::builder(&pipeline, "peaks").size(9).parallel(false).build().unwrap();
        peaks.init_minima(&distance, 0.0, 1.0).unwrap();
        assert_eq!(peaks.count().unwrap(), 1);
        peaks.init_maxima(&distance, 5.0, 6.0).unwrap();
        assert_eq!(peaks.count().unwrap(), 4);

        let heights = land.copy_as_float_mask(-1.0, 2.0).unwrap();
        assert_eq!(heights.sum().unwrap(), 80.0 * -1.0 + 2.0);
        let ids = land.copy_as_integer_mask(0, 7).unwrap();
        assert_eq!(ids.name(), "landtoInteger");
        assert_eq!(ids.max().unwrap(), 7);
    }
}
