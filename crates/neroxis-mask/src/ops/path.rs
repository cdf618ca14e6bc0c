//! Corridor carving between two points.
//!
//! Paths wander through jittered midpoints with an angle-smoothed stepper.
//! Consecutive visited cells are joined with 4-connected segments, so the
//! result always links start and end.

use std::f32::consts::PI;

use glam::Vec2;
use neroxis_map::{Symmetry, SymmetrySettings, SymmetryType};
use serde::{Deserialize, Serialize};

use super::{clamp_to_grid, write_orbit};
use crate::grid::{BitGrid, Grid};
use crate::rng::MaskRng;

/// Shape parameters of [`path`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// Longest single stride of the stepper.
    pub max_step_size: f32,
    /// Number of random waypoints between start and end.
    pub mid_points: usize,
    pub mid_point_max_distance: f32,
    pub mid_point_min_distance: f32,
    /// Largest random deviation of the heading, in radians.
    pub max_angle_error: f32,
    /// Symmetry whose images must all fall inside the grid for a cell to be painted.
    /// Painted cells are always mirrored with the terrain symmetry.
    pub symmetry_type: SymmetryType,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_step_size: 1.0,
            mid_points: 0,
            mid_point_max_distance: 0.0,
            mid_point_min_distance: 0.0,
            max_angle_error: 0.0,
            symmetry_type: SymmetryType::Terrain,
        }
    }
}

/// Heading from `from` towards `to`.
fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

fn polar(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * magnitude
}

fn to_cell(point: Vec2, size: usize) -> (usize, usize) {
    clamp_to_grid(point.x.round() as i64, point.y.round() as i64, size)
}

/// Visit every cell of a 4-connected line from `from` to `to`, both included.
///
/// Each step moves along the axis that keeps the walk closest to the ideal line.
pub fn line_4(from: (i64, i64), to: (i64, i64), mut visit: impl FnMut(i64, i64)) {
    let (dx, dy) = ((to.0 - from.0).abs(), (to.1 - from.1).abs());
    let (sx, sy) = ((to.0 - from.0).signum(), (to.1 - from.1).signum());
    let (mut x, mut y) = from;
    let (mut i, mut j) = (0, 0);
    visit(x, y);
    while i < dx || j < dy {
        let step_x = i < dx && (j >= dy || ((i + 1) * dy - j * dx).abs() <= (i * dy - (j + 1) * dx).abs());
        if step_x {
            i += 1;
            x += sx;
        } else {
            j += 1;
            y += sy;
        }
        visit(x, y);
    }
}

/// Whether every image of `(x, y)` under `symmetry` rounds to a cell inside the grid.
fn images_in_bounds(symmetry: Symmetry, x: usize, y: usize, size: usize) -> bool {
    let last = (size - 1) as f32;
    symmetry
        .images_unbounded(x as f32, y as f32, size)
        .iter()
        .all(|&(ix, iy)| (0.0..=last).contains(&ix.round()) && (0.0..=last).contains(&iy.round()))
}

/// Paints cells and joins each one to the previous with a 4-connected segment.
struct Trail<'a> {
    grid: &'a mut BitGrid,
    terrain: Symmetry,
    bounds: Symmetry,
    last: Option<(usize, usize)>,
}

impl<'a> Trail<'a> {
    /// Paint terrain orbits of cells whose `bounds` images stay on the grid.
    fn new(grid: &'a mut BitGrid, terrain: Symmetry, bounds: Symmetry) -> Self {
        Self {
            grid,
            terrain,
            bounds,
            last: None,
        }
    }

    fn mark(&mut self, cell: (usize, usize)) {
        let from = self.last.unwrap_or(cell);
        let (grid, terrain, bounds) = (&mut *self.grid, self.terrain, self.bounds);
        let size = grid.size();
        line_4(
            (from.0 as i64, from.1 as i64),
            (cell.0 as i64, cell.1 as i64),
            |x, y| {
                let (x, y) = (x as usize, y as usize);
                if images_in_bounds(bounds, x, y, size) {
                    write_orbit(grid, terrain, x, y, true);
                }
            },
        );
        self.last = Some(cell);
    }
}

/// Waypoints from `start` to `end` with `mid_points` jittered stops, rounded into the grid.
fn checkpoints(
    rng: &mut MaskRng,
    terrain: Symmetry,
    size: usize,
    start: Vec2,
    end: Vec2,
    options: &PathOptions,
) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(options.mid_points + 2);
    points.push(start);
    for _ in 0..options.mid_points {
        let previous = points[points.len() - 1];
        let mut angle = (rng.gen_f32() - 0.5) * PI + angle_to(previous, end);
        if terrain == Symmetry::Point(4) && angle % (PI / 2.0) < PI / 8.0 {
            let sign = if rng.gen_bool() { -1.0 } else { 1.0 };
            angle += sign * (rng.gen_f32() * 0.5 + 0.5) * PI / 2.0;
        }
        let magnitude = rng.gen_f32() * (options.mid_point_max_distance - options.mid_point_min_distance)
            + options.mid_point_min_distance;
        points.push(previous + polar(angle, magnitude));
    }
    points.push(end);

    let last = (size - 1) as f32;
    points
        .into_iter()
        .map(|p| p.round().clamp(Vec2::ZERO, Vec2::splat(last)))
        .collect()
}

/// Carve a path from `start` to `end`; returns the number of stepper steps taken.
///
/// The stepper runs at most `size²` steps in total. When the budget runs out
/// the trail is joined straight to `end`.
pub fn path(
    grid: &mut BitGrid,
    rng: &mut MaskRng,
    settings: &SymmetrySettings,
    start: Vec2,
    end: Vec2,
    options: &PathOptions,
) -> usize {
    let size = grid.size();
    let budget = size * size;
    let points = checkpoints(rng, settings.terrain(), size, start, end, options);
    let max_step = options.max_step_size.max(1.0);
    let error = options.max_angle_error;

    let mut trail = Trail::new(grid, settings.terrain(), settings.get(options.symmetry_type));
    let mut steps = 0;
    for pair in points.windows(2) {
        let (mut location, target) = (pair[0], pair[1]);
        trail.mark(to_cell(location, size));
        let mut old_angle = angle_to(location, target) + (rng.gen_f32() - 0.5) * 2.0 * error;
        while location.distance(target) > max_step && steps < budget {
            let magnitude = (rng.gen_f32() * max_step).max(1.0);
            let angle =
                old_angle * 0.5 + angle_to(location, target) * 0.5 + (rng.gen_f32() - 0.5) * 2.0 * error;
            location = (location + polar(angle, magnitude)).round();
            trail.mark(to_cell(location, size));
            old_angle = angle;
            steps += 1;
        }
        trail.mark(to_cell(target, size));
        if steps >= budget {
            log::warn!("Path stepper hit its budget of {} steps", budget);
            if let Some(&end) = points.last() {
                trail.mark(to_cell(end, size));
            }
            break;
        }
    }
    steps
}

/// Point on the Bézier curve over `controls` at `t`, by de Casteljau.
fn bezier_point(controls: &[Vec2], t: f32) -> Vec2 {
    let mut points = controls.to_vec();
    while points.len() > 1 {
        for i in 0..points.len() - 1 {
            points[i] = points[i].lerp(points[i + 1], t);
        }
        points.pop();
    }
    points.first().copied().unwrap_or(Vec2::ZERO)
}

/// Random Bézier curves through jittered midpoints from `start` to `end`.
///
/// Each segment gets `min_order..max_order` control points whose interior
/// points are pushed off the chord by up to half its length.
pub fn path_bezier(
    grid: &mut BitGrid,
    rng: &mut MaskRng,
    settings: &SymmetrySettings,
    start: Vec2,
    end: Vec2,
    order: (usize, usize),
    mid_points: usize,
) {
    let size = grid.size();
    let distance = start.distance(end);
    let options = PathOptions {
        mid_points,
        mid_point_max_distance: distance / mid_points.max(1) as f32,
        mid_point_min_distance: 0.0,
        ..PathOptions::default()
    };
    let points = checkpoints(rng, Symmetry::None, size, start, end, &options);
    let mut trail = Trail::new(grid, settings.terrain(), Symmetry::None);
    let (min_order, max_order) = order;

    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let order = if max_order > min_order {
            rng.gen_range(min_order..max_order)
        } else {
            min_order
        }
        .max(1);
        let chord = to - from;
        let normal = chord.perp().normalize_or_zero();
        let mut controls = Vec::with_capacity(order + 1);
        controls.push(from);
        for k in 1..order {
            let along = from + chord * (k as f32 / order as f32);
            controls.push(along + normal * rng.gen_signed_f32() * chord.length() * 0.5);
        }
        controls.push(to);

        let samples = size.max(1);
        for s in 0..=samples {
            let point = bezier_point(&controls, s as f32 / samples as f32);
            trail.mark(to_cell(point, size));
        }
    }
}
