//! Morphological operators on boolean grids.

use neroxis_map::Symmetry;

use crate::grid::{BitGrid, Grid, SummedArea};
use crate::rng::MaskRng;

/// Set every cell within `radius` of an edge cell holding `value` to `value`.
///
/// Distances are compared squared, so a radius of 1 marks the 4-neighbours only.
fn mark_in_radius(source: &BitGrid, target: &mut BitGrid, radius: f32, value: bool) {
    if radius <= 0.0 {
        return;
    }
    let size = source.size();
    let radius2 = radius * radius;
    let reach = (radius.ceil() as i64).min(size as i64);
    let last = size as i64 - 1;
    for x in 0..size {
        for y in 0..size {
            if source.get_bit(x, y) != value || !source.is_edge(x, y) {
                continue;
            }
            let (cx, cy) = (x as i64, y as i64);
            for dx in (-reach).max(-cx)..=reach.min(last - cx) {
                for dy in (-reach).max(-cy)..=reach.min(last - cy) {
                    if (dx * dx + dy * dy) as f32 > radius2 {
                        continue;
                    }
                    target.set_bit((cx + dx) as usize, (cy + dy) as usize, value);
                }
            }
        }
    }
}

/// Grow true areas by `radius`.
pub fn inflate(grid: &mut BitGrid, radius: f32) {
    let source = grid.clone();
    mark_in_radius(&source, grid, radius, true);
}

/// Shrink true areas by `radius`.
pub fn deflate(grid: &mut BitGrid, radius: f32) {
    let source = grid.clone();
    mark_in_radius(&source, grid, radius, false);
}

/// Flip edge cells holding `from` with probability `strength`, `count` times.
///
/// One draw is made per representative of `symmetry`, and only for cells that
/// hold `from`; the outcome is applied to the whole orbit.
fn flip_edges(
    grid: &mut BitGrid,
    rng: &mut MaskRng,
    symmetry: Symmetry,
    strength: f32,
    count: usize,
    from: bool,
) {
    let size = grid.size();
    let region = symmetry.region(size);
    for _ in 0..count {
        let source = grid.clone();
        for (x, y) in region.iter() {
            if source.get_bit(x, y) == from && rng.gen_f32() < strength && source.is_edge(x, y) {
                for (sx, sy) in symmetry.orbit(x, y, size).iter() {
                    grid.set_bit(sx, sy, !from);
                }
            }
        }
    }
}

/// Randomly clear true edge cells.
pub fn erode(grid: &mut BitGrid, rng: &mut MaskRng, symmetry: Symmetry, strength: f32, count: usize) {
    flip_edges(grid, rng, symmetry, strength, count, true);
}

/// Randomly set false edge cells.
pub fn dilute(grid: &mut BitGrid, rng: &mut MaskRng, symmetry: Symmetry, strength: f32, count: usize) {
    flip_edges(grid, rng, symmetry, strength, count, false);
}

/// Clear cells with more than one false (in-grid) 4-neighbour.
pub fn cut_corners(grid: &mut BitGrid) {
    let source = grid.clone();
    let size = grid.size();
    for x in 0..size {
        for y in 0..size {
            let (x, y) = (x as i64, y as i64);
            let open = [(x - 1, y), (x, y - 1), (x + 1, y), (x, y + 1)]
                .into_iter()
                .filter(|&(nx, ny)| source.in_bounds(nx, ny) && !source.get_or_false(nx, ny))
                .count();
            if open > 1 {
                grid.set_bit(x as usize, y as usize, false);
            }
        }
    }
}

/// Keep only edge cells, of either value.
pub fn outline(grid: &mut BitGrid) {
    let source = grid.clone();
    let size = grid.size();
    for x in 0..size {
        for y in 0..size {
            grid.set_bit(x, y, source.is_edge(x, y));
        }
    }
}

/// Set each cell to whether the true fraction of its `radius` window reaches `density`.
pub fn blur(grid: &mut BitGrid, radius: usize, density: f32) {
    let table = SummedArea::from_bits(grid);
    let size = grid.size();
    for x in 0..size {
        for y in 0..size {
            grid.set_bit(x, y, table.area_average(radius, x, y) >= density as f64);
        }
    }
}
