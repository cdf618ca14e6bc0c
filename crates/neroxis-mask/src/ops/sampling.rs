//! Coordinate sampling with minimum separation.

use glam::Vec2;
use neroxis_map::Symmetry;

use crate::grid::{BitGrid, Grid};
use crate::rng::MaskRng;

/// Cells holding `value`, visiting every `spacing`-th row and column.
pub fn all_coordinates_equal_to(grid: &BitGrid, value: bool, spacing: usize) -> Vec<Vec2> {
    let step = spacing.max(1);
    let size = grid.size();
    let mut coordinates = Vec::new();
    for x in (0..size).step_by(step) {
        for y in (0..size).step_by(step) {
            if grid.get_bit(x, y) == value {
                coordinates.push(Vec2::new(x as f32, y as f32));
            }
        }
    }
    coordinates
}

/// Keep coordinates in order, dropping any closer than `radius` to one already kept.
pub fn space_coordinates(radius: f32, mut candidates: Vec<Vec2>) -> Vec<Vec2> {
    let mut chosen = Vec::new();
    while !candidates.is_empty() {
        let location = candidates.remove(0);
        chosen.push(location);
        candidates.retain(|c| location.distance(*c) >= radius);
    }
    chosen
}

/// Every `spacing`-th cell of a `size` grid, spaced at least `radius` apart.
pub fn spaced_coordinates(size: usize, radius: f32, spacing: usize) -> Vec<Vec2> {
    let step = spacing.max(1);
    let all = (0..size)
        .step_by(step)
        .flat_map(|x| (0..size).step_by(step).map(move |y| Vec2::new(x as f32, y as f32)))
        .collect();
    space_coordinates(radius, all)
}

/// Cells holding `value`, sampled every `spacing` and spaced at least `radius` apart.
pub fn spaced_coordinates_equal_to(grid: &BitGrid, value: bool, radius: f32, spacing: usize) -> Vec<Vec2> {
    space_coordinates(radius, all_coordinates_equal_to(grid, value, spacing))
}

/// Greedy random picks from `candidates` with a random separation in `[min_spacing, max_spacing)`.
///
/// When `symmetry` is given, candidates near the images of each pick are removed
/// as well, so picks stay apart across the whole map.
pub fn random_coordinates(
    mut candidates: Vec<Vec2>,
    rng: &mut MaskRng,
    symmetry: Option<Symmetry>,
    size: usize,
    min_spacing: f32,
    max_spacing: f32,
) -> Vec<Vec2> {
    let mut chosen = Vec::new();
    while !candidates.is_empty() {
        let location = candidates.swap_remove(rng.gen_index(candidates.len()));
        let spacing = rng.gen_f32() * (max_spacing - min_spacing) + min_spacing;
        chosen.push(location);
        candidates.retain(|c| location.distance(*c) >= spacing);
        if let Some(symmetry) = symmetry {
            for (ix, iy) in symmetry.images_unbounded(location.x, location.y, size) {
                let image = Vec2::new(ix, iy);
                candidates.retain(|c| image.distance(*c) >= spacing);
            }
        }
    }
    chosen
}

/// A uniformly chosen true cell, or `None` when there is none.
pub fn random_position(grid: &BitGrid, rng: &mut MaskRng) -> Option<Vec2> {
    let coordinates = all_coordinates_equal_to(grid, true, 1);
    if coordinates.is_empty() {
        return None;
    }
    Some(coordinates[rng.gen_index(coordinates.len())])
}
