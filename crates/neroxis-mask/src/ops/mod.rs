//! Grid algorithms behind the mask operators.
//!
//! Functions here work on plain grids and take the symmetry to honour as an
//! argument, so they can be used and tested without a pipeline.

pub mod distance;
pub mod morphology;
pub mod path;
pub mod regions;
pub mod sampling;
pub mod stamp;
pub mod walk;

use neroxis_map::Symmetry;

use crate::grid::Grid;

/// Write `value` to `(x, y)` and each of its images.
pub fn write_orbit<G: Grid>(grid: &mut G, symmetry: Symmetry, x: usize, y: usize, value: G::Value) {
    let size = grid.size();
    for (sx, sy) in symmetry.orbit(x, y, size).iter() {
        grid.set(sx, sy, value);
    }
}

/// Clamp a signed coordinate pair into the grid.
pub(crate) fn clamp_to_grid(x: i64, y: i64, size: usize) -> (usize, usize) {
    let last = size as i64 - 1;
    (x.clamp(0, last) as usize, y.clamp(0, last) as usize)
}
