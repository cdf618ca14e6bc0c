//! Random walks that paint their trail.

use neroxis_map::Symmetry;

use super::write_orbit;
use crate::grid::{BitGrid, Grid};
use crate::rng::MaskRng;

const STEPS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Random starting cell inside the fundamental region of `symmetry`.
fn random_start(rng: &mut MaskRng, symmetry: Symmetry, size: usize) -> Option<(i64, i64)> {
    let region = symmetry.region(size);
    let xs = region.x_range();
    if xs.is_empty() {
        return None;
    }
    let x = rng.gen_range(xs);
    let ys = region.y_range(x);
    if ys.is_empty() {
        return None;
    }
    let y = rng.gen_range(ys);
    Some((x as i64, y as i64))
}

fn walk(
    grid: &mut BitGrid,
    rng: &mut MaskRng,
    symmetry: Symmetry,
    start: (i64, i64),
    steps: usize,
    directions: &[(i64, i64)],
) {
    let (mut x, mut y) = start;
    for _ in 0..steps {
        if grid.in_bounds(x, y) {
            write_orbit(grid, symmetry, x as usize, y as usize, true);
        }
        let (dx, dy) = directions[rng.gen_index(directions.len())];
        x += dx;
        y += dy;
    }
}

/// Unbiased 4-direction walks from random starts, marking visited cells and their images.
pub fn random_walk(grid: &mut BitGrid, rng: &mut MaskRng, symmetry: Symmetry, walkers: usize, steps: usize) {
    let size = grid.size();
    for _ in 0..walkers {
        let Some(start) = random_start(rng, symmetry, size) else {
            return;
        };
        walk(grid, rng, symmetry, start, steps, &STEPS);
    }
}

/// Like [`random_walk`], but each walker never moves in one randomly chosen direction.
pub fn progressive_walk(grid: &mut BitGrid, rng: &mut MaskRng, symmetry: Symmetry, walkers: usize, steps: usize) {
    let size = grid.size();
    for _ in 0..walkers {
        let Some(start) = random_start(rng, symmetry, size) else {
            return;
        };
        let mut directions = STEPS.to_vec();
        directions.remove(rng.gen_index(directions.len()));
        walk(grid, rng, symmetry, start, steps, &directions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::test_support::assert_symmetric;

    #[test]
    fn test_random_walk_marks_cells_symmetrically() {
        let mut grid = BitGrid::new(33);
        let mut rng = MaskRng::new(11);
        random_walk(&mut grid, &mut rng, Symmetry::Quad, 3, 40);
        assert!(grid.count_ones() > 0);
        assert_symmetric(&grid, Symmetry::Quad);
    }

    #[test]
    fn test_walk_trail_is_bounded_by_steps() {
        let mut grid = BitGrid::new(64);
        let mut rng = MaskRng::new(5);
        random_walk(&mut grid, &mut rng, Symmetry::None, 1, 10);
        let count = grid.count_ones();
        assert!((1..=10).contains(&count), "count {}", count);
    }

    #[test]
    fn test_progressive_walk_is_deterministic() {
        let mut a = BitGrid::new(32);
        let mut b = BitGrid::new(32);
        progressive_walk(&mut a, &mut MaskRng::new(8), Symmetry::Point(2), 4, 25);
        progressive_walk(&mut b, &mut MaskRng::new(8), Symmetry::Point(2), 4, 25);
        assert_eq!(a, b);
        assert_symmetric(&a, Symmetry::Point(2));
    }
}
