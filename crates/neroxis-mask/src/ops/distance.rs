//! Euclidean distance transform and extrema detection.
//!
//! The transform is the two-pass lower envelope of parabolas (Felzenszwalb and
//! Huttenlocher): one pass along every column, then one along every row.

use crate::grid::{BitGrid, FloatGrid, Grid, Scalar, ScalarGrid};

use super::morphology::inflate;

/// One-dimensional squared distance transform of `f` into `out`.
fn transform_line(f: &[f64], out: &mut [f64], vertices: &mut [usize], bounds: &mut [f64]) {
    let n = f.len();
    let mut k = 0;
    vertices[0] = 0;
    bounds[0] = f64::NEG_INFINITY;
    bounds[1] = f64::INFINITY;
    for q in 1..n {
        let intersection = |v: usize| {
            ((f[q] + (q * q) as f64) - (f[v] + (v * v) as f64)) / (2.0 * q as f64 - 2.0 * v as f64)
        };
        let mut s = intersection(vertices[k]);
        while s <= bounds[k] {
            k -= 1;
            s = intersection(vertices[k]);
        }
        k += 1;
        vertices[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f64::INFINITY;
    }
    k = 0;
    for (q, value) in out.iter_mut().enumerate() {
        while bounds[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - vertices[k] as f64;
        *value = d * d + f[vertices[k]];
    }
}

/// Distance from every cell to the nearest true cell.
///
/// With no true cell at all, every cell holds `sqrt(2) * size`.
pub fn distance_field(grid: &BitGrid) -> FloatGrid {
    let size = grid.size();
    let far = 2.0 * (size * size) as f64;
    let mut squared: Vec<f64> = (0..size * size)
        .map(|i| if grid.get_bit(i / size, i % size) { 0.0 } else { far })
        .collect();

    let mut line = vec![0.0; size];
    let mut out = vec![0.0; size];
    let mut vertices = vec![0; size];
    let mut bounds = vec![0.0; size + 1];

    // along y for each column
    for x in 0..size {
        line.copy_from_slice(&squared[x * size..(x + 1) * size]);
        transform_line(&line, &mut out, &mut vertices, &mut bounds);
        squared[x * size..(x + 1) * size].copy_from_slice(&out);
    }
    // along x for each row
    for y in 0..size {
        for x in 0..size {
            line[x] = squared[x * size + y];
        }
        transform_line(&line, &mut out, &mut vertices, &mut bounds);
        for x in 0..size {
            squared[x * size + y] = out[x];
        }
    }

    FloatGrid::from_fn(size, |x, y| squared[x * size + y].min(far).sqrt() as f32)
}

fn extrema<T: Scalar>(grid: &ScalarGrid<T>, min: T, max: T, beats: impl Fn(T, T) -> bool) -> BitGrid {
    BitGrid::from_fn(grid.size(), |x, y| {
        let value = grid.get(x, y);
        if value < min || value > max {
            return false;
        }
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if (dx, dy) != (0, 0) && grid.in_bounds(nx, ny) && beats(grid.get(nx as usize, ny as usize), value) {
                    return false;
                }
            }
        }
        true
    })
}

/// Cells in `[min, max]` with no strictly greater 8-neighbour.
pub fn local_maxima<T: Scalar>(grid: &ScalarGrid<T>, min: T, max: T) -> BitGrid {
    extrema(grid, min, max, |neighbour, value| neighbour > value)
}

/// Cells in `[min, max]` with no strictly smaller 8-neighbour.
pub fn local_minima<T: Scalar>(grid: &ScalarGrid<T>, min: T, max: T) -> BitGrid {
    extrema(grid, min, max, |neighbour, value| neighbour < value)
}

/// Cells of false gaps narrower than `min_dist`.
///
/// The ridge of the distance field inside each gap is kept where it stays
/// within `min_dist / 2`, then grown back to the gap's width.
pub fn narrow_gaps(grid: &BitGrid, min_dist: usize) -> BitGrid {
    let half = min_dist as f32 / 2.0;
    let mut gaps = local_maxima(&distance_field(grid), 1.0, half);
    inflate(&mut gaps, half);
    gaps
}

/// Set the cells of narrow false gaps.
pub fn fill_gaps(grid: &mut BitGrid, min_dist: usize) {
    let gaps = narrow_gaps(grid, min_dist);
    grid.or_assign(&gaps);
}

/// Clear true cells bordering narrow false gaps.
pub fn widen_gaps(grid: &mut BitGrid, min_dist: usize) {
    let gaps = narrow_gaps(grid, min_dist);
    grid.and_not_assign(&gaps);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn brute_force(grid: &BitGrid) -> FloatGrid {
        let size = grid.size();
        let trues: Vec<(usize, usize)> = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x, y)))
            .filter(|&(x, y)| grid.get_bit(x, y))
            .collect();
        FloatGrid::from_fn(size, |x, y| {
            trues
                .iter()
                .map(|&(tx, ty)| {
                    let (dx, dy) = (x as f64 - tx as f64, y as f64 - ty as f64);
                    (dx * dx + dy * dy).sqrt()
                })
                .fold(f64::INFINITY, f64::min) as f32
        })
    }

    #[test]
    fn test_distance_field_matches_brute_force() {
        let grid = BitGrid::from_fn(17, |x, y| (x * 7 + y * 3) % 23 == 0);
        let fast = distance_field(&grid);
        let slow = brute_force(&grid);
        for x in 0..17 {
            for y in 0..17 {
                assert!((fast.get(x, y) - slow.get(x, y)).abs() < 1e-4, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_distance_field_single_point() {
        let mut grid = BitGrid::new(9);
        grid.set_bit(4, 4, true);
        let field = distance_field(&grid);
        assert_eq!(field.get(4, 4), 0.0);
        assert_eq!(field.get(4, 7), 3.0);
        assert_eq!(field.get(7, 8), 5.0);
    }

    #[test]
    fn test_distance_field_empty_grid() {
        let field = distance_field(&BitGrid::new(4));
        let expected = (32.0f64).sqrt() as f32;
        assert!(field.values().iter().all(|&v| v == expected));
    }

    #[test]
    fn test_local_extrema() {
        let grid = FloatGrid::from_fn(5, |x, y| {
            let (dx, dy) = (x as f32 - 2.0, y as f32 - 2.0);
            4.0 - (dx * dx + dy * dy).sqrt()
        });
        let maxima = local_maxima(&grid, 0.0, 10.0);
        assert_eq!(maxima.count_ones(), 1);
        assert!(maxima.get_bit(2, 2));
        assert_eq!(local_maxima(&grid, 5.0, 10.0).count_ones(), 0);

        let minima = local_minima(&grid, -10.0, 10.0);
        assert!(minima.get_bit(0, 0));
        assert!(minima.get_bit(4, 4));
        assert!(!minima.get_bit(2, 2));
    }

    #[test]
    fn test_fill_gaps_closes_narrow_channel() {
        // two blocks separated by a two-cell channel
        let mut grid = BitGrid::from_fn(20, |x, _| x < 9 || x > 10);
        fill_gaps(&mut grid, 6);
        assert!(grid.get_bit(9, 10));
        assert!(grid.get_bit(10, 10));
    }

    #[test]
    fn test_widen_gaps_leaves_wide_areas() {
        let original = BitGrid::from_fn(20, |x, _| x < 9 || x > 10);
        let mut grid = original.clone();
        widen_gaps(&mut grid, 6);
        assert!(grid.count_ones() < original.count_ones());
        assert!(grid.get_bit(0, 10));
        assert!(!grid.get_bit(8, 10));
    }
}
