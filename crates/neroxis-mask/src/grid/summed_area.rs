//! 2D prefix sums for constant-time window queries.

use super::{BitGrid, Grid, Scalar, ScalarGrid};

/// Summed-area table over a square grid.
///
/// `table[(x + 1) * (size + 1) + (y + 1)]` holds the sum of all cells with
/// coordinates `<= (x, y)`.
#[derive(Debug, Clone)]
pub struct SummedArea {
    size: usize,
    table: Vec<f64>,
}

impl SummedArea {
    /// Build from a per-cell value function.
    pub fn from_fn(size: usize, value: impl Fn(usize, usize) -> f64) -> Self {
        let stride = size + 1;
        let mut table = vec![0.0; stride * stride];
        for x in 0..size {
            for y in 0..size {
                table[(x + 1) * stride + (y + 1)] = value(x, y)
                    + table[x * stride + (y + 1)]
                    + table[(x + 1) * stride + y]
                    - table[x * stride + y];
            }
        }
        Self { size, table }
    }

    /// Count table of a bit grid.
    pub fn from_bits(grid: &BitGrid) -> Self {
        Self::from_fn(grid.size(), |x, y| grid.get_bit(x, y) as u8 as f64)
    }

    pub fn from_scalars<T: Scalar>(grid: &ScalarGrid<T>) -> Self {
        Self::from_fn(grid.size(), |x, y| grid.get(x, y).to_f64())
    }

    /// Sum over the inclusive window `[x0, x1] × [y0, y1]`.
    pub fn window_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let stride = self.size + 1;
        self.table[(x1 + 1) * stride + (y1 + 1)] - self.table[x0 * stride + (y1 + 1)]
            - self.table[(x1 + 1) * stride + y0]
            + self.table[x0 * stride + y0]
    }

    /// Average over the square of half-width `radius` around `(x, y)`, clipped to the grid.
    pub fn area_average(&self, radius: usize, x: usize, y: usize) -> f64 {
        let last = self.size - 1;
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(last);
        let y1 = (y + radius).min(last);
        let cells = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
        self.window_sum(x0, y0, x1, y1) / cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FloatGrid;

    #[test]
    fn test_window_sum_matches_brute_force() {
        let grid = FloatGrid::from_fn(7, |x, y| ((x * 13 + y * 7) % 5) as f32);
        let table = SummedArea::from_scalars(&grid);
        for (x0, y0, x1, y1) in [(0, 0, 6, 6), (2, 3, 4, 5), (1, 1, 1, 1), (0, 5, 6, 6)] {
            let mut expected = 0.0;
            for x in x0..=x1 {
                for y in y0..=y1 {
                    expected += grid.get(x, y) as f64;
                }
            }
            assert_eq!(table.window_sum(x0, y0, x1, y1), expected);
        }
    }

    #[test]
    fn test_area_average_clips_at_edges() {
        let mut bits = BitGrid::new(5);
        bits.set(0, 0, true);
        let table = SummedArea::from_bits(&bits);
        assert_eq!(table.area_average(1, 0, 0), 0.25);
        assert_eq!(table.area_average(1, 2, 2), 0.0);
    }
}
