//! Fundamental regions of a symmetry.
//!
//! Each column intersects a region in a single run of cells.
//! Operators iterate a region to visit one representative per orbit and then
//! write the whole orbit.

use std::ops::Range;

use crate::symmetry::Symmetry;

/// Per-column `y` ranges covering the fundamental region of a symmetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryRegion {
    size: usize,
    columns: Vec<Range<usize>>,
    x_range: Range<usize>,
}

impl SymmetryRegion {
    /// Scan the grid and record the region's extent in each column.
    pub fn new(symmetry: Symmetry, size: usize) -> Self {
        let mut columns = Vec::with_capacity(size);
        for x in 0..size {
            let mut start = None;
            let mut end = 0;
            for y in 0..size {
                if symmetry.in_region(x, y, size) {
                    if start.is_none() {
                        start = Some(y);
                    }
                    end = y + 1;
                }
            }
            columns.push(match start {
                Some(start) => start..end,
                None => 0..0,
            });
        }

        let first = columns.iter().position(|c| !c.is_empty()).unwrap_or(0);
        let last = columns
            .iter()
            .rposition(|c| !c.is_empty())
            .map_or(first, |i| i + 1);

        Self {
            size,
            columns,
            x_range: first..last,
        }
    }

    /// Grid size the region was built for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Columns that contain at least one region cell.
    pub fn x_range(&self) -> Range<usize> {
        self.x_range.clone()
    }

    /// Region cells in column `x`.
    pub fn y_range(&self, x: usize) -> Range<usize> {
        self.columns.get(x).cloned().unwrap_or(0..0)
    }

    /// Whether `(x, y)` belongs to the region.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.columns.get(x).is_some_and(|c| c.contains(&y))
    }

    /// Number of cells in the region.
    pub fn cell_count(&self) -> usize {
        self.columns.iter().map(|c| c.len()).sum()
    }

    /// Iterate the region column by column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.x_range()
            .flat_map(move |x| self.y_range(x).map(move |y| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_region_is_whole_grid() {
        let region = Symmetry::None.region(16);
        assert_eq!(region.x_range(), 0..16);
        assert_eq!(region.cell_count(), 256);
    }

    #[test]
    fn test_point2_region_is_half() {
        let region = Symmetry::Point(2).region(16);
        assert_eq!(region.cell_count(), 128);
        assert_eq!(region.y_range(3), 0..8);

        let odd = Symmetry::Point(2).region(9);
        assert_eq!(odd.y_range(0), 0..5);
        assert_eq!(odd.y_range(8), 0..4);
    }

    #[test]
    fn test_quad_region_is_quarter() {
        let region = Symmetry::Quad.region(16);
        assert_eq!(region.x_range(), 0..8);
        assert_eq!(region.cell_count(), 64);
    }

    #[test]
    fn test_diag_region_is_triangle() {
        let region = Symmetry::Diag.region(8);
        assert_eq!(region.y_range(0), 0..1);
        assert_eq!(region.y_range(3), 0..4);
        assert_eq!(region.y_range(4), 0..4);
        assert_eq!(region.y_range(7), 0..1);
    }

    #[test]
    fn test_iter_matches_contains() {
        let region = Symmetry::Point(3).region(21);
        let cells: Vec<_> = region.iter().collect();
        assert_eq!(cells.len(), region.cell_count());
        for (x, y) in cells {
            assert!(region.contains(x, y));
            assert!(Symmetry::Point(3).in_region(x, y, 21));
        }
    }
}
