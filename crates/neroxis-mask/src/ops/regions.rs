//! 4-connected component analysis.

use std::collections::VecDeque;

use crate::grid::{BitGrid, Grid};

const NEIGHBOURS: [(i64, i64); 4] = [(0, 1), (-1, 0), (0, -1), (1, 0)];

/// Cells 4-connected to `(x, y)` holding the same value, in discovery order.
///
/// The search stops once more than `max_size` cells have been found.
pub fn shape_coordinates(grid: &BitGrid, x: usize, y: usize, max_size: usize) -> Vec<(usize, usize)> {
    let size = grid.size();
    let value = grid.get_bit(x, y);
    let mut seen = BitGrid::new(size);
    let mut queue = VecDeque::from([(x, y)]);
    let mut area = Vec::new();
    seen.set_bit(x, y, true);

    while let Some((cx, cy)) = queue.pop_front() {
        area.push((cx, cy));
        if area.len() > max_size {
            break;
        }
        for (dx, dy) in NEIGHBOURS {
            let (nx, ny) = (cx as i64 + dx, cy as i64 + dy);
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !seen.get_bit(nx, ny) && grid.get_bit(nx, ny) == value {
                seen.set_bit(nx, ny, true);
                queue.push_back((nx, ny));
            }
        }
    }
    area
}

/// 4-connected components of equal value.
#[derive(Debug, Clone)]
pub struct Components {
    size: usize,
    labels: Vec<usize>,
    areas: Vec<usize>,
}

impl Components {
    /// Label every cell of `grid`.
    pub fn label(grid: &BitGrid) -> Self {
        let size = grid.size();
        let mut labels = vec![usize::MAX; size * size];
        let mut areas = Vec::new();
        let mut queue = VecDeque::new();

        for x in 0..size {
            for y in 0..size {
                if labels[x * size + y] != usize::MAX {
                    continue;
                }
                let label = areas.len();
                let value = grid.get_bit(x, y);
                let mut area = 0;
                labels[x * size + y] = label;
                queue.push_back((x, y));
                while let Some((cx, cy)) = queue.pop_front() {
                    area += 1;
                    for (dx, dy) in NEIGHBOURS {
                        let (nx, ny) = (cx as i64 + dx, cy as i64 + dy);
                        if !grid.in_bounds(nx, ny) {
                            continue;
                        }
                        let index = nx as usize * size + ny as usize;
                        if labels[index] == usize::MAX && grid.get_bit(nx as usize, ny as usize) == value {
                            labels[index] = label;
                            queue.push_back((nx as usize, ny as usize));
                        }
                    }
                }
                areas.push(area);
            }
        }
        Self { size, labels, areas }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Label of the component containing `(x, y)`.
    pub fn label_at(&self, x: usize, y: usize) -> usize {
        self.labels[x * self.size + y]
    }

    /// Number of cells in the component containing `(x, y)`.
    pub fn area_at(&self, x: usize, y: usize) -> usize {
        self.areas[self.label_at(x, y)]
    }
}

/// Flip every component, of either value, with fewer than `max_area` cells.
pub fn remove_areas_smaller_than(grid: &mut BitGrid, max_area: usize) {
    let components = Components::label(grid);
    let source = grid.clone();
    for x in 0..grid.size() {
        for y in 0..grid.size() {
            if components.area_at(x, y) < max_area {
                grid.set_bit(x, y, !source.get_bit(x, y));
            }
        }
    }
}

/// Clear every true component with at least `min_area` cells.
///
/// Small false holes are filled first, so a true area is measured together
/// with the holes it encloses.
pub fn remove_areas_bigger_than(grid: &mut BitGrid, min_area: usize) {
    let mut filtered = grid.clone();
    remove_areas_smaller_than(&mut filtered, min_area);
    grid.and_not_assign(&filtered);
}

/// Keep only true areas whose size lies in `[min_area, max_area)`.
pub fn remove_areas_outside_size_range(grid: &mut BitGrid, min_area: usize, max_area: usize) {
    remove_areas_smaller_than(grid, min_area);
    remove_areas_bigger_than(grid, max_area);
}

/// Clear the true areas [`remove_areas_outside_size_range`] would keep.
pub fn remove_areas_in_size_range(grid: &mut BitGrid, min_area: usize, max_area: usize) {
    let mut kept = grid.clone();
    remove_areas_outside_size_range(&mut kept, min_area, max_area);
    grid.and_not_assign(&kept);
}
