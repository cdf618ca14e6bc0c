//! Stamping one grid onto another at an offset.

use neroxis_map::Symmetry;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Where a stamp lands on the target grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    /// Place the middle of the source at `(x, y)` rather than its corner.
    pub center: bool,
    /// Wrap cells that fall off one edge around to the opposite edge.
    pub wrap: bool,
}

impl Placement {
    pub fn at(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn centered(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            center: true,
            wrap: false,
        }
    }

    pub fn wrapping(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }
}

/// Coordinate `i` of a `from_size` grid shifted by `offset` into a `to_size` grid.
fn shifted_map(offset: i64, center: bool, wrap: bool, from_size: usize, to_size: usize) -> Vec<i64> {
    let half = if center { (from_size / 2) as i64 } else { 0 };
    (0..from_size as i64)
        .map(|i| {
            let shifted = i + offset - half;
            if wrap {
                shifted.rem_euclid(to_size as i64)
            } else {
                shifted
            }
        })
        .collect()
}

/// Call `action` for every source cell that lands inside `target`.
///
/// A source no bigger than the target is stamped at the placement and at each
/// of its images under `spawn`. With a perfect symmetry every stamped cell is
/// written through its orbit; otherwise the anchor images are rounded and each
/// copy is stamped without orbits. A source bigger than the target is sampled
/// at the shifted coordinate of each target cell instead; with a perfect
/// symmetry only region representatives are sampled and written through their
/// orbits.
pub fn stamp<G, S, F>(target: &mut G, spawn: Symmetry, source: &S, placement: Placement, mut action: F)
where
    G: Grid,
    S: Grid,
    F: FnMut(&mut G, usize, usize, S::Value),
{
    let size = target.size();
    let source_size = source.size();
    let Placement { x, y, center, wrap } = placement;

    if source_size > size {
        let xs = shifted_map(x, center, wrap, size, source_size);
        let ys = shifted_map(y, center, wrap, size, source_size);
        let sample = |tx: usize, ty: usize| {
            source
                .in_bounds(xs[tx], ys[ty])
                .then(|| source.get(xs[tx] as usize, ys[ty] as usize))
        };
        if spawn.is_perfect() {
            for (tx, ty) in spawn.region(size).iter() {
                if let Some(value) = sample(tx, ty) {
                    for (ox, oy) in spawn.orbit(tx, ty, size).iter() {
                        action(target, ox, oy, value);
                    }
                }
            }
        } else {
            for tx in 0..size {
                for ty in 0..size {
                    if let Some(value) = sample(tx, ty) {
                        action(target, tx, ty, value);
                    }
                }
            }
        }
        return;
    }

    if spawn.is_perfect() {
        let xs = shifted_map(x, center, wrap, source_size, size);
        let ys = shifted_map(y, center, wrap, source_size, size);
        for sx in 0..source_size {
            for sy in 0..source_size {
                if !target.in_bounds(xs[sx], ys[sy]) {
                    continue;
                }
                let value = source.get(sx, sy);
                for (ox, oy) in spawn.orbit(xs[sx] as usize, ys[sy] as usize, size).iter() {
                    action(target, ox, oy, value);
                }
            }
        }
        return;
    }

    let mut anchors = vec![(x, y)];
    anchors.extend(
        spawn
            .images_unbounded(x as f32, y as f32, size)
            .into_iter()
            .map(|(ax, ay)| (ax.round() as i64, ay.round() as i64)),
    );
    for (ax, ay) in anchors {
        let xs = shifted_map(ax, center, wrap, source_size, size);
        let ys = shifted_map(ay, center, wrap, source_size, size);
        for sx in 0..source_size {
            for sy in 0..source_size {
                if target.in_bounds(xs[sx], ys[sy]) {
                    let value = source.get(sx, sy);
                    action(target, xs[sx] as usize, ys[sy] as usize, value);
                }
            }
        }
    }
}
