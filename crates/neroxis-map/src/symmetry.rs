//! Symmetry kinds and the coordinate mapping they induce on a square grid.
//!
//! A symmetry describes a finite group of transforms of a `size × size` grid.
//! Every transform is expressed in cell coordinates, so the mirror of column
//! `x` is `size - 1 - x` and rotations turn around `((size - 1) / 2, (size - 1) / 2)`.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SymmetryError;
use crate::region::SymmetryRegion;

/// Largest number of rotational points supported by [`Symmetry::Point`].
pub const MAX_POINT_SYMMETRY: u8 = 16;

/// A symmetry constraint applied to grid edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Symmetry {
    /// No symmetry; every cell is independent.
    #[default]
    None,
    /// N-fold rotation around the grid center (N in 2..=16).
    Point(u8),
    /// Mirror across the vertical center line (`x -> size - 1 - x`).
    X,
    /// Mirror across the horizontal center line (`y -> size - 1 - y`).
    Z,
    /// Mirror across the main diagonal (`(x, y) -> (y, x)`).
    XZ,
    /// Mirror across the anti-diagonal (`(x, y) -> (size - 1 - y, size - 1 - x)`).
    ZX,
    /// Both center-line mirrors (4 points).
    Quad,
    /// Both diagonal mirrors (4 points).
    Diag,
}

impl Symmetry {
    /// Build a rotational symmetry, validating the point count.
    pub fn point(points: u8) -> Result<Self, SymmetryError> {
        let symmetry = Symmetry::Point(points);
        symmetry.validate()?;
        Ok(symmetry)
    }

    /// Check that this value is a supported symmetry.
    pub fn validate(&self) -> Result<(), SymmetryError> {
        match self {
            Symmetry::Point(n) if !(2..=MAX_POINT_SYMMETRY).contains(n) => {
                Err(SymmetryError::InvalidPointCount(*n))
            }
            _ => Ok(()),
        }
    }

    /// Number of points in a full orbit (the order of the symmetry group).
    pub fn num_sym_points(&self) -> usize {
        match self {
            Symmetry::None => 1,
            Symmetry::Point(n) => *n as usize,
            Symmetry::X | Symmetry::Z | Symmetry::XZ | Symmetry::ZX => 2,
            Symmetry::Quad | Symmetry::Diag => 4,
        }
    }

    /// Whether every transform maps cells exactly onto cells.
    ///
    /// Rotations other than 2-fold and 4-fold land between cells and are rounded.
    pub fn is_perfect(&self) -> bool {
        !matches!(self, Symmetry::Point(n) if *n != 2 && *n != 4)
    }

    /// Images of `(x, y)` under every non-identity transform that fall inside the grid.
    ///
    /// An entry equals `(x, y)` only when that transform fixes the point.
    pub fn images(&self, x: usize, y: usize, size: usize) -> SymmetryPoints {
        let mut points = SymmetryPoints::new();
        let last = size - 1;
        match self {
            Symmetry::None => {}
            Symmetry::Point(2) => points.push(last - x, last - y),
            Symmetry::Point(4) => {
                points.push(last - y, x);
                points.push(last - x, last - y);
                points.push(y, last - x);
            }
            Symmetry::Point(n) => {
                let center = last as f64 / 2.0;
                let dx = x as f64 - center;
                let dy = y as f64 - center;
                for k in 1..*n {
                    let angle = TAU * k as f64 / *n as f64;
                    let (sin, cos) = angle.sin_cos();
                    let rx = (center + dx * cos - dy * sin).round();
                    let ry = (center + dx * sin + dy * cos).round();
                    if rx >= 0.0 && ry >= 0.0 && rx < size as f64 && ry < size as f64 {
                        points.push(rx as usize, ry as usize);
                    }
                }
            }
            Symmetry::X => points.push(last - x, y),
            Symmetry::Z => points.push(x, last - y),
            Symmetry::XZ => points.push(y, x),
            Symmetry::ZX => points.push(last - y, last - x),
            Symmetry::Quad => {
                points.push(last - x, y);
                points.push(x, last - y);
                points.push(last - x, last - y);
            }
            Symmetry::Diag => {
                points.push(y, x);
                points.push(last - y, last - x);
                points.push(last - x, last - y);
            }
        }
        points
    }

    /// The deduplicated orbit of `(x, y)`, starting with the point itself.
    pub fn orbit(&self, x: usize, y: usize, size: usize) -> SymmetryPoints {
        let mut orbit = SymmetryPoints::new();
        orbit.push(x, y);
        for (sx, sy) in self.images(x, y, size).iter() {
            if !orbit.contains(sx, sy) {
                orbit.push(sx, sy);
            }
        }
        orbit
    }

    /// Images of a continuous location, without rounding or bounds filtering.
    pub fn images_unbounded(&self, x: f32, y: f32, size: usize) -> Vec<(f32, f32)> {
        let last = (size - 1) as f32;
        match self {
            Symmetry::None => Vec::new(),
            Symmetry::Point(2) => vec![(last - x, last - y)],
            Symmetry::Point(4) => vec![(last - y, x), (last - x, last - y), (y, last - x)],
            Symmetry::Point(n) => {
                let center = last / 2.0;
                let dx = x - center;
                let dy = y - center;
                (1..*n)
                    .map(|k| {
                        let angle = std::f32::consts::TAU * k as f32 / *n as f32;
                        let (sin, cos) = angle.sin_cos();
                        (center + dx * cos - dy * sin, center + dx * sin + dy * cos)
                    })
                    .collect()
            }
            Symmetry::X => vec![(last - x, y)],
            Symmetry::Z => vec![(x, last - y)],
            Symmetry::XZ => vec![(y, x)],
            Symmetry::ZX => vec![(last - y, last - x)],
            Symmetry::Quad => vec![(last - x, y), (x, last - y), (last - x, last - y)],
            Symmetry::Diag => vec![(y, x), (last - y, last - x), (last - x, last - y)],
        }
    }

    /// Whether `(x, y)` lies in the fundamental region used to pick orbit representatives.
    pub fn in_region(&self, x: usize, y: usize, size: usize) -> bool {
        let last = size - 1;
        match self {
            Symmetry::None => true,
            Symmetry::Point(2) => 2 * y < last || (2 * y == last && 2 * x <= last),
            Symmetry::Point(4) => (2 * x < last && 2 * y <= last) || (2 * x == last && 2 * y == last),
            Symmetry::Quad => 2 * x <= last && 2 * y <= last,
            Symmetry::Point(n) => {
                let center = last as f64 / 2.0;
                let dx = x as f64 - center;
                let dy = y as f64 - center;
                if dx == 0.0 && dy == 0.0 {
                    return true;
                }
                let angle = dy.atan2(dx).rem_euclid(TAU);
                angle < TAU / *n as f64
            }
            Symmetry::X => 2 * x <= last,
            Symmetry::Z => 2 * y <= last,
            Symmetry::XZ => y <= x,
            Symmetry::ZX => x + y <= last,
            Symmetry::Diag => y <= x && x + y <= last,
        }
    }

    /// Column ranges of the fundamental region for a grid of `size`.
    pub fn region(&self, size: usize) -> SymmetryRegion {
        SymmetryRegion::new(*self, size)
    }

    /// Canonical name, e.g. `POINT4` or `QUAD`.
    pub fn name(&self) -> String {
        match self {
            Symmetry::None => "NONE".to_string(),
            Symmetry::Point(n) => format!("POINT{}", n),
            Symmetry::X => "X".to_string(),
            Symmetry::Z => "Z".to_string(),
            Symmetry::XZ => "XZ".to_string(),
            Symmetry::ZX => "ZX".to_string(),
            Symmetry::Quad => "QUAD".to_string(),
            Symmetry::Diag => "DIAG".to_string(),
        }
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Symmetry {
    type Err = SymmetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "NONE" => Ok(Symmetry::None),
            "X" => Ok(Symmetry::X),
            "Z" => Ok(Symmetry::Z),
            "XZ" => Ok(Symmetry::XZ),
            "ZX" => Ok(Symmetry::ZX),
            "QUAD" => Ok(Symmetry::Quad),
            "DIAG" => Ok(Symmetry::Diag),
            other => match other.strip_prefix("POINT").map(str::parse::<u8>) {
                Some(Ok(n)) => Symmetry::point(n),
                _ => Err(SymmetryError::Unknown(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for Symmetry {
    type Error = SymmetryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symmetry> for String {
    fn from(value: Symmetry) -> Self {
        value.name()
    }
}

/// A small inline list of grid points; an orbit never exceeds 16 entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetryPoints {
    points: [(usize, usize); MAX_POINT_SYMMETRY as usize],
    len: usize,
}

impl SymmetryPoints {
    fn new() -> Self {
        Self {
            points: [(0, 0); MAX_POINT_SYMMETRY as usize],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, x: usize, y: usize) {
        debug_assert!(self.len < self.points.len(), "orbit exceeds {} points", self.points.len());
        self.points[self.len] = (x, y);
        self.len += 1;
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `(x, y)` is in the list.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.as_slice().contains(&(x, y))
    }

    /// The points as a slice.
    pub fn as_slice(&self) -> &[(usize, usize)] {
        &self.points[..self.len]
    }

    /// Iterate over the points.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.as_slice().iter().copied()
    }
}
