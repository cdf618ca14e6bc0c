//! Symmetry settings: the three symmetry axes of a generation run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SymmetryError;
use crate::symmetry::Symmetry;

/// Which symmetry axis an operator replicates its writes across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryType {
    /// Terrain shapes (land, mountains, plateaus).
    Terrain,
    /// Team-level placement (resources, props).
    Team,
    /// Per-spawn placement; the weakest axis.
    Spawn,
}

impl SymmetryType {
    /// Returns the axis name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymmetryType::Terrain => "terrain",
            SymmetryType::Team => "team",
            SymmetryType::Spawn => "spawn",
        }
    }
}

impl fmt::Display for SymmetryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The spawn, team and terrain symmetries of a generation run.
///
/// The number of spawn symmetry points divides the number of team symmetry
/// points, which divides the number of terrain symmetry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSymmetrySettings", into = "RawSymmetrySettings")]
pub struct SymmetrySettings {
    terrain: Symmetry,
    team: Symmetry,
    spawn: Symmetry,
}

impl SymmetrySettings {
    /// Build settings, validating each symmetry and the divisibility chain.
    pub fn new(terrain: Symmetry, team: Symmetry, spawn: Symmetry) -> Result<Self, SymmetryError> {
        terrain.validate()?;
        team.validate()?;
        spawn.validate()?;

        check_divides("spawn", spawn, "team", team)?;
        check_divides("team", team, "terrain", terrain)?;

        Ok(Self {
            terrain,
            team,
            spawn,
        })
    }

    /// The same symmetry on every axis.
    pub fn uniform(symmetry: Symmetry) -> Self {
        Self {
            terrain: symmetry,
            team: symmetry,
            spawn: symmetry,
        }
    }

    /// No symmetry on any axis.
    pub fn none() -> Self {
        Self::uniform(Symmetry::None)
    }

    pub fn terrain(&self) -> Symmetry {
        self.terrain
    }

    pub fn team(&self) -> Symmetry {
        self.team
    }

    pub fn spawn(&self) -> Symmetry {
        self.spawn
    }

    /// Symmetry for the given axis.
    pub fn get(&self, symmetry_type: SymmetryType) -> Symmetry {
        match symmetry_type {
            SymmetryType::Terrain => self.terrain,
            SymmetryType::Team => self.team,
            SymmetryType::Spawn => self.spawn,
        }
    }

    /// Whether no axis constrains edits.
    pub fn is_unconstrained(&self) -> bool {
        self.terrain == Symmetry::None && self.team == Symmetry::None && self.spawn == Symmetry::None
    }
}

impl Default for SymmetrySettings {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for SymmetrySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "terrain={} team={} spawn={}",
            self.terrain, self.team, self.spawn
        )
    }
}

fn check_divides(
    smaller_axis: &'static str,
    smaller: Symmetry,
    larger_axis: &'static str,
    larger: Symmetry,
) -> Result<(), SymmetryError> {
    let smaller_points = smaller.num_sym_points();
    let larger_points = larger.num_sym_points();
    if larger_points % smaller_points != 0 {
        return Err(SymmetryError::Indivisible {
            smaller_axis,
            smaller,
            smaller_points,
            larger_axis,
            larger,
            larger_points,
        });
    }
    Ok(())
}

/// Unvalidated wire form of [`SymmetrySettings`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSymmetrySettings {
    terrain: Symmetry,
    team: Symmetry,
    spawn: Symmetry,
}

impl TryFrom<RawSymmetrySettings> for SymmetrySettings {
    type Error = SymmetryError;

    fn try_from(raw: RawSymmetrySettings) -> Result<Self, Self::Error> {
        SymmetrySettings::new(raw.terrain, raw.team, raw.spawn)
    }
}

impl From<SymmetrySettings> for RawSymmetrySettings {
    fn from(settings: SymmetrySettings) -> Self {
        Self {
            terrain: settings.terrain,
            team: settings.team,
            spawn: settings.spawn,
        }
    }
}
