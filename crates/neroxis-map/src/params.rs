//! Map-level generation parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::settings::SymmetrySettings;
use crate::symmetry::Symmetry;

/// Largest supported map size in cells per side.
pub const MAX_MAP_SIZE: usize = 4096;

/// Parameters supplied by the orchestrating generator for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapParameters {
    /// Seed for the run; every mask seed is derived from it.
    pub seed: u64,
    /// Cells per side of the generated layers.
    pub map_size: usize,
    /// Number of player spawns.
    pub spawn_count: usize,
    #[serde(default)]
    pub terrain_symmetry: Symmetry,
    #[serde(default)]
    pub team_symmetry: Symmetry,
    #[serde(default)]
    pub spawn_symmetry: Symmetry,
}

impl MapParameters {
    /// Parameters with no symmetry on any axis.
    pub fn new(seed: u64, map_size: usize, spawn_count: usize) -> Self {
        Self {
            seed,
            map_size,
            spawn_count,
            terrain_symmetry: Symmetry::None,
            team_symmetry: Symmetry::None,
            spawn_symmetry: Symmetry::None,
        }
    }

    /// Set all three symmetry axes.
    pub fn with_symmetry(mut self, terrain: Symmetry, team: Symmetry, spawn: Symmetry) -> Self {
        self.terrain_symmetry = terrain;
        self.team_symmetry = team;
        self.spawn_symmetry = spawn;
        self
    }

    /// Parse parameters from a JSON string and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: MapParameters = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Read parameters from a JSON file and validate them.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the parameters and return the resulting symmetry settings.
    pub fn validate(&self) -> Result<SymmetrySettings, ConfigError> {
        if self.map_size == 0 || self.map_size > MAX_MAP_SIZE {
            return Err(ConfigError::InvalidParameter(format!(
                "map_size must be between 1 and {}, got {}",
                MAX_MAP_SIZE, self.map_size
            )));
        }
        if self.spawn_count == 0 {
            return Err(ConfigError::InvalidParameter(
                "spawn_count must be at least 1".to_string(),
            ));
        }

        let settings = self.symmetry_settings()?;

        let spawn_points = settings.spawn().num_sym_points();
        if self.spawn_count % spawn_points != 0 {
            return Err(ConfigError::InvalidParameter(format!(
                "spawn_count {} is not a multiple of the {} points of spawn symmetry {}",
                self.spawn_count,
                spawn_points,
                settings.spawn()
            )));
        }

        Ok(settings)
    }

    /// Build the symmetry settings, checking the divisibility chain.
    pub fn symmetry_settings(&self) -> Result<SymmetrySettings, ConfigError> {
        Ok(SymmetrySettings::new(
            self.terrain_symmetry,
            self.team_symmetry,
            self.spawn_symmetry,
        )?)
    }
}
