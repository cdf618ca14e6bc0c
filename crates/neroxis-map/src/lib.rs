//! Neroxis map model.
//!
//! This crate defines the symmetry model shared by every generated layer and the
//! parameters that drive a generation run:
//!
//! - [`Symmetry`]: a symmetry kind and the coordinate mapping it induces
//! - [`SymmetryRegion`]: the fundamental region used to pick orbit representatives
//! - [`SymmetrySettings`]: the terrain, team and spawn axes of a run
//! - [`MapParameters`]: seed, map size, spawn count and requested symmetries
//!
//! # Example
//!
//! ```
//! use neroxis_map::{MapParameters, Symmetry, SymmetryType};
//!
//! let params = MapParameters::new(42, 256, 2).with_symmetry(
//!     Symmetry::Point(2),
//!     Symmetry::Point(2),
//!     Symmetry::Point(2),
//! );
//! let settings = params.validate().unwrap();
//!
//! let orbit = settings.get(SymmetryType::Terrain).orbit(10, 20, 256);
//! assert_eq!(orbit.as_slice(), &[(10, 20), (245, 235)]);
//! ```

pub mod error;
pub mod params;
pub mod region;
pub mod settings;
pub mod symmetry;

pub use error::{ConfigError, SymmetryError};
pub use params::{MapParameters, MAX_MAP_SIZE};
pub use region::SymmetryRegion;
pub use settings::{SymmetrySettings, SymmetryType};
pub use symmetry::{Symmetry, SymmetryPoints, MAX_POINT_SYMMETRY};
