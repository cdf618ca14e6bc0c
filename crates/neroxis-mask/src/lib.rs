//! Neroxis Mask Engine
//!
//! Symmetry-constrained 2D grids ("masks") and the deferred pipeline that
//! evaluates operations on them.
//!
//! # Overview
//!
//! Every layer of a generated map is a square mask. Mutating calls on a mask do
//! not run right away: they are validated, then enqueued as tasks on the
//! [`Pipeline`] that owns the mask. Tasks of one mask run in call order, tasks
//! of independent masks may run on different workers, and the result is the
//! same for a given seed whether the pipeline is parallel or sequential.
//!
//! # Example
//!
//! ```
//! use neroxis_map::{Symmetry, SymmetrySettings};
//! use neroxis_mask::{BooleanMask, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::sequential());
//! let land = BooleanMask::builder(&pipeline, "land")
//!     .size(64)
//!     .seed(3)
//!     .symmetry(SymmetrySettings::uniform(Symmetry::Point(2)))
//!     .build()
//!     .unwrap();
//! land.randomize(0.4).unwrap().inflate(2.0).unwrap().cut_corners().unwrap();
//!
//! pipeline.start().unwrap();
//! pipeline.await_masks(&[&land]).unwrap();
//! println!("land hash: {}", land.to_hash().unwrap());
//! pipeline.stop();
//! ```
//!
//! # Modules
//!
//! - [`mask`]: mask handles and their operators
//! - [`pipeline`]: task scheduling, worker pool and hash log
//! - [`grid`]: dense grid storage per element type
//! - [`ops`]: grid algorithms shared by the mask operators
//! - [`brush`]: brush height fields used for stamping
//! - [`hash`]: mask content digests
//! - [`png`]: image export

pub mod brush;
pub mod error;
pub mod grid;
pub mod hash;
pub mod mask;
pub mod ops;
pub mod pipeline;
pub mod png;
pub mod rng;

// Re-export commonly used types at the crate root
pub use brush::{BrushError, BrushLibrary, BrushSource};
pub use error::{MaskError, PipelineError};
pub use grid::{
    Aggregate, BitGrid, FloatGrid, Grid, IntegerGrid, NormalGrid, Scalar, ScalarGrid, VectorField,
    VectorGrid, VectorValue,
};
pub use hash::DIGEST_HEX_LEN;
pub use mask::{
    BooleanMask, BrushWalk, FloatMask, IntegerMask, Mask, MaskBuilder, NormalMask, Vector2Mask,
    Vector3Mask, Vector4Mask,
};
pub use ops::path::PathOptions;
pub use ops::stamp::Placement;
pub use pipeline::{MaskId, MaskRef, Pipeline, PipelineConfig, TaskId};
pub use png::{PngConfig, PngError};
pub use rng::MaskRng;
