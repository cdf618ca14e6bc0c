//! Neroxis End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the mask engine:
//!
//! - **Scenarios**: a small terrain generator exercising every mask family
//! - **Determinism**: identical digests across inline, sequential and pooled runs
//! - **Parameters**: JSON parameter fixtures and their validation
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p neroxis-tests
//! ```
//!
//! ## Determinism Testing
//!
//! ```rust,ignore
//! use neroxis_mask::PipelineConfig;
//! use neroxis_tests::fixtures::load_params;
//! use neroxis_tests::scenario::{run_terrain, ExecutionMode};
//! use neroxis_tests::verify_determinism;
//!
//! let params = load_params("point2_duel").unwrap();
//! let result = verify_determinism(
//!     || {
//!         run_terrain(&params, PipelineConfig::default(), ExecutionMode::Pooled)
//!             .unwrap()
//!             .hash_log_text()
//!     },
//!     3,
//! );
//! result.assert_deterministic();
//! ```

pub mod determinism;
pub mod fixtures;
pub mod scenario;

// Re-export commonly used items
pub use determinism::{
    compare_hash_logs, compute_hash, verify_determinism, verify_hash_determinism,
    DeterminismResult, DiffInfo, MaskDiff,
};
pub use fixtures::init_logging;
pub use scenario::{run_terrain, ExecutionMode, ScenarioError, ScenarioOutput};
