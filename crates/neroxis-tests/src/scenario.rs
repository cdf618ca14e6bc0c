//! A small terrain generator used as an end-to-end workload.
//!
//! The scenario touches every mask family: boolean terrain layers combined
//! across masks, a height field built from them with brushes carved at the
//! spawns, threshold copies and derived normals.

use glam::Vec2;
use thiserror::Error;

use neroxis_map::{ConfigError, MapParameters, SymmetryType};
use neroxis_mask::{
    BooleanMask, FloatMask, MaskError, MaskRng, NormalMask, Pipeline, PipelineConfig, PipelineError,
};

use crate::determinism::render_hash_log;
use crate::fixtures::brush_library;

/// Errors raised while running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid parameters: {0}")]
    Config(#[from] ConfigError),

    #[error("mask error: {0}")]
    Mask(#[from] MaskError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// How mask operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Every operation runs on the calling thread as it is enqueued.
    Inline,
    /// Operations are queued and run by the worker pool.
    Pooled,
}

/// Masks produced by [`run_terrain`].
#[derive(Debug)]
pub struct TerrainMasks {
    pub land: BooleanMask,
    pub mountains: BooleanMask,
    pub plateaus: BooleanMask,
    pub spawns: BooleanMask,
    pub ramps: BooleanMask,
    pub heights: FloatMask,
    pub normals: NormalMask,
}

/// Outcome of one scenario run.
#[derive(Debug)]
pub struct ScenarioOutput {
    pub pipeline: Pipeline,
    pub masks: TerrainMasks,
    /// Spawn locations chosen in the spawn symmetry region.
    pub spawn_locations: Vec<Vec2>,
    /// Final digest of every mask, in registration order.
    pub hash_log: Vec<(String, String)>,
    /// Digest history of every mask, in registration order.
    pub task_hashes: Vec<(String, Vec<String>)>,
}

impl ScenarioOutput {
    /// The hash log as `<name> <digest>` lines.
    pub fn hash_log_text(&self) -> String {
        render_hash_log(&self.hash_log)
    }
}

/// Generate the terrain layers for `params` on a fresh pipeline.
pub fn run_terrain(
    params: &MapParameters,
    config: PipelineConfig,
    mode: ExecutionMode,
) -> Result<ScenarioOutput, ScenarioError> {
    let pipeline = Pipeline::new(config);
    let result = generate(&pipeline, params, mode);
    pipeline.stop();
    let (masks, spawn_locations) = result?;
    let hash_log = pipeline.hash_log()?;
    let task_hashes = pipeline.task_hashes();
    Ok(ScenarioOutput {
        pipeline,
        masks,
        spawn_locations,
        hash_log,
        task_hashes,
    })
}

fn generate(
    pipeline: &Pipeline,
    params: &MapParameters,
    mode: ExecutionMode,
) -> Result<(TerrainMasks, Vec<Vec2>), ScenarioError> {
    let settings = params.validate()?;
    let size = params.map_size;
    let brushes = brush_library();
    let layer = |name: &str| {
        BooleanMask::builder(pipeline, name)
            .size(size)
            .seed(MaskRng::derive_seed(params.seed, name))
            .symmetry(settings)
            .parallel(mode == ExecutionMode::Pooled)
            .build()
    };

    let land = layer("land")?;
    let mountains = layer("mountains")?;
    let plateaus = layer("plateaus")?;
    let spawns = layer("spawns")?;

    land.randomize(0.2)?
        .blur(2, 0.4)?
        .inflate(2.0)?
        .cut_corners()?
        .remove_areas_smaller_than(size / 4)?
        .fill_gaps(4)?;
    mountains
        .progressive_walk(2, size / 2)?
        .inflate(1.0)?
        .multiply(&land)?;
    plateaus
        .randomize(0.05)?
        .inflate(3.0)?
        .deflate(1.0)?
        .multiply(&land)?
        .subtract(&mountains)?;

    pipeline.start()?;
    pipeline.await_masks(&[&land])?;

    let spawn_points = settings.spawn().num_sym_points();
    let mut spawn_locations = land.random_coordinates(
        size as f32 / 4.0,
        size as f32 / 3.0,
        Some(SymmetryType::Spawn),
    )?;
    spawn_locations.truncate(params.spawn_count / spawn_points);
    log::debug!("Chose {} spawn locations", spawn_locations.len());
    for location in &spawn_locations {
        spawns.fill_circle(location.x, location.y, 4.0, true)?;
    }
    mountains.subtract(&spawns)?;

    let heights = land.copy_as_float_mask(0.0, 1.0)?;
    heights.add_where(&plateaus, 1.5)?.add_where(&mountains, 3.0)?;
    for location in &spawn_locations {
        heights.add_brush(&brushes, *location, "cone", -0.5, 16, false)?;
    }
    heights.blur(2)?.clamp_min(0.0)?;
    let ramps = heights.copy_as_boolean_mask_in_range(0.8, 1.2)?;
    ramps.subtract(&spawns)?;
    let normals = heights.copy_as_normal_mask(4.0)?;

    pipeline.await_all()?;

    let masks = TerrainMasks {
        land,
        mountains,
        plateaus,
        spawns,
        ramps,
        heights,
        normals,
    };
    Ok((masks, spawn_locations))
}
