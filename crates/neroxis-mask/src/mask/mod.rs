//! Symmetry-aware mask handles.
//!
//! A [`Mask`] is a cheap handle to a grid owned by a [`Pipeline`]. Mutating
//! calls validate their arguments immediately and enqueue the actual work;
//! reads such as [`Mask::get`] or [`Mask::count`] require the mask to be final.

mod boolean;
mod scalar;
mod vector;

pub use boolean::BrushWalk;

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use glam::{Vec2, Vec3, Vec4};
use neroxis_map::{Symmetry, SymmetrySettings, SymmetryType};

use crate::brush::scaling_map;
use crate::error::MaskError;
use crate::grid::{Aggregate, BitGrid, FloatGrid, Grid, IntegerGrid, NormalGrid, VectorGrid};
use crate::hash::grid_digest;
use crate::pipeline::{Fingerprint, MaskId, MaskRef, Pipeline, TaskPlan, TaskSpec};
use crate::png::{encode_image, write_image, Image, ImageSource, PngConfig};
use crate::rng::MaskRng;

pub type BooleanMask = Mask<BitGrid>;
pub type FloatMask = Mask<FloatGrid>;
pub type IntegerMask = Mask<IntegerGrid>;
pub type Vector2Mask = Mask<VectorGrid<Vec2>>;
pub type Vector3Mask = Mask<VectorGrid<Vec3>>;
pub type Vector4Mask = Mask<VectorGrid<Vec4>>;
pub type NormalMask = Mask<NormalGrid>;

/// A queued mutation of one mask.
pub(crate) type Op<G> = Box<dyn FnOnce(&mut MaskData<G>) -> Result<(), MaskError> + Send>;

pub(crate) fn op<G: Grid>(
    f: impl FnOnce(&mut MaskData<G>) -> Result<(), MaskError> + Send + 'static,
) -> Op<G> {
    Box::new(f)
}

/// Grid, random stream and symmetry of a mask; only tasks of the mask touch it.
#[derive(Debug)]
pub(crate) struct MaskData<G: Grid> {
    pub(crate) grid: G,
    pub(crate) rng: MaskRng,
    pub(crate) symmetry: SymmetrySettings,
}

impl<G: Grid> MaskData<G> {
    pub(crate) fn size(&self) -> usize {
        self.grid.size()
    }

    pub(crate) fn symmetry(&self, symmetry_type: SymmetryType) -> Symmetry {
        self.symmetry.get(symmetry_type)
    }

    /// Write `value` to `(x, y)` and every image under `symmetry_type`.
    pub(crate) fn set_orbit(&mut self, symmetry_type: SymmetryType, x: usize, y: usize, value: G::Value) {
        let symmetry = self.symmetry(symmetry_type);
        let size = self.size();
        for (sx, sy) in symmetry.orbit(x, y, size).iter() {
            self.grid.set(sx, sy, value);
        }
    }

    /// Compute a value per region representative and write it to the whole orbit.
    pub(crate) fn fill_with_symmetry(
        &mut self,
        symmetry_type: SymmetryType,
        mut value: impl FnMut(&G, &mut MaskRng, usize, usize) -> G::Value,
    ) {
        let symmetry = self.symmetry(symmetry_type);
        let size = self.size();
        let region = symmetry.region(size);
        let MaskData { grid, rng, .. } = self;
        for (x, y) in region.iter() {
            let v = value(grid, rng, x, y);
            for (sx, sy) in symmetry.orbit(x, y, size).iter() {
                grid.set(sx, sy, v);
            }
        }
    }

    /// Copy each representative's value over its orbit.
    pub(crate) fn apply_symmetry(&mut self, symmetry_type: SymmetryType) {
        self.fill_with_symmetry(symmetry_type, |grid, _, x, y| grid.get(x, y));
    }

    /// Nearest-neighbour resize that keeps the spawn symmetry intact.
    pub(crate) fn resize(&mut self, new_size: usize) {
        let old_size = self.size();
        if old_size == new_size {
            return;
        }
        let old = std::mem::replace(&mut self.grid, G::new(new_size));
        if old_size == 1 {
            self.grid.fill(old.get(0, 0));
            return;
        }
        let map = scaling_map(old_size, new_size);
        self.fill_with_symmetry(SymmetryType::Spawn, |_, _, x, y| old.get(map[x], map[y]));
    }
}

pub(crate) struct MaskCore<G: Grid> {
    id: MaskId,
    name: String,
    seed: u64,
    parallel: bool,
    symmetry: SymmetrySettings,
    pipeline: Pipeline,
    planned_size: AtomicUsize,
    data: Mutex<MaskData<G>>,
}

impl<G: Grid> MaskCore<G> {
    pub(crate) fn lock(&self) -> MutexGuard<'_, MaskData<G>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current grid.
    pub(crate) fn snapshot(&self) -> G {
        self.lock().grid.clone()
    }

    fn run(&self, op: Op<G>, hash: bool) -> Result<Option<String>, MaskError> {
        let mut data = self.lock();
        op(&mut data)?;
        Ok(hash.then(|| grid_digest(&data.grid, data.symmetry.spawn())))
    }
}

impl<G: Grid> Fingerprint for MaskCore<G> {
    fn fingerprint(&self) -> String {
        let data = self.lock();
        grid_digest(&data.grid, data.symmetry.spawn())
    }
}

/// Builder for masks registered with a pipeline.
pub struct MaskBuilder<'a, G: Grid> {
    pipeline: &'a Pipeline,
    name: String,
    size: usize,
    seed: u64,
    symmetry: SymmetrySettings,
    parallel: bool,
    _grid: PhantomData<fn() -> G>,
}

impl<'a, G: Grid> MaskBuilder<'a, G> {
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn symmetry(mut self, symmetry: SymmetrySettings) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Whether operations may wait for the worker pool; defaults to `true`.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<Mask<G>, MaskError> {
        if self.size == 0 {
            return Err(MaskError::invalid(format!(
                "mask '{}' must have a size of at least 1",
                self.name
            )));
        }
        let symmetry = if G::SYMMETRIC {
            self.symmetry
        } else {
            SymmetrySettings::none()
        };

        let core = Arc::new(MaskCore {
            id: MaskId::next(),
            name: self.name,
            seed: self.seed,
            parallel: self.parallel,
            symmetry,
            pipeline: self.pipeline.clone(),
            planned_size: AtomicUsize::new(self.size),
            data: Mutex::new(MaskData {
                grid: G::new(self.size),
                rng: MaskRng::new(self.seed),
                symmetry,
            }),
        });
        let handle: Weak<MaskCore<G>> = Arc::downgrade(&core);
        self.pipeline.register(core.id, &core.name, handle);
        log::trace!(
            "Created {} mask '{}' {} (size {}, seed {}, symmetry {})",
            G::KIND,
            core.name,
            core.id,
            self.size,
            core.seed,
            symmetry
        );
        Ok(Mask { core })
    }
}

/// Handle to a pipelined grid; clones share the same mask.
pub struct Mask<G: Grid> {
    core: Arc<MaskCore<G>>,
}

impl<G: Grid> Clone for Mask<G> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<G: Grid> fmt::Debug for Mask<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("kind", &G::KIND)
            .field("name", &self.core.name)
            .field("id", &self.core.id)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

impl<G: Grid> MaskRef for Mask<G> {
    fn mask_id(&self) -> MaskId {
        self.core.id
    }

    fn mask_name(&self) -> &str {
        &self.core.name
    }
}

impl<G: Grid> Mask<G> {
    pub fn builder<'a>(pipeline: &'a Pipeline, name: impl Into<String>) -> MaskBuilder<'a, G> {
        MaskBuilder {
            pipeline,
            name: name.into(),
            size: 0,
            seed: 0,
            symmetry: SymmetrySettings::none(),
            parallel: true,
            _grid: PhantomData,
        }
    }

    pub fn id(&self) -> MaskId {
        self.core.id
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn seed(&self) -> u64 {
        self.core.seed
    }

    /// Size after every enqueued operation has run.
    pub fn size(&self) -> usize {
        self.core.planned_size.load(Ordering::Acquire)
    }

    pub fn symmetry_settings(&self) -> SymmetrySettings {
        self.core.symmetry
    }

    pub fn is_parallel(&self) -> bool {
        self.core.parallel
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.core.pipeline
    }

    /// Whether every enqueued operation has executed.
    pub fn is_final(&self) -> bool {
        !self.core.pipeline.has_pending(self.core.id)
    }

    pub(crate) fn core(&self) -> &Arc<MaskCore<G>> {
        &self.core
    }

    /// Lock the data of a final mask.
    pub(crate) fn final_data(&self, op: &'static str) -> Result<MutexGuard<'_, MaskData<G>>, MaskError> {
        if !self.is_final() {
            return Err(MaskError::Pipelined {
                mask: self.core.name.clone(),
                op,
            });
        }
        Ok(self.core.lock())
    }

    /// Fail unless `other` can be combined into this mask.
    ///
    /// Sizes must match, and the symmetry settings must be equal unless this
    /// mask is unconstrained.
    pub fn check_compatible<H: Grid>(&self, other: &Mask<H>) -> Result<(), MaskError> {
        self.check_same_pipeline(other)?;
        let (size, other_size) = (self.size(), other.size());
        if size != other_size {
            return Err(MaskError::SizeMismatch {
                expected: size,
                actual: other_size,
            });
        }
        let symmetry = self.symmetry_settings();
        if symmetry != other.symmetry_settings() && !symmetry.is_unconstrained() {
            return Err(MaskError::IncompatibleSymmetry {
                mask: self.core.name.clone(),
                other: other.core.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_same_pipeline<H: Grid>(&self, other: &Mask<H>) -> Result<(), MaskError> {
        if !self.core.pipeline.same_as(other.pipeline()) {
            return Err(MaskError::invalid(format!(
                "mask '{}' belongs to a different pipeline than mask '{}'",
                other.core.name, self.core.name
            )));
        }
        Ok(())
    }

    pub(crate) fn check_bounds(&self, x: i64, y: i64) -> Result<(usize, usize), MaskError> {
        let size = self.size();
        if x < 0 || y < 0 || x >= size as i64 || y >= size as i64 {
            return Err(MaskError::OutOfBounds { x, y, size });
        }
        Ok((x as usize, y as usize))
    }

    /// Plan and enqueue one operation on this mask.
    pub(crate) fn schedule<F>(&self, label: &'static str, plan: F) -> Result<&Self, MaskError>
    where
        F: FnOnce(&mut TaskPlan<'_>) -> Result<Op<G>, MaskError>,
    {
        let pipeline = &self.core.pipeline;
        let mut task_plan = pipeline.plan(self.core.id);
        let op = plan(&mut task_plan)?;
        let core = Arc::clone(&self.core);
        let hash = pipeline.config().hash_masks;
        let spec = TaskSpec {
            label,
            mask: self.core.name.clone(),
            parallel: self.core.parallel,
        };
        pipeline.submit(task_plan, spec, Box::new(move || core.run(op, hash)))?;
        Ok(self)
    }

    /// Enqueue an operation with no mask inputs.
    pub(crate) fn update(
        &self,
        label: &'static str,
        f: impl FnOnce(&mut MaskData<G>) -> Result<(), MaskError> + Send + 'static,
    ) -> Result<&Self, MaskError> {
        self.schedule(label, |_| Ok(op(f)))
    }

    /// Enqueue an operation reading one compatible mask.
    pub(crate) fn update_with<D: Grid>(
        &self,
        label: &'static str,
        other: &Mask<D>,
        f: impl FnOnce(&mut MaskData<G>, &D) -> Result<(), MaskError> + Send + 'static,
    ) -> Result<&Self, MaskError> {
        self.check_compatible(other)?;
        self.schedule(label, |plan| {
            let source = plan.read(other);
            Ok(op(move |data| f(data, source.get()?)))
        })
    }

    /// A new mask in the same pipeline named `<name><suffix>`, with a seed
    /// derived from this mask's seed and the child name.
    pub(crate) fn child<H: Grid>(&self, suffix: &str) -> Result<Mask<H>, MaskError> {
        let name = format!("{}{}", self.core.name, suffix);
        let seed = MaskRng::derive_seed(self.core.seed, &name);
        Mask::<H>::builder(&self.core.pipeline, name)
            .size(self.size())
            .seed(seed)
            .symmetry(self.core.symmetry)
            .parallel(self.core.parallel)
            .build()
    }

    /// A child mask whose grid is computed from this mask's grid.
    pub(crate) fn derive<H: Grid>(
        &self,
        suffix: &str,
        label: &'static str,
        convert: impl FnOnce(&G) -> H + Send + 'static,
    ) -> Result<Mask<H>, MaskError> {
        let child = self.child::<H>(suffix)?;
        child.schedule(label, |plan| {
            let source = plan.read(self);
            Ok(op(move |data: &mut MaskData<H>| {
                data.grid = convert(source.get()?);
                Ok(())
            }))
        })?;
        Ok(child)
    }

    /// Value at `(x, y)` of a final mask.
    pub fn get(&self, x: i64, y: i64) -> Result<G::Value, MaskError> {
        let data = self.final_data("get")?;
        if !data.grid.in_bounds(x, y) {
            return Err(MaskError::OutOfBounds {
                x,
                y,
                size: data.size(),
            });
        }
        Ok(data.grid.get(x as usize, y as usize))
    }

    /// Set `(x, y)` and its terrain-symmetry images.
    pub fn set(&self, x: i64, y: i64, value: G::Value) -> Result<&Self, MaskError> {
        let (x, y) = self.check_bounds(x, y)?;
        self.update("set", move |data| {
            data.set_orbit(SymmetryType::Terrain, x, y, value);
            Ok(())
        })
    }

    pub fn fill(&self, value: G::Value) -> Result<&Self, MaskError> {
        self.update("fill", move |data| {
            data.grid.fill(value);
            Ok(())
        })
    }

    /// Reset every cell to the default value.
    pub fn clear(&self) -> Result<&Self, MaskError> {
        self.fill(G::default_value())
    }

    /// Replace the contents (and size) with those of `other`.
    pub fn init(&self, other: &Mask<G>) -> Result<&Self, MaskError> {
        self.check_same_pipeline(other)?;
        let symmetry = self.symmetry_settings();
        if symmetry != other.symmetry_settings() && !symmetry.is_unconstrained() {
            return Err(MaskError::IncompatibleSymmetry {
                mask: self.core.name.clone(),
                other: other.core.name.clone(),
            });
        }
        self.core.planned_size.store(other.size(), Ordering::Release);
        self.schedule("init", |plan| {
            let source = plan.read(other);
            Ok(op(move |data| {
                data.grid = source.get()?.clone();
                Ok(())
            }))
        })
    }

    /// A new mask holding a copy of this one, named `<name>Copy`.
    pub fn copy(&self) -> Result<Mask<G>, MaskError> {
        self.copy_named("Copy")
    }

    /// A new mask holding a copy of this one, named `<name><suffix>`.
    pub fn copy_named(&self, suffix: &str) -> Result<Mask<G>, MaskError> {
        self.derive(suffix, "copy", |grid: &G| grid.clone())
    }

    /// Resample to `size` with a symmetric nearest-neighbour map.
    pub fn set_size(&self, size: usize) -> Result<&Self, MaskError> {
        if size == 0 {
            return Err(MaskError::invalid("mask size must be at least 1"));
        }
        self.core.planned_size.store(size, Ordering::Release);
        self.update("set_size", move |data| {
            data.resize(size);
            Ok(())
        })
    }

    /// Overwrite every orbit under `symmetry_type` with its representative.
    pub fn apply_symmetry(&self, symmetry_type: SymmetryType) -> Result<&Self, MaskError> {
        self.update("apply_symmetry", move |data| {
            data.apply_symmetry(symmetry_type);
            Ok(())
        })
    }

    /// Copy of the fully materialized grid.
    pub fn final_mask(&self) -> Result<G, MaskError> {
        Ok(self.final_data("final_mask")?.grid.clone())
    }

    /// Digest of the spawn-symmetry region (32 hex characters).
    pub fn to_hash(&self) -> Result<String, MaskError> {
        let data = self.final_data("to_hash")?;
        Ok(grid_digest(&data.grid, data.symmetry.spawn()))
    }
}

impl<G: Aggregate> Mask<G> {
    pub fn count(&self) -> Result<usize, MaskError> {
        self.final_data("count")?.grid.count()
    }

    pub fn sum(&self) -> Result<f64, MaskError> {
        self.final_data("sum")?.grid.sum()
    }

    pub fn min(&self) -> Result<G::Value, MaskError> {
        self.final_data("min")?.grid.min()
    }

    pub fn max(&self) -> Result<G::Value, MaskError> {
        self.final_data("max")?.grid.max()
    }

    pub fn average(&self) -> Result<f64, MaskError> {
        self.final_data("average")?.grid.average()
    }
}

impl<G: Grid + ImageSource> Mask<G> {
    pub fn to_image(&self) -> Result<Image, MaskError> {
        Ok(self.final_data("to_image")?.grid.to_image())
    }

    pub fn encode_png(&self, config: &PngConfig) -> Result<Vec<u8>, MaskError> {
        Ok(encode_image(&self.to_image()?, config)?)
    }

    pub fn write_png(&self, path: &Path, config: &PngConfig) -> Result<(), MaskError> {
        write_image(&self.to_image()?, path, config)?;
        log::debug!("Wrote mask '{}' to {}", self.name(), path.display());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::PipelineConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_rejects_zero_size() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let result = BooleanMask::builder(&pipeline, "empty").build();
        assert!(matches!(result, Err(MaskError::InvalidParameter(_))));
    }

    #[test]
    fn test_normal_mask_ignores_symmetry() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let normals = NormalMask::builder(&pipeline, "normals")
            .size(8)
            .symmetry(SymmetrySettings::uniform(Symmetry::Point(4)))
            .build()
            .unwrap();
        assert!(normals.symmetry_settings().is_unconstrained());
    }

    #[test]
    fn test_set_writes_terrain_orbit() {
        let mask: BooleanMask = inline_mask(8, SymmetrySettings::uniform(Symmetry::Point(4)));
        mask.set(1, 2, true).unwrap();
        assert_eq!(mask.count().unwrap(), 4);
        assert!(mask.get(6, 5).unwrap());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let mask: FloatMask = inline_mask(4, SymmetrySettings::none());
        assert!(matches!(
            mask.get(4, 0),
            Err(MaskError::OutOfBounds { x: 4, y: 0, size: 4 })
        ));
        assert!(matches!(mask.set(-1, 0, 1.0), Err(MaskError::OutOfBounds { .. })));
    }

    #[test]
    fn test_compatibility_checks() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let point2 = SymmetrySettings::uniform(Symmetry::Point(2));
        let a = FloatMask::builder(&pipeline, "a").size(8).symmetry(point2).build().unwrap();
        let b = FloatMask::builder(&pipeline, "b").size(16).symmetry(point2).build().unwrap();
        let c = FloatMask::builder(&pipeline, "c").size(8).build().unwrap();
        assert!(matches!(
            a.check_compatible(&b),
            Err(MaskError::SizeMismatch { expected: 8, actual: 16 })
        ));
        assert!(matches!(
            a.check_compatible(&c),
            Err(MaskError::IncompatibleSymmetry { .. })
        ));
        assert!(c.check_compatible(&a).is_ok());
    }

    #[test]
    fn test_set_size_keeps_spawn_symmetry() {
        let symmetry = SymmetrySettings::uniform(Symmetry::Quad);
        let mask: BooleanMask = inline_mask(8, symmetry);
        mask.set(1, 2, true).unwrap().set(3, 0, true).unwrap();
        mask.set_size(13).unwrap();
        assert_eq!(mask.size(), 13);
        let grid = mask.final_mask().unwrap();
        assert_eq!(grid.size(), 13);
        assert_symmetric(&grid, Symmetry::Quad);
        assert!(grid.count_ones() > 0);
    }

    #[test]
    fn test_set_size_from_single_cell() {
        let mask: FloatMask = inline_mask(1, SymmetrySettings::none());
        mask.fill(2.5).unwrap().set_size(5).unwrap();
        assert_eq!(mask.min().unwrap(), 2.5);
        assert_eq!(mask.max().unwrap(), 2.5);
    }

    #[test]
    fn test_copy_is_independent() {
        let mask: IntegerMask = inline_mask(4, SymmetrySettings::none());
        mask.fill(3).unwrap();
        let copy = mask.copy().unwrap();
        mask.fill(5).unwrap();
        assert_eq!(copy.name(), "testCopy");
        assert_eq!(copy.sum().unwrap(), 48.0);
        assert_eq!(mask.sum().unwrap(), 80.0);
        assert_ne!(copy.seed(), mask.seed());
    }

    #[test]
    fn test_init_adopts_size() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let small = FloatMask::builder(&pipeline, "small").size(4).parallel(false).build().unwrap();
        let large = FloatMask::builder(&pipeline, "large").size(9).parallel(false).build().unwrap();
        small.fill(1.0).unwrap();
        large.init(&small).unwrap();
        assert_eq!(large.size(), 4);
        assert_eq!(large.sum().unwrap(), 16.0);
    }

    #[test]
    fn test_apply_symmetry_mirrors_region() {
        let mask: IntegerMask = inline_mask(6, SymmetrySettings::uniform(Symmetry::X));
        mask.update("raw", |data| {
            data.grid.set(0, 0, 9);
            Ok(())
        })
        .unwrap();
        assert_eq!(mask.get(5, 0).unwrap(), 0);
        mask.apply_symmetry(SymmetryType::Terrain).unwrap();
        assert_eq!(mask.get(5, 0).unwrap(), 9);
    }

    #[test]
    fn test_hash_is_stable_per_seed() {
        let first: BooleanMask = inline_mask(32, SymmetrySettings::none());
        let second: BooleanMask = inline_mask(32, SymmetrySettings::none());
        first.randomize(0.3).unwrap();
        second.randomize(0.3).unwrap();
        assert_eq!(first.to_hash().unwrap(), second.to_hash().unwrap());
        assert_eq!(first.to_hash().unwrap().len(), crate::hash::DIGEST_HEX_LEN);
    }

    #[test]
    fn test_queued_failure_aborts_run() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let mask = FloatMask::builder(&pipeline, "broken").size(4).build().unwrap();
        mask.update("explode", |_| Err(MaskError::invalid("boom"))).unwrap();
        mask.fill(1.0).unwrap();
        pipeline.start().unwrap();
        let error = pipeline.await_masks(&[&mask]).unwrap_err();
        assert!(matches!(
            &error,
            PipelineError::TaskFailed { label: "explode", mask, .. } if mask == "broken"
        ));
        assert_eq!(error.code(), "PIPELINE_001");
        assert_eq!(pipeline.await_all(), Err(error));
        pipeline.stop();
    }

    #[test]
    fn test_queued_panic_is_reported() {
        let pipeline = Pipeline::new(PipelineConfig::default().with_workers(2));
        let mask = IntegerMask::builder(&pipeline, "panicky").size(4).build().unwrap();
        mask.update("panic", |_| panic!("worker blew up")).unwrap();
        pipeline.start().unwrap();
        match pipeline.await_all() {
            Err(PipelineError::TaskPanicked { message, .. }) => assert_eq!(message, "worker blew up"),
            other => panic!("expected a panic report, got {:?}", other),
        }
        pipeline.stop();
    }

    #[test]
    fn test_inline_panic_is_returned_to_the_caller() {
        let mask: IntegerMask = inline_mask(4, SymmetrySettings::none());
        let error = mask.update("panic", |_| panic!("inline blew up")).unwrap_err();
        match error {
            MaskError::Pipeline(PipelineError::TaskPanicked { label, mask: name, message, .. }) => {
                assert_eq!(label, "panic");
                assert_eq!(name, "test");
                assert_eq!(message, "inline blew up");
            }
            other => panic!("expected a panic report, got {:?}", other),
        }
        mask.fill(3).unwrap();
        assert_eq!(mask.sum().unwrap(), 48.0);
    }

    #[test]
    fn test_aggregate_on_pipelined_mask() {
        let pipeline = Pipeline::new(PipelineConfig::sequential());
        let mask = BooleanMask::builder(&pipeline, "land").size(8).build().unwrap();
        mask.randomize(0.5).unwrap();
        assert!(!mask.is_final());
        assert!(matches!(mask.count(), Err(MaskError::Pipelined { op: "count", .. })));
        assert_eq!(pipeline.await_masks(&[&mask]), Err(PipelineError::NotStarted));
        pipeline.start().unwrap();
        pipeline.await_masks(&[&mask]).unwrap();
        assert!(mask.count().is_ok());
        pipeline.stop();
    }

    #[test]
    fn test_encode_png() {
        let mask: BooleanMask = inline_mask(8, SymmetrySettings::none());
        mask.set(2, 2, true).unwrap();
        let bytes = mask.encode_png(&PngConfig::default()).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
