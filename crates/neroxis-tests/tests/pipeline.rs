//! Pipeline lifecycle, dependency and artifact tests.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p neroxis-tests --test pipeline
//! ```

use std::fs;

use neroxis_map::{Symmetry, SymmetrySettings};
use neroxis_mask::{
    BooleanMask, FloatMask, MaskError, NormalMask, Pipeline, PipelineConfig, PipelineError,
    PngConfig, DIGEST_HEX_LEN,
};
use neroxis_tests::init_logging;
use pretty_assertions::assert_eq;

fn pooled(workers: usize) -> Pipeline {
    Pipeline::new(PipelineConfig::default().with_workers(workers))
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_await_without_start_reports_not_started() {
    init_logging();
    let pipeline = pooled(2);
    let mask = BooleanMask::builder(&pipeline, "land").size(16).build().unwrap();
    mask.randomize(0.5).unwrap();
    assert_eq!(pipeline.pending_tasks(), 1);
    assert_eq!(pipeline.await_masks(&[&mask]), Err(PipelineError::NotStarted));
    assert!(matches!(mask.count(), Err(MaskError::Pipelined { .. })));

    pipeline.start().unwrap();
    assert!(pipeline.is_started());
    assert_eq!(pipeline.start(), Err(PipelineError::AlreadyStarted));
    pipeline.await_masks(&[&mask]).unwrap();
    assert!(mask.is_final());
    pipeline.stop();
    assert!(!pipeline.is_started());
}

#[test]
fn test_work_queued_after_stop_resumes_on_restart() {
    let pipeline = pooled(2);
    let mask = FloatMask::builder(&pipeline, "heights").size(8).build().unwrap();
    mask.fill(1.0).unwrap();
    pipeline.start().unwrap();
    pipeline.await_all().unwrap();
    pipeline.stop();

    mask.add_scalar(2.0).unwrap();
    assert!(!mask.is_final());
    assert_eq!(pipeline.pending_tasks(), 1);

    pipeline.start().unwrap();
    pipeline.await_all().unwrap();
    assert_eq!(mask.sum().unwrap(), 3.0 * 64.0);
    pipeline.stop();
}

#[test]
fn test_reset_discards_pending_work() {
    let pipeline = pooled(1);
    let mask = BooleanMask::builder(&pipeline, "land").size(8).build().unwrap();
    mask.fill(true).unwrap().invert().unwrap();
    assert_eq!(pipeline.pending_tasks(), 2);

    pipeline.reset();
    assert_eq!(pipeline.pending_tasks(), 0);
    assert!(mask.is_final());
    assert_eq!(mask.count().unwrap(), 0);
    assert!(pipeline.hash_log().unwrap().is_empty());
}

// ============================================================================
// Dependencies
// ============================================================================

#[test]
fn test_reads_capture_state_at_enqueue() {
    let pipeline = pooled(4);
    let source = BooleanMask::builder(&pipeline, "source").size(8).build().unwrap();
    let copy = BooleanMask::builder(&pipeline, "copy").size(8).build().unwrap();
    source.fill(true).unwrap();
    copy.init(&source).unwrap();
    source.clear().unwrap();

    pipeline.start().unwrap();
    pipeline.await_masks(&[&copy, &source]).unwrap();
    assert_eq!(copy.count().unwrap(), 64);
    assert_eq!(source.count().unwrap(), 0);
    pipeline.stop();
}

#[test]
fn test_long_dependency_chain() {
    init_logging();
    let pipeline = pooled(4);
    let symmetry = SymmetrySettings::uniform(Symmetry::Point(2));
    let masks: Vec<BooleanMask> = (0..12)
        .map(|i| {
            BooleanMask::builder(&pipeline, format!("layer{}", i))
                .size(24)
                .seed(i)
                .symmetry(symmetry)
                .build()
                .unwrap()
        })
        .collect();
    masks[0].set(0, 0, true).unwrap();
    for i in 1..masks.len() {
        masks[i].set(i as i64, 0, true).unwrap().add(&masks[i - 1]).unwrap();
    }

    pipeline.start().unwrap();
    let last = masks.last().unwrap();
    pipeline.await_masks(&[last]).unwrap();
    assert_eq!(last.count().unwrap(), 24);
    pipeline.await_all().unwrap();
    assert_eq!(pipeline.pending_tasks(), 0);
    pipeline.stop();
}

#[test]
fn test_masks_from_other_pipelines_are_rejected() {
    let first = pooled(1);
    let second = pooled(1);
    let a = BooleanMask::builder(&first, "a").size(8).build().unwrap();
    let b = BooleanMask::builder(&second, "b").size(8).build().unwrap();
    assert!(matches!(a.add(&b), Err(MaskError::InvalidParameter(_))));
    assert!(matches!(a.init(&b), Err(MaskError::InvalidParameter(_))));
    assert_eq!(first.pending_tasks(), 0);
}

#[test]
fn test_contract_violations_fail_at_the_call() {
    let pipeline = pooled(1);
    let point4 = SymmetrySettings::uniform(Symmetry::Point(4));
    let small = BooleanMask::builder(&pipeline, "small").size(8).symmetry(point4).build().unwrap();
    let large = BooleanMask::builder(&pipeline, "large").size(16).symmetry(point4).build().unwrap();
    let plain = BooleanMask::builder(&pipeline, "plain").size(8).build().unwrap();

    let error = small.add(&large).unwrap_err();
    assert_eq!(error.code(), "MASK_001");
    let error = small.multiply(&plain).unwrap_err();
    assert_eq!(error.code(), "MASK_002");
    let error = small.set(8, 0, true).unwrap_err();
    assert_eq!(error.code(), "MASK_003");
    assert_eq!(pipeline.pending_tasks(), 0);
}

// ============================================================================
// Artifacts
// ============================================================================

#[test]
fn test_write_hash_log() {
    init_logging();
    let pipeline = pooled(2);
    let land = BooleanMask::builder(&pipeline, "land").size(32).seed(9).build().unwrap();
    let heights = land.randomize(0.4).unwrap().copy_as_float_mask(0.0, 2.0).unwrap();
    heights.blur(1).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hashes.txt");
    assert!(matches!(
        pipeline.write_hash_log(&path),
        Err(MaskError::Pipelined { op: "hash_log", .. })
    ));

    pipeline.start().unwrap();
    pipeline.await_all().unwrap();
    pipeline.write_hash_log(&path).unwrap();
    pipeline.stop();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("land {}", land.to_hash().unwrap()));
    assert_eq!(lines[1], format!("landtoFloat {}", heights.to_hash().unwrap()));
    for line in lines {
        let (_, digest) = line.split_once(' ').unwrap();
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_dropped_masks_leave_the_hash_log() {
    let pipeline = pooled(1);
    let kept = BooleanMask::builder(&pipeline, "kept").size(4).build().unwrap();
    {
        let _scratch = BooleanMask::builder(&pipeline, "scratch").size(4).build().unwrap();
    }
    let names: Vec<String> = pipeline.hash_log().unwrap().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["kept".to_string()]);
    assert!(kept.is_final());
}

#[test]
fn test_write_png_files() {
    let pipeline = Pipeline::new(PipelineConfig::sequential());
    let land = BooleanMask::builder(&pipeline, "land").size(16).parallel(false).build().unwrap();
    land.fill_circle(8.0, 8.0, 5.0, true).unwrap();
    let heights = land.copy_as_distance_field().unwrap();
    let normals = NormalMask::builder(&pipeline, "normals").size(16).parallel(false).build().unwrap();
    normals.from_height(&heights, 2.0).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = PngConfig::default();
    for (name, result) in [
        ("land.png", land.write_png(&dir.path().join("land.png"), &config)),
        ("heights.png", heights.write_png(&dir.path().join("heights.png"), &config)),
        ("normals.png", normals.write_png(&dir.path().join("normals.png"), &config)),
    ] {
        result.unwrap();
        let bytes = fs::read(dir.path().join(name)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{}", name);
    }
    assert_eq!(
        land.encode_png(&config).unwrap(),
        fs::read(dir.path().join("land.png")).unwrap()
    );
}

#[test]
fn test_pipeline_config_from_json() {
    let config: PipelineConfig =
        serde_json::from_str(r#"{"workers": 2, "hash_masks": false}"#).unwrap();
    assert_eq!(config, PipelineConfig::default().with_workers(2).with_hashing(false));
    let pipeline = Pipeline::new(config);
    assert_eq!(pipeline.config().workers, 2);
}
