//! Map parameter loading and validation tests.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p neroxis-tests --test params
//! ```

use std::fs;

use neroxis_map::{ConfigError, MapParameters, Symmetry, SymmetryError, SymmetryType};
use neroxis_mask::{BooleanMask, Pipeline, PipelineConfig};
use neroxis_tests::fixtures::{load_params, params_dir, valid_params, INVALID_PARAMS, VALID_PARAMS};
use pretty_assertions::assert_eq;

#[test]
fn test_every_fixture_is_listed() {
    let mut on_disk: Vec<String> = fs::read_dir(params_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .map(|path| path.file_stem().unwrap().to_string_lossy().into_owned())
        .collect();
    on_disk.sort();
    let mut listed: Vec<String> = VALID_PARAMS
        .iter()
        .chain(INVALID_PARAMS)
        .map(|name| name.to_string())
        .collect();
    listed.sort();
    assert_eq!(on_disk, listed);
}

#[test]
fn test_valid_fixtures_load() {
    let params = load_params("quad_teams").unwrap();
    assert_eq!(params.seed, 98765);
    assert_eq!(params.map_size, 80);
    assert_eq!(params.terrain_symmetry, Symmetry::Quad);
    assert_eq!(params.spawn_symmetry, Symmetry::Z);

    let settings = params.validate().unwrap();
    assert_eq!(settings.get(SymmetryType::Team), Symmetry::Z);
    assert_eq!(valid_params().len(), VALID_PARAMS.len());
}

#[test]
fn test_missing_symmetries_default_to_none() {
    let params = load_params("asymmetric").unwrap();
    assert_eq!(params, MapParameters::new(7, 48, 3));
    assert!(params.validate().unwrap().is_unconstrained());
}

#[test]
fn test_spawn_count_must_fill_spawn_symmetry() {
    let error = load_params("invalid_spawn_count").unwrap_err();
    assert!(matches!(error, ConfigError::InvalidParameter(_)), "{}", error);
    assert!(error.to_string().contains("spawn_count 3"));
}

#[test]
fn test_team_symmetry_must_divide_terrain() {
    let error = load_params("invalid_divisibility").unwrap_err();
    assert!(
        matches!(
            error,
            ConfigError::Symmetry(SymmetryError::Indivisible { larger_axis: "terrain", .. })
        ),
        "{}",
        error
    );
}

#[test]
fn test_unknown_fields_and_names_are_rejected() {
    let unknown_field = r#"{"seed": 1, "map_size": 64, "spawn_count": 2, "biome": "desert"}"#;
    assert!(matches!(MapParameters::from_json(unknown_field), Err(ConfigError::Json(_))));

    let unknown_symmetry =
        r#"{"seed": 1, "map_size": 64, "spawn_count": 2, "terrain_symmetry": "POINT17"}"#;
    assert!(MapParameters::from_json(unknown_symmetry).is_err());

    let too_large = r#"{"seed": 1, "map_size": 100000, "spawn_count": 2}"#;
    assert!(matches!(
        MapParameters::from_json(too_large),
        Err(ConfigError::InvalidParameter(_))
    ));
}

#[test]
fn test_parameters_round_trip_through_a_file() {
    let params = load_params("point6_ffa").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");
    fs::write(&path, params.to_json_pretty().unwrap()).unwrap();

    let reloaded = MapParameters::from_file(&path).unwrap();
    assert_eq!(reloaded, params);
    assert!(fs::read_to_string(&path).unwrap().contains("\"POINT6\""));
}

#[test]
fn test_settings_drive_mask_symmetry() {
    let params = load_params("point2_duel").unwrap();
    let settings = params.validate().unwrap();
    let pipeline = Pipeline::new(PipelineConfig::sequential());
    let mask = BooleanMask::builder(&pipeline, "land")
        .size(params.map_size)
        .seed(params.seed)
        .symmetry(settings)
        .parallel(false)
        .build()
        .unwrap();
    mask.set(3, 5, true).unwrap();

    let size = params.map_size as i64;
    assert!(mask.get(size - 1 - 3, size - 1 - 5).unwrap());
    assert_eq!(mask.count().unwrap(), 2);
    assert_eq!(mask.symmetry_settings(), settings);
}
