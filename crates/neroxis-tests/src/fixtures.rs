//! Parameter fixtures, brushes and logging setup shared by the integration tests.

use std::path::PathBuf;

use neroxis_map::{ConfigError, MapParameters};
use neroxis_mask::{BrushLibrary, FloatGrid, Grid};

/// Parameter files that validate.
pub const VALID_PARAMS: &[&str] = &["point2_duel", "quad_teams", "point6_ffa", "asymmetric"];

/// Parameter files that parse but fail validation.
pub const INVALID_PARAMS: &[&str] = &["invalid_spawn_count", "invalid_divisibility"];

/// Route `log` output through the test harness; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Directory holding the JSON parameter fixtures.
pub fn params_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("params")
}

/// Load and validate `fixtures/params/<name>.json`.
pub fn load_params(name: &str) -> Result<MapParameters, ConfigError> {
    MapParameters::from_file(&params_dir().join(format!("{}.json", name)))
}

/// Every valid parameter fixture, by name.
pub fn valid_params() -> Vec<(&'static str, MapParameters)> {
    VALID_PARAMS
        .iter()
        .map(|&name| {
            let params = load_params(name)
                .unwrap_or_else(|e| panic!("fixture '{}' should be valid: {}", name, e));
            (name, params)
        })
        .collect()
}

/// A cone peaking at 1.0 in the centre and reaching 0.0 at the border.
pub fn cone_brush(size: usize) -> FloatGrid {
    let center = (size as f32 - 1.0) / 2.0;
    let radius = center.max(1.0);
    FloatGrid::from_fn(size, |x, y| {
        let (dx, dy) = (x as f32 - center, y as f32 - center);
        (1.0 - (dx * dx + dy * dy).sqrt() / radius).max(0.0)
    })
}

/// A library holding the `cone` brush used by the scenarios.
pub fn brush_library() -> BrushLibrary {
    let mut library = BrushLibrary::new();
    library
        .insert("cone", cone_brush(33))
        .expect("cone brush is not empty");
    library
}
