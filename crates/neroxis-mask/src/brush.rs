//! Named brush patterns.
//!
//! Brushes are square float grids looked up by name through a [`BrushSource`].
//! Operators resample them to the requested size before stamping.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::grid::{FloatGrid, Grid};
use crate::png::{decode_grayscale, PngError};

/// Errors from brush lookup and loading.
#[derive(Debug, Error)]
pub enum BrushError {
    #[error("unknown brush: '{0}'")]
    NotFound(String),

    #[error("failed to decode brush '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: PngError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("brush '{0}' is empty")]
    Empty(String),
}

/// Lookup of brush patterns by name.
pub trait BrushSource: Send + Sync {
    fn load(&self, name: &str) -> Result<Arc<FloatGrid>, BrushError>;
}

/// In-memory brush collection.
#[derive(Debug, Clone, Default)]
pub struct BrushLibrary {
    brushes: BTreeMap<String, Arc<FloatGrid>>,
}

impl BrushLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a brush under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, brush: FloatGrid) -> Result<(), BrushError> {
        let name = name.into();
        if brush.size() == 0 {
            return Err(BrushError::Empty(name));
        }
        self.brushes.insert(name, Arc::new(brush));
        Ok(())
    }

    /// Decode a PNG brush and register it under `name`.
    pub fn insert_png<R: Read>(&mut self, name: impl Into<String>, reader: R) -> Result<(), BrushError> {
        let name = name.into();
        let brush = decode_grayscale(reader).map_err(|source| BrushError::Decode {
            name: name.clone(),
            source,
        })?;
        self.insert(name, brush)
    }

    /// Load every `*.png` in `dir`, named by file stem.
    pub fn load_dir(dir: &Path) -> Result<Self, BrushError> {
        let mut library = Self::new();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
            .collect();
        paths.sort();

        for path in paths {
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let file = std::fs::File::open(&path)?;
            library.insert_png(name, std::io::BufReader::new(file))?;
        }
        log::debug!("Loaded {} brushes from {}", library.len(), dir.display());
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }

    /// Registered brush names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.brushes.keys().map(String::as_str)
    }
}

impl BrushSource for BrushLibrary {
    fn load(&self, name: &str) -> Result<Arc<FloatGrid>, BrushError> {
        self.brushes
            .get(name)
            .cloned()
            .ok_or_else(|| BrushError::NotFound(name.to_string()))
    }
}

/// Nearest-neighbour coordinate table from `new_size` cells to `old_size` cells.
///
/// The table is mirror symmetric: `map[new - 1 - i] == old - 1 - map[i]`.
pub fn scaling_map(old_size: usize, new_size: usize) -> Vec<usize> {
    let mut map = vec![0; new_size];
    for i in 0..new_size / 2 {
        let source = i * old_size / new_size;
        map[i] = source;
        map[new_size - 1 - i] = old_size - 1 - source;
    }
    if new_size % 2 == 1 {
        map[new_size / 2] = (old_size - 1) / 2;
    }
    map
}

/// Nearest-neighbour resample of a brush to `size`.
pub fn resample(brush: &FloatGrid, size: usize) -> FloatGrid {
    if brush.size() == size {
        return brush.clone();
    }
    let map = scaling_map(brush.size(), size);
    FloatGrid::from_fn(size, |x, y| brush.get(map[x], map[y]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::{encode_image, ImageSource, PngConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scaling_map_is_symmetric() {
        for (old, new) in [(4, 8), (8, 4), (5, 9), (9, 5), (7, 7), (1, 6), (64, 129)] {
            let map = scaling_map(old, new);
            assert_eq!(map.len(), new);
            for i in 0..new {
                assert!(map[i] < old);
                assert_eq!(map[new - 1 - i], old - 1 - map[i], "old={} new={} i={}", old, new, i);
            }
        }
    }

    #[test]
    fn test_scaling_map_upscale() {
        assert_eq!(scaling_map(2, 4), vec![0, 0, 1, 1]);
        assert_eq!(scaling_map(4, 2), vec![0, 3]);
    }

    #[test]
    fn test_resample_preserves_corners() {
        let brush = FloatGrid::from_fn(4, |x, y| (x * 4 + y) as f32);
        let resampled = resample(&brush, 9);
        assert_eq!(resampled.get(0, 0), 0.0);
        assert_eq!(resampled.get(8, 8), 15.0);
    }

    #[test]
    fn test_library_lookup() {
        let mut library = BrushLibrary::new();
        library.insert("round", FloatGrid::new(3)).unwrap();
        assert_eq!(library.load("round").unwrap().size(), 3);
        assert!(matches!(library.load("square"), Err(BrushError::NotFound(_))));
        assert!(matches!(
            library.insert("empty", FloatGrid::new(0)),
            Err(BrushError::Empty(_))
        ));
    }

    #[test]
    fn test_load_dir_reads_png_brushes() {
        let dir = tempfile::tempdir().unwrap();
        let brush = FloatGrid::from_fn(4, |x, _| x as f32);
        let bytes = encode_image(&brush.to_image(), &PngConfig::default()).unwrap();
        std::fs::write(dir.path().join("ridge.png"), bytes).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a brush").unwrap();

        let library = BrushLibrary::load_dir(dir.path()).unwrap();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["ridge"]);
        let loaded = library.load("ridge").unwrap();
        assert_eq!(loaded.get(0, 2), 0.0);
        assert_eq!(loaded.get(3, 2), 1.0);
    }
}
