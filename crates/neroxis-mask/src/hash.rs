//! Mask fingerprints for regression comparison.
//!
//! A digest covers only the fundamental region of the mask's spawn symmetry,
//! visited column by column, so two masks that agree on their representatives
//! hash the same.

use neroxis_map::Symmetry;

use crate::grid::Grid;

/// Number of hex characters in a mask digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// BLAKE3 of `bytes`, truncated to 16 bytes and hex encoded.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    hash.to_hex()[..DIGEST_HEX_LEN].to_string()
}

/// Digest of a grid's spawn-region contents.
pub fn grid_digest<G: Grid>(grid: &G, spawn_symmetry: Symmetry) -> String {
    let size = grid.size();
    let mut bytes = Vec::with_capacity(8 + size * size);
    bytes.extend_from_slice(&(size as u64).to_le_bytes());
    for (x, y) in spawn_symmetry.region(size).iter() {
        G::write_value_bytes(grid.get(x, y), &mut bytes);
    }
    digest_bytes(&bytes)
}
