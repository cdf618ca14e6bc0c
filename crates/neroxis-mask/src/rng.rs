//! Deterministic per-mask RNG using PCG32.
//!
//! Every mask owns one stream seeded from its own seed, so results never depend
//! on how the pipeline interleaves tasks of different masks.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Wrapper around PCG32 for deterministic random number generation.
#[derive(Clone)]
pub struct MaskRng {
    inner: Pcg32,
}

impl MaskRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Derive the seed of a named child mask using BLAKE3.
    pub fn derive_seed(base_seed: u64, name: &str) -> u64 {
        let mut input = Vec::with_capacity(8 + name.len());
        input.extend_from_slice(&base_seed.to_le_bytes());
        input.extend_from_slice(name.as_bytes());
        let hash = blake3::hash(&input);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[0..8]);
        u64::from_le_bytes(bytes)
    }

    /// Generate a random f32 in the range [0.0, 1.0).
    #[inline]
    pub fn gen_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Generate a random f64 in the range [0.0, 1.0).
    #[inline]
    pub fn gen_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Generate a random f32 in the range [-1.0, 1.0).
    #[inline]
    pub fn gen_signed_f32(&mut self) -> f32 {
        self.gen_f32() * 2.0 - 1.0
    }

    #[inline]
    pub fn gen_bool(&mut self) -> bool {
        self.inner.gen::<bool>()
    }

    #[inline]
    pub fn gen_u64(&mut self) -> u64 {
        self.inner.gen::<u64>()
    }

    /// Generate a random value in the given range.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// Random index into a collection of `len` elements; `len` must be non-zero.
    #[inline]
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}

impl fmt::Debug for MaskRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskRng").finish_non_exhaustive()
    }
}
