//! Determinism verification for mask pipelines.
//!
//! A run is deterministic when the same parameters and operator sequence give
//! identical mask digests, whether tasks ran inline, on one worker or on many.

use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the reference output.
    pub hash: String,
    /// If non-deterministic, the first difference found.
    pub diff_info: Option<DiffInfo>,
}

/// First byte difference found between runs.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    /// Byte offset where the difference was found.
    pub offset: usize,
    /// Value from the first run, if it had a byte there.
    pub expected: Option<u8>,
    /// Value from the differing run, if it had a byte there.
    pub actual: Option<u8>,
    /// Which run (0-indexed) produced the differing output.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| b.map_or_else(|| "EOF".to_string(), |b| format!("0x{:02X}", b));
        write!(
            f,
            "Difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            show(self.expected),
            show(self.actual),
            self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Run `generate_fn` `runs` times and compare every output with the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = generate_fn();
        if let Some(diff) = first_difference(reference, output.as_ref(), run_index) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                diff_info: Some(diff),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}

fn first_difference(expected: &[u8], actual: &[u8], run_index: usize) -> Option<DiffInfo> {
    let longest = expected.len().max(actual.len());
    (0..longest)
        .find(|&i| expected.get(i) != actual.get(i))
        .map(|offset| DiffInfo {
            offset,
            expected: expected.get(offset).copied(),
            actual: actual.get(offset).copied(),
            run_index,
        })
}

/// A mask whose digest differs between two hash logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskDiff {
    pub mask: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl fmt::Display for MaskDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mask '{}': expected {}, got {}",
            self.mask,
            self.expected.as_deref().unwrap_or("<missing>"),
            self.actual.as_deref().unwrap_or("<missing>")
        )
    }
}

/// Every mask whose digest differs between `expected` and `actual`, by name.
pub fn compare_hash_logs(expected: &[(String, String)], actual: &[(String, String)]) -> Vec<MaskDiff> {
    let lookup = |log: &[(String, String)], name: &str| {
        log.iter().find(|(n, _)| n == name).map(|(_, digest)| digest.clone())
    };
    let mut names: Vec<&str> = expected.iter().chain(actual).map(|(n, _)| n.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .filter_map(|name| {
            let (e, a) = (lookup(expected, name), lookup(actual, name));
            (e != a).then(|| MaskDiff {
                mask: name.to_string(),
                expected: e,
                actual: a,
            })
        })
        .collect()
}

/// Render a hash log the way [`neroxis_mask::Pipeline::write_hash_log`] writes it.
pub fn render_hash_log(log: &[(String, String)]) -> String {
    log.iter()
        .map(|(name, digest)| format!("{} {}\n", name, digest))
        .collect()
}

/// Compare BLAKE3 hashes of multiple runs.
pub fn verify_hash_determinism(hashes: &[String]) -> bool {
    hashes.windows(2).all(|pair| pair[0] == pair[1])
}

/// Compute BLAKE3 hash of data.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
