//! Streaming content fingerprints.
//!
//! Two capabilities, `fringe` and `full`, over the same non-cryptographic
//! family (XXH3): a narrow filter for Tier 2 and a wide decider for Tier 3.
//! Abstracted behind [`Hasher`] so tests can substitute a fake.

mod xxh;

pub use xxh::XxHasher;

use crate::errors::GateError;
use crate::types::{Fingerprint128, ReadStrategy};
use std::path::Path;

/// Capability set required by the pipeline. A real implementation reads the
/// filesystem; a test fake can serve bytes from memory.
pub trait Hasher {
    /// Computes the fringe fingerprint over the first/last `FRINGE_WINDOW`
    /// bytes (or a single sequential read under [`ReadStrategy::SequentialHdd`]),
    /// widened to 128 bits, with the file's size folded in.
    ///
    /// # Errors
    /// Surfaces any I/O error verbatim; never retries.
    fn fringe(&self, path: &Path, size: u64, strategy: ReadStrategy) -> Result<Fingerprint128, GateError>;

    /// Computes the full-content fingerprint, streaming the file in
    /// `FULL_CHUNK`-sized reads.
    ///
    /// # Errors
    /// Surfaces any I/O error verbatim, including a file that shrank below
    /// `expected_size` mid-read.
    fn full(&self, path: &Path, expected_size: u64) -> Result<Fingerprint128, GateError>;
}
