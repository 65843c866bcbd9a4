//! Core data-model types shared across the hasher, index store, move engine,
//! recovery, and pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A 128-bit content fingerprint, stored and compared as an opaque byte
/// string. Used for both the fringe fingerprint and the full-content
/// fingerprint: the store never interprets its bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint128(pub [u8; 16]);

impl Fingerprint128 {
    #[must_use]
    pub fn widen_u64(v: u64) -> Self {
        let mut buf = [0u8; 16];
        buf[8..].copy_from_slice(&v.to_be_bytes());
        Fingerprint128(buf)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// 32-hex-character rendering, used as the vault identifier for tier-3 moves.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Fingerprint128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint128({})", self.to_hex())
    }
}

/// The tier at which a decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    /// `stat` failed, or size was zero.
    Stat = 0,
    /// Decided on size-index absence.
    Size = 1,
    /// Decided on fringe-index absence.
    Fringe = 2,
    /// Decided on full-content-index lookup (hit or miss).
    Full = 3,
}

/// The outcome of processing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    Unique,
    Duplicate,
    Skipped,
}

/// The per-file decision record returned by the pipeline, with stable
/// field names for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub result: DecisionKind,
    pub tier: Tier,
    pub original_path: PathBuf,
    pub stored_path: Option<PathBuf>,
    pub duplicate_of: Option<PathBuf>,
    pub error: Option<String>,
}

impl Decision {
    #[must_use]
    pub fn skipped(tier: Tier, original_path: PathBuf, error: impl Into<String>) -> Self {
        Decision {
            result: DecisionKind::Skipped,
            tier,
            original_path,
            stored_path: None,
            duplicate_of: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn duplicate(tier: Tier, original_path: PathBuf, duplicate_of: PathBuf) -> Self {
        Decision {
            result: DecisionKind::Duplicate,
            tier,
            original_path,
            stored_path: None,
            duplicate_of: Some(duplicate_of),
            error: None,
        }
    }

    #[must_use]
    pub fn unique(tier: Tier, original_path: PathBuf, stored_path: PathBuf) -> Self {
        Decision {
            result: DecisionKind::Unique,
            tier,
            original_path,
            stored_path: Some(stored_path),
            duplicate_of: None,
            error: None,
        }
    }
}

/// Phase lifecycle of a move-journal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalPhase {
    Planned,
    Moving,
    Completed,
    Failed,
}

/// One row of the move journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRow {
    pub id: u64,
    pub src: PathBuf,
    pub dst: PathBuf,
    pub size: u64,
    pub created_at: i64,
    pub phase: JournalPhase,
    pub completed_at: Option<i64>,
}

/// Status of an orphan-registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrphanStatus {
    Pending,
    Recovered,
    Failed,
}

/// One row of the orphan registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanRow {
    pub id: u64,
    pub original_source: PathBuf,
    pub orphan_path: PathBuf,
    pub size: u64,
    pub created_at: i64,
    pub recovered_at: Option<i64>,
    pub status: OrphanStatus,
}

/// Fingerprint domain selected at database-open time. A database opened in
/// one mode rejects a request to open it in the other, because the fringe
/// fingerprint's byte domain differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadStrategy {
    /// First-W + last-W seek-based fringe reader (default).
    SeekFringe,
    /// Single sequential read of the first 2W bytes (HDD-optimized).
    SequentialHdd,
}

pub const FRINGE_WINDOW: u64 = 64 * 1024;
pub const FULL_CHUNK: usize = 256 * 1024;
pub const SCHEMA_VERSION: u32 = 1;
