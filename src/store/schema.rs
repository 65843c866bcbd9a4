//! Tree names and the schema-version row.

use crate::errors::GateError;
use crate::types::{ReadStrategy, SCHEMA_VERSION};

pub const TREE_SIZE: &str = "size_index";
pub const TREE_FRINGE: &str = "fringe_index";
pub const TREE_FULL: &str = "full_index";
pub const TREE_JOURNAL: &str = "move_journal";
pub const TREE_ORPHANS: &str = "orphan_registry";
pub const TREE_META: &str = "meta";

const KEY_SCHEMA_VERSION: &[u8] = b"schema_version";
const KEY_READ_STRATEGY: &[u8] = b"read_strategy";

/// Checks (or initializes, on a fresh database) the schema-version row and
/// the read-strategy tag. A mismatch on either is fatal at open, per
/// the on-disk schema and read-strategy invariants.
///
/// # Errors
/// Returns [`GateError::SchemaMismatch`] if an existing database disagrees,
/// or a storage error if the row cannot be read/written.
pub fn check_or_init(meta: &sled::Tree, strategy: ReadStrategy) -> Result<(), GateError> {
    match meta.get(KEY_SCHEMA_VERSION)? {
        None => {
            meta.insert(KEY_SCHEMA_VERSION, &SCHEMA_VERSION.to_le_bytes())?;
            meta.insert(KEY_READ_STRATEGY, &[strategy_tag(strategy)])?;
            meta.flush()?;
            Ok(())
        }
        Some(v) => {
            let found = u32::from_le_bytes(v.as_ref().try_into().map_err(|_| {
                GateError::SchemaMismatch { found: 0, expected: SCHEMA_VERSION }
            })?);
            if found != SCHEMA_VERSION {
                return Err(GateError::SchemaMismatch { found, expected: SCHEMA_VERSION });
            }
            let found_strategy = meta
                .get(KEY_READ_STRATEGY)?
                .map(|v| v.as_ref()[0])
                .unwrap_or_else(|| strategy_tag(strategy));
            if found_strategy != strategy_tag(strategy) {
                // Different, non-interchangeable fingerprint domain.
                return Err(GateError::SchemaMismatch {
                    found: u32::from(found_strategy),
                    expected: u32::from(strategy_tag(strategy)),
                });
            }
            Ok(())
        }
    }
}

fn strategy_tag(s: ReadStrategy) -> u8 {
    match s {
        ReadStrategy::SeekFringe => 0,
        ReadStrategy::SequentialHdd => 1,
    }
}
