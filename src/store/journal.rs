//! Move journal: append-only table of move intents.

use crate::errors::GateError;
use crate::types::{JournalPhase, JournalRow};
use std::path::Path;

fn encode(row: &JournalRow) -> Result<Vec<u8>, GateError> {
    Ok(bincode::serde::encode_to_vec(row, bincode::config::standard())?)
}

fn decode(bytes: &[u8]) -> Result<JournalRow, GateError> {
    let (row, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(row)
}

/// Inserts a new row with phase `planned` and returns its id.
///
/// # Errors
/// Returns a storage error if the tree cannot be written.
pub fn plan(tree: &sled::Tree, src: &Path, dst: &Path, size: u64, now: i64) -> Result<u64, GateError> {
    let id = tree.generate_id()?;
    let row = JournalRow {
        id,
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        size,
        created_at: now,
        phase: JournalPhase::Planned,
        completed_at: None,
    };
    tree.insert(id.to_be_bytes(), encode(&row)?)?;
    tree.flush()?;
    Ok(id)
}

/// Transitions a journal row to a new phase in place.
///
/// # Errors
/// Returns a storage error, or silently no-ops if the row no longer exists
/// (it may have been pruned after completion).
pub fn set_phase(tree: &sled::Tree, id: u64, phase: JournalPhase, now: i64) -> Result<(), GateError> {
    let key = id.to_be_bytes();
    if let Some(bytes) = tree.get(key)? {
        let mut row = decode(&bytes)?;
        row.phase = phase;
        if matches!(phase, JournalPhase::Completed | JournalPhase::Failed) {
            row.completed_at = Some(now);
        }
        tree.insert(key, encode(&row)?)?;
        tree.flush()?;
    }
    Ok(())
}

/// Lists every row not in the terminal `completed` phase, in ascending id
/// order — the rows Recovery must resolve.
///
/// # Errors
/// Returns a storage error if the tree cannot be scanned.
pub fn list_unterminated(tree: &sled::Tree) -> Result<Vec<JournalRow>, GateError> {
    let mut out = Vec::new();
    for kv in tree.iter() {
        let (_, v) = kv?;
        let row = decode(&v)?;
        if !matches!(row.phase, JournalPhase::Completed) {
            out.push(row);
        }
    }
    out.sort_by_key(|r| r.id);
    Ok(out)
}

/// Drops a terminal (`completed`) row. Rows in `completed` may be pruned.
///
/// # Errors
/// Returns a storage error if the tree cannot be written.
pub fn prune_completed(tree: &sled::Tree, id: u64) -> Result<(), GateError> {
    tree.remove(id.to_be_bytes())?;
    Ok(())
}
