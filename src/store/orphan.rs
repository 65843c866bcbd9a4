//! Orphan registry: vault files linked but not yet indexed.

use crate::errors::GateError;
use crate::types::{OrphanRow, OrphanStatus};
use std::path::Path;

fn encode(row: &OrphanRow) -> Result<Vec<u8>, GateError> {
    Ok(bincode::serde::encode_to_vec(row, bincode::config::standard())?)
}

fn decode(bytes: &[u8]) -> Result<OrphanRow, GateError> {
    let (row, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(row)
}

/// Adds a pending orphan row. `orphan_path` is UNIQUE; an
/// existing pending row for the same path is left untouched rather than
/// duplicated.
///
/// # Errors
/// Returns a storage error if the tree cannot be scanned or written.
pub fn add(
    tree: &sled::Tree,
    original_source: &Path,
    orphan_path: &Path,
    size: u64,
    now: i64,
) -> Result<u64, GateError> {
    for kv in tree.iter() {
        let (_, v) = kv?;
        let row = decode(&v)?;
        if row.orphan_path == orphan_path {
            return Ok(row.id);
        }
    }
    let id = tree.generate_id()?;
    let row = OrphanRow {
        id,
        original_source: original_source.to_path_buf(),
        orphan_path: orphan_path.to_path_buf(),
        size,
        created_at: now,
        recovered_at: None,
        status: OrphanStatus::Pending,
    };
    tree.insert(id.to_be_bytes(), encode(&row)?)?;
    tree.flush()?;
    Ok(id)
}

/// Lists every row with status `pending`, in ascending id order.
///
/// # Errors
/// Returns a storage error if the tree cannot be scanned.
pub fn list_pending(tree: &sled::Tree) -> Result<Vec<OrphanRow>, GateError> {
    let mut out = Vec::new();
    for kv in tree.iter() {
        let (_, v) = kv?;
        let row = decode(&v)?;
        if matches!(row.status, OrphanStatus::Pending) {
            out.push(row);
        }
    }
    out.sort_by_key(|r| r.id);
    Ok(out)
}

/// Marks a row's status, stamping `recovered_at` on a terminal transition.
///
/// # Errors
/// Returns a storage error if the tree cannot be written.
pub fn mark(tree: &sled::Tree, id: u64, status: OrphanStatus, now: i64) -> Result<(), GateError> {
    let key = id.to_be_bytes();
    if let Some(bytes) = tree.get(key)? {
        let mut row = decode(&bytes)?;
        row.status = status;
        if !matches!(status, OrphanStatus::Pending) {
            row.recovered_at = Some(now);
        }
        tree.insert(key, encode(&row)?)?;
        tree.flush()?;
    }
    Ok(())
}
