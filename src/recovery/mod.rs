//! Startup recovery: resolves every non-terminal journal row and every
//! pending orphan row. Idempotent by construction: re-running converges
//! without moving files that are already in their correct state.

use crate::fsutil;
use crate::store::IndexStore;
use crate::types::{JournalPhase, JournalRow, OrphanStatus};
use std::fs;
use std::path::Path;

/// Runs recovery once, before the first file is processed in a session.
///
/// # Errors
/// Returns a storage error if the journal or orphan tables cannot be read
/// or written. Filesystem failures encountered while reconciling individual
/// rows are swallowed into a `failed`/pending orphan row rather than
/// aborting the whole pass, so one bad row never blocks recovery of the
/// rest.
pub fn run(store: &dyn IndexStore) -> Result<(), crate::errors::GateError> {
    for row in store.journal_list_unterminated()? {
        reconcile_journal_row(store, &row)?;
    }
    for row in store.orphan_list_pending()? {
        reconcile_orphan(store, row.id, &row.original_source, &row.orphan_path)?;
    }
    Ok(())
}

fn reconcile_journal_row(store: &dyn IndexStore, row: &JournalRow) -> Result<(), crate::errors::GateError> {
    match row.phase {
        // A crash can land between the link (step 5) and the commit that
        // promotes this row to `moving` (step 7), so a `planned` row may
        // still have created the link on disk. `reconcile_moving` checks
        // the filesystem rather than trusting the phase, so it handles
        // both the "link never happened" and "link happened, promote
        // didn't commit" cases identically.
        JournalPhase::Planned | JournalPhase::Moving => {
            reconcile_moving(store, row.id, &row.src, &row.dst)?;
            store.journal_set_phase(row.id, JournalPhase::Failed)
        }
        JournalPhase::Completed | JournalPhase::Failed => Ok(()),
    }
}

/// Returns the filesystem to its pre-attempt state: the index row for this
/// move was never written, so completing the move would leave the vault
/// holding a file no index references.
fn reconcile_moving(
    store: &dyn IndexStore,
    journal_id: u64,
    src: &Path,
    dst: &Path,
) -> Result<(), crate::errors::GateError> {
    let src_exists = src.exists();
    let dst_exists = dst.exists();

    if src_exists && dst_exists {
        if fs::remove_file(dst).is_ok()
            && let Some(parent) = dst.parent()
        {
            let _ = fsutil::fsync_dir(parent);
        }
        return Ok(());
    }

    if !src_exists && dst_exists {
        match fs::hard_link(dst, src) {
            Ok(()) => {
                if let Some(parent) = src.parent() {
                    let _ = fsutil::fsync_dir(parent);
                }
            }
            Err(_) => {
                // Best-effort relink failed: record the vault copy as a
                // pending orphan for manual recovery rather than lose it.
                store.orphan_add(src, dst, 0)?;
            }
        }
        return Ok(());
    }

    // Neither exists, or only src exists: nothing left to reconcile.
    let _ = journal_id;
    Ok(())
}

fn reconcile_orphan(
    store: &dyn IndexStore,
    id: u64,
    original_source: &Path,
    orphan_path: &Path,
) -> Result<(), crate::errors::GateError> {
    let src_exists = original_source.exists();
    let dst_exists = orphan_path.exists();

    if !dst_exists {
        // The vault copy is already gone; nothing further to reconcile.
        return store.orphan_mark(id, OrphanStatus::Recovered);
    }

    if src_exists {
        // Both copies exist and the index was never updated for this file:
        // the vault copy is an untracked duplicate. Remove it, mirroring
        // `reconcile_moving`'s handling of the equivalent journal-`moving`
        // case, and leave the source as the file of record.
        if fs::remove_file(orphan_path).is_ok()
            && let Some(parent) = orphan_path.parent()
        {
            let _ = fsutil::fsync_dir(parent);
        }
        return store.orphan_mark(id, OrphanStatus::Recovered);
    }

    // Source is gone and only the vault copy survives: relink it back to
    // the source path, best-effort, mirroring `reconcile_moving`. If the
    // relink fails, leave the row `pending` for an operator (or a future
    // index-rebuild tool) to resolve.
    match fs::hard_link(orphan_path, original_source) {
        Ok(()) => {
            if let Some(parent) = original_source.parent() {
                let _ = fsutil::fsync_dir(parent);
            }
            store.orphan_mark(id, OrphanStatus::Recovered)
        }
        Err(_) => store.orphan_mark(id, OrphanStatus::Pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IndexStore, SledIndexStore};
    use crate::test_support::{temp_db_dir, temp_vault_dir, write_file};
    use crate::types::ReadStrategy;

    #[test]
    fn reconcile_moving_rolls_back_when_both_copies_exist() {
        let db_dir = temp_db_dir("recovery_unit");
        let vault = temp_vault_dir("recovery_unit_vault");
        let store = SledIndexStore::open(&db_dir, ReadStrategy::SeekFringe).unwrap();

        let src = write_file(&vault, "src.bin", b"content");
        let dst = vault.join("dst.bin");
        fs::hard_link(&src, &dst).unwrap();

        reconcile_moving(&store, 1, &src, &dst).unwrap();

        assert!(src.exists());
        assert!(!dst.exists(), "untracked vault copy should be rolled back");
    }

    #[test]
    fn reconcile_moving_relinks_when_only_dst_survives() {
        let db_dir = temp_db_dir("recovery_unit");
        let vault = temp_vault_dir("recovery_unit_vault");
        let store = SledIndexStore::open(&db_dir, ReadStrategy::SeekFringe).unwrap();

        let dst = write_file(&vault, "dst.bin", b"content");
        let src = vault.join("src.bin");

        reconcile_moving(&store, 1, &src, &dst).unwrap();

        assert!(src.exists(), "source should be relinked from the surviving vault copy");
    }

    #[test]
    fn reconcile_journal_row_treats_planned_like_moving() {
        let db_dir = temp_db_dir("recovery_unit");
        let vault = temp_vault_dir("recovery_unit_vault");
        let store = SledIndexStore::open(&db_dir, ReadStrategy::SeekFringe).unwrap();

        // Simulates a crash between creating the link and committing the
        // phase transition to `moving`: the row is still `planned` but the
        // link already exists on disk.
        let src = write_file(&vault, "src.bin", b"content");
        let dst = vault.join("dst.bin");
        fs::hard_link(&src, &dst).unwrap();
        let id = store.journal_plan(&src, &dst, 7).unwrap();

        let row = store
            .journal_list_unterminated()
            .unwrap()
            .into_iter()
            .find(|r| r.id == id)
            .unwrap();
        reconcile_journal_row(&store, &row).unwrap();

        assert!(src.exists());
        assert!(!dst.exists(), "link created before the crash must be rolled back");
        assert!(store.journal_list_unterminated().unwrap().is_empty());
    }

    #[test]
    fn reconcile_orphan_removes_untracked_vault_copy_when_source_survives() {
        let db_dir = temp_db_dir("recovery_unit");
        let vault = temp_vault_dir("recovery_unit_vault");
        let store = SledIndexStore::open(&db_dir, ReadStrategy::SeekFringe).unwrap();

        let src = write_file(&vault, "src.bin", b"content");
        let orphan_path = vault.join("vault_copy.bin");
        fs::hard_link(&src, &orphan_path).unwrap();
        let id = store.orphan_add(&src, &orphan_path, 7).unwrap();

        reconcile_orphan(&store, id, &src, &orphan_path).unwrap();

        assert!(src.exists());
        assert!(!orphan_path.exists());
        assert!(store.orphan_list_pending().unwrap().is_empty());
    }

    #[test]
    fn reconcile_orphan_relinks_source_when_only_vault_copy_survives() {
        let db_dir = temp_db_dir("recovery_unit");
        let vault = temp_vault_dir("recovery_unit_vault");
        let store = SledIndexStore::open(&db_dir, ReadStrategy::SeekFringe).unwrap();

        let orphan_path = write_file(&vault, "vault_copy.bin", b"content");
        let src = vault.join("src.bin");
        let id = store.orphan_add(&src, &orphan_path, 7).unwrap();

        reconcile_orphan(&store, id, &src, &orphan_path).unwrap();

        assert!(src.exists(), "source should be relinked from the surviving vault copy");
        assert!(store.orphan_list_pending().unwrap().is_empty());
    }

    #[test]
    fn reconcile_orphan_stays_pending_when_relink_back_fails() {
        let db_dir = temp_db_dir("recovery_unit");
        let vault = temp_vault_dir("recovery_unit_vault");
        let store = SledIndexStore::open(&db_dir, ReadStrategy::SeekFringe).unwrap();

        let orphan_path = write_file(&vault, "vault_copy.bin", b"content");
        // The parent directory does not exist, so the relink attempt fails.
        let src = vault.join("missing_parent").join("src.bin");
        let id = store.orphan_add(&src, &orphan_path, 7).unwrap();

        reconcile_orphan(&store, id, &src, &orphan_path).unwrap();

        assert!(!src.exists());
        assert!(orphan_path.exists());
        let pending = store.orphan_list_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
    }
}
