//! Crash-safe move engine: journaled, fsync-ordered, signal-deferred
//! link+unlink mover with sharded destination placement.

mod shard;
mod signal_guard;

use crate::errors::GateError;
use crate::fsutil;
use crate::store::IndexStore;
use crate::types::{Fingerprint128, JournalPhase, Tier};
use signal_guard::CriticalSection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// EXDEV on Linux; `std::io::ErrorKind` has no stable cross-device variant,
/// so the raw OS error code is checked directly.
const EXDEV: i32 = 18;

fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(EXDEV)
}

/// Relocates unique files into the vault. Holds no state beyond the vault
/// root and the emergency-log sidecar path; every call is independently
/// crash-safe via the journal.
pub struct MoveEngine {
    vault: PathBuf,
    emergency_log: PathBuf,
}

impl MoveEngine {
    #[must_use]
    pub fn new(vault: PathBuf, emergency_log: PathBuf) -> Self {
        MoveEngine { vault, emergency_log }
    }

    #[must_use]
    pub fn vault(&self) -> &Path {
        &self.vault
    }

    /// Runs the eleven-step atomic move protocol and returns the final
    /// stored path.
    ///
    /// # Errors
    /// Returns [`GateError::CrossDevice`] or [`GateError::DestinationExists`]
    /// for the precondition checks, or a storage/IO error for any failure
    /// during the move itself. On any failure after the hard link is
    /// created, an orphan-registry row (or, if the store itself is
    /// unwritable, an emergency-log line) is written before the error is
    /// returned.
    pub fn relocate(
        &self,
        store: &dyn IndexStore,
        src: &Path,
        size: u64,
        tier: Tier,
        full: Option<Fingerprint128>,
    ) -> Result<PathBuf, GateError> {
        // Step 1: preconditions.
        if fsutil::cross_device_of_dir(src, &self.vault).map_err(GateError::Io)? {
            return Err(GateError::CrossDevice);
        }
        let id_hex = shard::pick_id(if tier == Tier::Full { full.as_ref() } else { None });
        let suffix = shard::suffix_of(src);
        let dst = shard::destination(&self.vault, &id_hex, &suffix);
        if dst.exists() {
            return Err(GateError::DestinationExists(dst));
        }

        // Step 2: plan.
        let journal_id = store.journal_plan(src, &dst, size)?;

        // Step 3: enter critical section; SIGINT/SIGTERM are buffered until
        // this guard drops at the end of this function.
        let _critical = CriticalSection::enter().map_err(GateError::Io)?;

        let parent = dst.parent().expect("shard destination always has a parent");

        // Step 4: create shard directories, recording which were new.
        let created = match fsutil::create_missing_ancestors(&self.vault, parent) {
            Ok(created) => created,
            Err(e) => {
                let _ = store.journal_set_phase(journal_id, JournalPhase::Failed);
                return Err(GateError::Io(e));
            }
        };

        // Step 5: link.
        if let Err(e) = fs::hard_link(src, &dst) {
            let _ = store.journal_set_phase(journal_id, JournalPhase::Failed);
            return Err(if e.kind() == io::ErrorKind::AlreadyExists {
                GateError::DestinationExists(dst)
            } else if is_cross_device(&e) {
                GateError::CrossDevice
            } else {
                GateError::Io(e)
            });
        }

        // From here on, the vault copy is live: any failure is a
        // post-link failure and must be recorded as an orphan.
        // Step 6: fsync top-down, vault root outward, then the destination parent.
        for dir in &created {
            if let Err(e) = fsutil::fsync_dir(dir) {
                return Err(self.post_link_failure(store, journal_id, src, &dst, size, e));
            }
        }
        if !created.contains(&parent.to_path_buf())
            && let Err(e) = fsutil::fsync_dir(parent)
        {
            return Err(self.post_link_failure(store, journal_id, src, &dst, size, e));
        }

        // Step 7: promote planned -> moving.
        if let Err(e) = store.journal_set_phase(journal_id, JournalPhase::Moving) {
            return Err(self.post_link_db_failure(src, &dst, size, e));
        }

        // Step 8: unlink source.
        if let Err(e) = fs::remove_file(src) {
            return Err(self.post_link_failure(store, journal_id, src, &dst, size, e));
        }

        // Step 9: fsync source's parent directory.
        if let Some(src_parent) = src.parent()
            && let Err(e) = fsutil::fsync_dir(src_parent)
        {
            return Err(self.post_link_failure(store, journal_id, src, &dst, size, e));
        }

        // Step 10: promote moving -> completed.
        if let Err(e) = store.journal_set_phase(journal_id, JournalPhase::Completed) {
            return Err(self.post_link_db_failure(src, &dst, size, e));
        }

        // Step 11: critical section exits (and any deferred signal is
        // re-raised) when `_critical` drops at the end of this function.
        Ok(dst)
    }

    fn post_link_failure(
        &self,
        store: &dyn IndexStore,
        journal_id: u64,
        src: &Path,
        dst: &Path,
        size: u64,
        cause: io::Error,
    ) -> GateError {
        match store.orphan_add(src, dst, size) {
            Ok(_) => {
                let _ = store.journal_set_phase(journal_id, JournalPhase::Failed);
            }
            Err(store_err) => {
                self.emergency_log_line(src, dst, size, &format!(
                    "orphan write failed: {store_err}; original cause: {cause}"
                ));
            }
        }
        GateError::Io(cause)
    }

    fn post_link_db_failure(&self, src: &Path, dst: &Path, size: u64, cause: GateError) -> GateError {
        self.emergency_log_line(src, dst, size, &cause.to_string());
        GateError::DatabaseUnavailable(cause.to_string())
    }

    /// Best-effort emergency log line, used only when the database itself
    /// is unwritable during a post-link failure.
    fn emergency_log_line(&self, src: &Path, dst: &Path, size: u64, cause: &str) {
        use std::io::Write;
        let line = serde_json::json!({
            "src": src.to_string_lossy(),
            "dst": dst.to_string_lossy(),
            "size": size,
            "cause": cause,
        });
        if let Ok(mut f) = fs::OpenOptions::new().create(true).append(true).open(&self.emergency_log) {
            let _ = writeln!(f, "{line}");
            let _ = f.sync_all();
        }
    }
}
