//! Session facade: scoped acquisition of the index store, recovery, and
//! the pipeline, with deterministic release on every exit path. Opens the
//! store, conditionally initializes logging next to the data directory,
//! then hands back a ready-to-use handle.

use crate::config::GateConfig;
use crate::errors::GateError;
use crate::fsutil;
use crate::hash::XxHasher;
use crate::mover::MoveEngine;
use crate::pipeline;
use crate::store::{IndexStore, SledIndexStore};
use crate::types::Decision;
use crate::walker;
use std::path::Path;

pub struct Session {
    store: SledIndexStore,
    hasher: XxHasher,
    mover: Option<MoveEngine>,
}

impl Session {
    /// Opens a session: acquires the index store, verifies schema, runs
    /// Recovery, and yields a handle. Active Mode is entered only when
    /// `config.vault_path` is set; otherwise the session is read-only and
    /// only updates indices.
    ///
    /// # Errors
    /// Returns [`GateError::Config`] if `db_path` is missing or the vault
    /// path exists but is not a directory, [`GateError::SchemaMismatch`] if
    /// an existing database disagrees on schema, [`GateError::DatabaseLocked`]
    /// if another session already holds the database open, or a storage
    /// error for any other open/recovery failure.
    pub fn open(config: &GateConfig) -> Result<Self, GateError> {
        let db_path = config
            .db_path
            .as_ref()
            .ok_or_else(|| GateError::Config("db_path is required".into()))?;
        let db_path = fsutil::normalize_db_path(&db_path.to_string_lossy());
        fsutil::create_dir_secure(&db_path)?;

        let mover = match &config.vault_path {
            Some(vault) => {
                if vault.exists() && !vault.is_dir() {
                    return Err(GateError::Config(format!(
                        "processing_dir {} exists and is not a directory",
                        vault.display()
                    )));
                }
                fsutil::create_dir_secure(vault)?;
                Some(MoveEngine::new(vault.clone(), db_path.join("emergency.jsonl")))
            }
            None => None,
        };

        let log_base = config.log_dir.as_deref().unwrap_or_else(|| {
            config.vault_path.as_deref().unwrap_or(&db_path)
        });
        let _ = crate::logger::init_for_vault_in(log_base);

        let store = SledIndexStore::open(&db_path, config.read_strategy())?;
        crate::recovery::run(&store)?;

        Ok(Session { store, hasher: XxHasher, mover })
    }

    /// Processes a single file and returns its decision record.
    #[must_use]
    pub fn process_file(&self, path: &Path) -> Decision {
        let decision = pipeline::process_file(path, &self.store, &self.hasher, self.mover.as_ref());
        if let (crate::types::DecisionKind::Unique, Some(stored)) = (decision.result, &decision.stored_path)
            && self.mover.is_some()
            && stored != &decision.original_path
        {
            let size = std::fs::metadata(stored).map(|m| m.len()).unwrap_or(0);
            crate::logger::audit_move(&decision.original_path, stored, size, decision.tier);
        }
        decision
    }

    /// Streams decision records for every regular file under `root`, in
    /// deterministic traversal order.
    pub fn process_directory<'s>(
        &'s self,
        root: &Path,
        recursive: bool,
    ) -> impl Iterator<Item = Decision> + 's {
        walker::walk(root, recursive).into_iter().map(move |p| self.process_file(&p))
    }

    /// Row counts across the index store, for `bgate stats`.
    ///
    /// # Errors
    /// Returns a storage error if any tree cannot be scanned.
    pub fn stats(&self) -> Result<crate::store::IndexCounts, GateError> {
        self.store.index_counts()
    }

    /// Commits pending transactions and releases file handles. Also run
    /// automatically on drop.
    ///
    /// # Errors
    /// Returns a storage error if the final flush fails.
    pub fn close(self) -> Result<(), GateError> {
        self.store.flush()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.store.flush();
    }
}
