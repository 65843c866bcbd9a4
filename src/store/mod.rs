//! Embedded transactional index store, backed by `sled`. Each logical
//! table is a distinct `sled::Tree`, so a `sled` transaction over the
//! relevant trees gives the atomic multi-tree commit a single UNIQUE
//! decision requires.

mod journal;
mod orphan;
mod schema;

use crate::errors::GateError;
use crate::types::{Fingerprint128, JournalPhase, JournalRow, OrphanRow, OrphanStatus, ReadStrategy};
use sled::transaction::Transactional;
use std::path::{Path, PathBuf};

/// 64 MiB read cache.
const CACHE_CAPACITY_BYTES: u64 = 64 * 1024 * 1024;

/// Capability set consulted by the pipeline and mover. Abstracted as a
/// trait so tests can substitute an in-memory fake.
pub trait IndexStore {
    /// # Errors
    /// Returns a storage error if the tree cannot be read.
    fn size_seen(&self, size: u64) -> Result<bool, GateError>;

    /// # Errors
    /// Returns a storage error if the tree cannot be read.
    fn fringe_lookup(&self, fringe: &Fingerprint128, size: u64) -> Result<Option<PathBuf>, GateError>;

    /// # Errors
    /// Returns a storage error if the tree cannot be read.
    fn full_lookup(&self, full: &Fingerprint128) -> Result<Option<PathBuf>, GateError>;

    /// Atomically commits the index writes for one UNIQUE decision at the
    /// given tier: size is always recorded; fringe is
    /// recorded for tier >= 2; full is recorded for tier == 3.
    ///
    /// # Errors
    /// Returns a storage error if the transaction fails to commit.
    fn commit_unique(
        &self,
        size: u64,
        fringe: Option<Fingerprint128>,
        full: Option<Fingerprint128>,
        stored_path: &Path,
    ) -> Result<(), GateError>;

    /// # Errors
    /// Returns a storage error if the journal tree cannot be written.
    fn journal_plan(&self, src: &Path, dst: &Path, size: u64) -> Result<u64, GateError>;

    /// # Errors
    /// Returns a storage error if the journal tree cannot be written.
    fn journal_set_phase(&self, id: u64, phase: JournalPhase) -> Result<(), GateError>;

    /// # Errors
    /// Returns a storage error if the journal tree cannot be scanned.
    fn journal_list_unterminated(&self) -> Result<Vec<JournalRow>, GateError>;

    /// # Errors
    /// Returns a storage error if the journal tree cannot be written.
    fn journal_prune_completed(&self, id: u64) -> Result<(), GateError>;

    /// # Errors
    /// Returns a storage error if the orphan tree cannot be written.
    fn orphan_add(&self, src: &Path, orphan: &Path, size: u64) -> Result<u64, GateError>;

    /// # Errors
    /// Returns a storage error if the orphan tree cannot be scanned.
    fn orphan_list_pending(&self) -> Result<Vec<OrphanRow>, GateError>;

    /// # Errors
    /// Returns a storage error if the orphan tree cannot be written.
    fn orphan_mark(&self, id: u64, status: OrphanStatus) -> Result<(), GateError>;

    fn read_strategy(&self) -> ReadStrategy;

    /// Commits any pending writes and flushes to disk. Called on session
    /// teardown.
    ///
    /// # Errors
    /// Returns a storage error if the flush fails.
    fn flush(&self) -> Result<(), GateError>;

    /// Row counts across every table, for `bgate stats`.
    ///
    /// # Errors
    /// Returns a storage error if any tree cannot be scanned.
    fn index_counts(&self) -> Result<IndexCounts, GateError>;
}

/// Snapshot of table sizes, read-only and cheap relative to a full scan of
/// file content — used by the `stats` CLI command.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCounts {
    pub size_rows: usize,
    pub fringe_rows: usize,
    pub full_rows: usize,
    pub journal_pending: usize,
    pub orphan_pending: usize,
}

fn fringe_key(fringe: &Fingerprint128, size: u64) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..16].copy_from_slice(fringe.as_bytes());
    key[16..].copy_from_slice(&size.to_be_bytes());
    key
}

fn path_to_bytes(p: &Path) -> Vec<u8> {
    p.to_string_lossy().into_owned().into_bytes()
}

fn bytes_to_path(b: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(b).into_owned())
}

/// `sled`-backed [`IndexStore`].
pub struct SledIndexStore {
    db: sled::Db,
    size: sled::Tree,
    fringe: sled::Tree,
    full: sled::Tree,
    journal: sled::Tree,
    orphans: sled::Tree,
    strategy: ReadStrategy,
}

impl SledIndexStore {
    /// Opens (creating if needed) the database directory at `path`.
    ///
    /// # Errors
    /// Returns [`GateError::DatabaseLocked`] if another session already has
    /// the database open, [`GateError::SchemaMismatch`] if an existing
    /// database disagrees on schema version or read strategy, or a storage
    /// error for any other failure.
    pub fn open(path: &Path, strategy: ReadStrategy) -> Result<Self, GateError> {
        let db = sled::Config::new()
            .path(path)
            .cache_capacity(CACHE_CAPACITY_BYTES)
            .open()
            .map_err(|e| classify_open_error(path, e))?;

        let size = db.open_tree(schema::TREE_SIZE)?;
        let fringe = db.open_tree(schema::TREE_FRINGE)?;
        let full = db.open_tree(schema::TREE_FULL)?;
        let journal = db.open_tree(schema::TREE_JOURNAL)?;
        let orphans = db.open_tree(schema::TREE_ORPHANS)?;
        let meta = db.open_tree(schema::TREE_META)?;

        schema::check_or_init(&meta, strategy)?;

        Ok(SledIndexStore { db, size, fringe, full, journal, orphans, strategy })
    }
}

fn classify_open_error(path: &Path, e: sled::Error) -> GateError {
    match &e {
        sled::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::WouldBlock => {
            GateError::DatabaseLocked(path.to_path_buf())
        }
        _ => GateError::Store(e),
    }
}

impl IndexStore for SledIndexStore {
    fn size_seen(&self, size: u64) -> Result<bool, GateError> {
        Ok(self.size.contains_key(size.to_be_bytes())?)
    }

    fn fringe_lookup(&self, fringe: &Fingerprint128, size: u64) -> Result<Option<PathBuf>, GateError> {
        let key = fringe_key(fringe, size);
        Ok(self.fringe.get(key)?.map(|v| bytes_to_path(&v)))
    }

    fn full_lookup(&self, full: &Fingerprint128) -> Result<Option<PathBuf>, GateError> {
        Ok(self.full.get(full.as_bytes())?.map(|v| bytes_to_path(&v)))
    }

    fn commit_unique(
        &self,
        size: u64,
        fringe: Option<Fingerprint128>,
        full: Option<Fingerprint128>,
        stored_path: &Path,
    ) -> Result<(), GateError> {
        let path_bytes = path_to_bytes(stored_path);
        let size_key = size.to_be_bytes();
        let fringe_kv = fringe.map(|f| (fringe_key(&f, size), path_bytes.clone()));
        let full_kv = full.map(|f| (*f.as_bytes(), path_bytes.clone()));

        (&self.size, &self.fringe, &self.full)
            .transaction(move |(size_tx, fringe_tx, full_tx)| {
                size_tx.insert(&size_key, &[][..])?;
                if let Some((k, ref v)) = fringe_kv {
                    fringe_tx.insert(&k[..], v.as_slice())?;
                }
                if let Some((k, ref v)) = full_kv {
                    full_tx.insert(&k[..], v.as_slice())?;
                }
                Ok::<(), sled::transaction::ConflictableTransactionError<String>>(())
            })?;
        Ok(())
    }

    fn journal_plan(&self, src: &Path, dst: &Path, size: u64) -> Result<u64, GateError> {
        journal::plan(&self.journal, src, dst, size, now())
    }

    fn journal_set_phase(&self, id: u64, phase: JournalPhase) -> Result<(), GateError> {
        journal::set_phase(&self.journal, id, phase, now())
    }

    fn journal_list_unterminated(&self) -> Result<Vec<JournalRow>, GateError> {
        journal::list_unterminated(&self.journal)
    }

    fn journal_prune_completed(&self, id: u64) -> Result<(), GateError> {
        journal::prune_completed(&self.journal, id)
    }

    fn orphan_add(&self, src: &Path, orphan: &Path, size: u64) -> Result<u64, GateError> {
        orphan::add(&self.orphans, src, orphan, size, now())
    }

    fn orphan_list_pending(&self) -> Result<Vec<OrphanRow>, GateError> {
        orphan::list_pending(&self.orphans)
    }

    fn orphan_mark(&self, id: u64, status: OrphanStatus) -> Result<(), GateError> {
        orphan::mark(&self.orphans, id, status, now())
    }

    fn read_strategy(&self) -> ReadStrategy {
        self.strategy
    }

    fn flush(&self) -> Result<(), GateError> {
        self.db.flush()?;
        Ok(())
    }

    fn index_counts(&self) -> Result<IndexCounts, GateError> {
        Ok(IndexCounts {
            size_rows: self.size.len(),
            fringe_rows: self.fringe.len(),
            full_rows: self.full.len(),
            journal_pending: self.journal_list_unterminated()?.len(),
            orphan_pending: self.orphan_list_pending()?.len(),
        })
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
