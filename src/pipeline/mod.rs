//! The four-tier dedup decision procedure: stat, then size index, then
//! fringe index, then full-content hash, short-circuiting to the first
//! decisive tier.

use crate::errors::GateError;
use crate::hash::Hasher;
use crate::mover::MoveEngine;
use crate::store::IndexStore;
use crate::types::{Decision, Tier};
use std::path::Path;

/// Runs the pipeline for one file. `mover` is `None` in read-only mode
/// (no `processing_dir` configured): UNIQUE decisions still update the
/// indices, with `stored_path` equal to `original_path`.
pub fn process_file(
    path: &Path,
    store: &dyn IndexStore,
    hasher: &dyn Hasher,
    mover: Option<&MoveEngine>,
) -> Decision {
    let original_path = path.to_path_buf();

    // Tier 0: stat.
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => return Decision::skipped(Tier::Stat, original_path, GateError::Stat(e).to_string()),
    };
    let size = meta.len();
    if size == 0 {
        return Decision::skipped(Tier::Stat, original_path, "empty");
    }

    // Tier 1: size index.
    let size_seen = match store.size_seen(size) {
        Ok(seen) => seen,
        Err(e) => return Decision::skipped(Tier::Stat, original_path, e.to_string()),
    };
    if !size_seen {
        return finish_unique(Tier::Size, original_path, size, None, None, store, mover);
    }

    // Tier 2: fringe index.
    let strategy = store.read_strategy();
    let fringe = match hasher.fringe(path, size, strategy) {
        Ok(f) => f,
        Err(e) => return Decision::skipped(Tier::Fringe, original_path, e.to_string()),
    };
    let fringe_hit = match store.fringe_lookup(&fringe, size) {
        Ok(hit) => hit,
        Err(e) => return Decision::skipped(Tier::Fringe, original_path, e.to_string()),
    };
    if fringe_hit.is_none() {
        return finish_unique(Tier::Fringe, original_path, size, Some(fringe), None, store, mover);
    }

    // Tier 3: full content. The fringe-collision path above is not yet
    // treated as a duplicate-of target; only the full-hash table decides.
    let full = match hasher.full(path, size) {
        Ok(f) => f,
        Err(e) => return Decision::skipped(Tier::Full, original_path, e.to_string()),
    };
    match store.full_lookup(&full) {
        Ok(Some(existing)) => Decision::duplicate(Tier::Full, original_path, existing),
        Ok(None) => finish_unique(Tier::Full, original_path, size, Some(fringe), Some(full), store, mover),
        Err(e) => Decision::skipped(Tier::Full, original_path, e.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn finish_unique(
    tier: Tier,
    original_path: std::path::PathBuf,
    size: u64,
    fringe: Option<crate::types::Fingerprint128>,
    full: Option<crate::types::Fingerprint128>,
    store: &dyn IndexStore,
    mover: Option<&MoveEngine>,
) -> Decision {
    let stored_path = match mover {
        Some(engine) => match engine.relocate(store, &original_path, size, tier, full) {
            Ok(p) => p,
            Err(e) => return Decision::skipped(tier, original_path, e.to_string()),
        },
        None => original_path.clone(),
    };

    if let Err(e) = store.commit_unique(size, fringe, full, &stored_path) {
        return Decision::skipped(tier, original_path, e.to_string());
    }

    Decision::unique(tier, original_path, stored_path)
}
