//! Minimal recursive directory walker yielding paths in a deterministic
//! order. This is not a full-featured glob/ignore-rule walker — it is the
//! minimal walker needed to drive `Session::process_directory`.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Yields every regular file under `root`, in lexicographic order within
/// each directory, with directories visited before their children
/// (`walkdir`'s default pre-order), so that `process_directory` is
/// re-runnable end-to-end idempotently.
#[must_use]
pub fn walk(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }
    walker
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}
