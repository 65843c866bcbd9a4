//! Filesystem helpers shared by the mover and recovery modules.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Normalize a database directory path: make absolute, don't touch the extension.
#[must_use]
pub fn normalize_db_path(name_or_path: &str) -> PathBuf {
    let raw = if name_or_path.trim().is_empty() {
        PathBuf::from("bgate.db")
    } else {
        PathBuf::from(name_or_path)
    };
    if raw.is_absolute() {
        raw
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(raw)
    }
}

/// Create a directory (and parents) with restrictive permissions where supported.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn create_dir_secure(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o700);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// True if `a` and `b` live on different filesystem devices — used to
/// reject a move whose destination resolves to a different filesystem
/// device than the source.
///
/// # Errors
/// Returns an error if either path's metadata cannot be read.
pub fn cross_device(a: &Path, b: &Path) -> io::Result<bool> {
    let dev_a = fs::metadata(a)?.dev();
    let dev_b = fs::metadata(b)?.dev();
    Ok(dev_a != dev_b)
}

/// Like [`cross_device`] but compares against a directory that may not yet
/// exist; walks up to the nearest existing ancestor.
///
/// # Errors
/// Returns an error if no ancestor of `dir` exists or cannot be read.
pub fn cross_device_of_dir(src: &Path, dir: &Path) -> io::Result<bool> {
    let mut cur = dir;
    loop {
        if cur.exists() {
            return cross_device(src, cur);
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no existing ancestor directory",
                ));
            }
        }
    }
}

/// fsync a directory's entry metadata (durability for the entries it
/// contains).
///
/// # Errors
/// Returns an error if the directory cannot be opened or synced.
pub fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = fs::File::open(dir)?;
    f.sync_all()
}

/// Create `dir` and every missing ancestor under `stop_at` (exclusive),
/// returning the list of directories that were newly created, ordered from
/// outermost (closest to `stop_at`) to innermost, matching the fsync order
/// required when fsyncing newly-created shard directories top-down, from
/// the vault root outward.
///
/// # Errors
/// Returns an error if directory creation fails partway through.
pub fn create_missing_ancestors(stop_at: &Path, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut to_create = Vec::new();
    let mut cur = dir.to_path_buf();
    while cur != stop_at && !cur.exists() {
        to_create.push(cur.clone());
        match cur.parent() {
            Some(p) => cur = p.to_path_buf(),
            None => break,
        }
    }
    to_create.reverse();
    for d in &to_create {
        fs::create_dir(d)?;
    }
    Ok(to_create)
}
