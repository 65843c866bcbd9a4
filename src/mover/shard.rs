//! Sharded destination path computation.

use crate::types::Fingerprint128;
use std::path::{Path, PathBuf};

/// Computes `<vault>/<id[0:2]>/<id[2:32]><sfx>` for a 32-hex-character id.
#[must_use]
pub fn destination(vault: &Path, id_hex: &str, suffix: &std::ffi::OsStr) -> PathBuf {
    debug_assert_eq!(id_hex.len(), 32, "shard id must be 32 hex characters");
    let (shard, rest) = id_hex.split_at(2);
    let mut filename = std::ffi::OsString::from(rest);
    filename.push(suffix);
    vault.join(shard).join(filename)
}

/// Picks the shard id for a unique file: the full-content fingerprint's hex
/// rendering at tier 3 (so content-identical files always land at the same
/// vault path even if admitted independently before tier 3 ran), otherwise
/// a fresh random 128-bit id — using a random id at tiers 1/2 avoids
/// requiring the full hash merely to place the file.
#[must_use]
pub fn pick_id(full: Option<&Fingerprint128>) -> String {
    match full {
        Some(fp) => fp.to_hex(),
        None => uuid::Uuid::new_v4().simple().to_string(),
    }
}

/// Filename suffix (extension, including the leading dot) to preserve on
/// the stored path.
#[must_use]
pub fn suffix_of(original: &Path) -> std::ffi::OsString {
    match original.extension() {
        Some(ext) => {
            let mut s = std::ffi::OsString::from(".");
            s.push(ext);
            s
        }
        None => std::ffi::OsString::new(),
    }
}
