#![cfg(test)]

//! Tiny test-only helpers for scratch databases/vaults.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_suffix() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos()
}

/// Create a unique, empty temporary directory under the OS temp dir, for use
/// as a `db_path`.
#[must_use]
pub fn temp_db_dir(stem: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("{stem}_{}", unique_suffix()));
    if p.exists() {
        let _ = fs::remove_dir_all(&p);
    }
    fs::create_dir_all(&p).expect("create temp_db_dir failed");
    p
}

/// Create a unique, empty temporary directory under the OS temp dir, for use
/// as a `vault_path`.
#[must_use]
pub fn temp_vault_dir(stem: &str) -> PathBuf {
    temp_db_dir(stem)
}

/// Create a unique, empty temporary directory for holding source files to
/// be scanned/processed.
#[must_use]
pub fn temp_source_dir(stem: &str) -> PathBuf {
    temp_db_dir(stem)
}

/// Write `contents` to a new file named `name` inside `dir`, returning its path.
#[must_use]
pub fn write_file(dir: &std::path::Path, name: &str, contents: &[u8]) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, contents).expect("write_file failed");
    p
}
