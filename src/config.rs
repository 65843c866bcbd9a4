//! Layered configuration: CLI flag > `BGATE_CONFIG` env var >
//! `~/.config/bgate.toml` / `./.bgaterc` > built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GateConfig {
    pub db_path: Option<PathBuf>,
    pub vault_path: Option<PathBuf>,
    pub hdd_mode: Option<bool>,
    pub log_dir: Option<PathBuf>,
}

impl GateConfig {
    /// Loads layered config, merging file-based values underneath whatever
    /// is already set (CLI-parsed values take precedence; call this after
    /// parsing CLI flags into `self`).
    #[must_use]
    pub fn merged_with_files(mut self, cli_cfg: Option<&Path>) -> Self {
        let mut paths: Vec<PathBuf> = Vec::new();
        if let Some(p) = cli_cfg {
            paths.push(p.to_path_buf());
        }
        if let Ok(p) = std::env::var("BGATE_CONFIG") {
            paths.push(PathBuf::from(p));
        }
        if let Ok(home) = std::env::var("HOME") {
            let home = PathBuf::from(home);
            paths.push(home.join(".bgaterc"));
            paths.push(home.join(".config").join("bgate.toml"));
        }
        if let Ok(cur) = std::env::current_dir() {
            paths.push(cur.join("bgate.toml"));
        }

        for p in paths {
            if p.exists()
                && let Ok(s) = std::fs::read_to_string(&p)
                && let Ok(file_cfg) = toml::from_str::<GateConfig>(&s)
            {
                if self.db_path.is_none() {
                    self.db_path = file_cfg.db_path;
                }
                if self.vault_path.is_none() {
                    self.vault_path = file_cfg.vault_path;
                }
                if self.hdd_mode.is_none() {
                    self.hdd_mode = file_cfg.hdd_mode;
                }
                if self.log_dir.is_none() {
                    self.log_dir = file_cfg.log_dir;
                }
            }
        }
        self
    }

    #[must_use]
    pub fn read_strategy(&self) -> crate::types::ReadStrategy {
        if self.hdd_mode.unwrap_or(false) {
            crate::types::ReadStrategy::SequentialHdd
        } else {
            crate::types::ReadStrategy::SeekFringe
        }
    }
}
