//! The CLI's command enum, kept in its own module as part of a three-way
//! `cli/command.rs` / `cli/runner.rs` / `cli/util.rs` split.

use std::path::PathBuf;

pub enum Command {
    Init {
        db: PathBuf,
        vault: Option<PathBuf>,
        hdd: bool,
    },
    Process {
        file: PathBuf,
        db: PathBuf,
        vault: Option<PathBuf>,
        hdd: bool,
    },
    Scan {
        dir: PathBuf,
        db: PathBuf,
        vault: Option<PathBuf>,
        hdd: bool,
        recursive: bool,
    },
    Stats {
        db: PathBuf,
    },
    Recover {
        db: PathBuf,
        vault: Option<PathBuf>,
        hdd: bool,
    },
}
