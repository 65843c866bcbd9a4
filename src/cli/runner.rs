//! Executes a parsed [`Command`] against a [`Session`], printing results in
//! an `OutputMode`-selected format.

use crate::config::GateConfig;
use crate::session::Session;
use crate::types::Decision;

use super::command::Command;
use super::util::{decision_label, tier_label};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// Runs one command to completion, printing its result in `mode`.
///
/// # Errors
/// Returns an error if the session cannot be opened or a command-specific
/// operation fails.
pub fn run(cmd: Command, mode: OutputMode) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Init { db, vault, hdd } => {
            let config = GateConfig { db_path: Some(db.clone()), vault_path: vault, hdd_mode: Some(hdd), log_dir: None };
            let session = Session::open(&config)?;
            session.close()?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::json!({"action": "init", "db": db.display().to_string()})),
                OutputMode::Plain => println!("initialized {}", db.display()),
                OutputMode::Human => println!("initialized database at {}", db.display()),
            }
            Ok(())
        }
        Command::Process { file, db, vault, hdd } => {
            let config = GateConfig { db_path: Some(db), vault_path: vault, hdd_mode: Some(hdd), log_dir: None };
            let session = Session::open(&config)?;
            let decision = session.process_file(&file);
            print_decision(&decision, mode);
            session.close()?;
            Ok(())
        }
        Command::Scan { dir, db, vault, hdd, recursive } => {
            let config = GateConfig { db_path: Some(db), vault_path: vault, hdd_mode: Some(hdd), log_dir: None };
            let session = Session::open(&config)?;
            for decision in session.process_directory(&dir, recursive) {
                print_decision(&decision, mode);
            }
            session.close()?;
            Ok(())
        }
        Command::Stats { db } => {
            let config = GateConfig { db_path: Some(db), vault_path: None, hdd_mode: None, log_dir: None };
            let session = Session::open(&config)?;
            let counts = session.stats()?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::json!({
                    "size_rows": counts.size_rows,
                    "fringe_rows": counts.fringe_rows,
                    "full_rows": counts.full_rows,
                    "journal_pending": counts.journal_pending,
                    "orphan_pending": counts.orphan_pending,
                })),
                OutputMode::Plain => println!(
                    "{} {} {} {} {}",
                    counts.size_rows, counts.fringe_rows, counts.full_rows, counts.journal_pending, counts.orphan_pending
                ),
                OutputMode::Human => println!(
                    "size={} fringe={} full={} journal_pending={} orphan_pending={}",
                    counts.size_rows, counts.fringe_rows, counts.full_rows, counts.journal_pending, counts.orphan_pending
                ),
            }
            session.close()?;
            Ok(())
        }
        Command::Recover { db, vault, hdd } => {
            // Session::open already ran Recovery once; this command exists
            // to force an additional pass without processing any files.
            // Recovery is idempotent, so running it twice is safe.
            let config = GateConfig { db_path: Some(db), vault_path: vault, hdd_mode: Some(hdd), log_dir: None };
            let session = Session::open(&config)?;
            session.close()?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::json!({"action": "recover"})),
                OutputMode::Plain => println!("recovered"),
                OutputMode::Human => println!("recovery pass complete"),
            }
            Ok(())
        }
    }
}

fn print_decision(decision: &Decision, mode: OutputMode) {
    match mode {
        OutputMode::Json => {
            let json = serde_json::to_string(decision).unwrap_or_else(|_| "{}".into());
            println!("{json}");
        }
        OutputMode::Plain => {
            println!("{} {}", decision_label(decision.result), decision.original_path.display());
        }
        OutputMode::Human => {
            let target = decision
                .stored_path
                .as_ref()
                .or(decision.duplicate_of.as_ref())
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!(
                "{:<10} tier={:<6} {} {}{}",
                decision_label(decision.result),
                tier_label(decision.tier),
                decision.original_path.display(),
                if target.is_empty() { String::new() } else { format!("-> {target}") },
                decision.error.as_deref().map(|e| format!(" ({e})")).unwrap_or_default(),
            );
        }
    }
}
