//! Structured, rolling, file-based logging via `log` + `log4rs`, scoped
//! per-vault/database.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::fs;
use std::path::Path;

/// Initializes logging to `{base_dir}/bgate_logs/bgate.log`, with a
/// size-triggered rolling policy (10 MiB, 7 files), plus a separate
/// `bgate::audit` logger recording one line per completed move
/// (src, dst, size, tier) independent of the database — giving operators a
/// durable trail even if the database itself is the thing that failed.
///
/// # Errors
/// Returns an error if the log directory cannot be created or the logger
/// fails to initialize.
pub fn init_for_vault_in(base_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut dir = base_dir.to_path_buf();
    dir.push("bgate_logs");
    fs::create_dir_all(&dir)?;

    let encoder_pattern = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

    let app_log = dir.join("bgate.log");
    let app_roller =
        FixedWindowRoller::builder().build(&format!("{}", dir.join("bgate.{}.log").display()), 7)?;
    let app_policy = CompoundPolicy::new(Box::new(SizeTrigger::new(10 * 1024 * 1024)), Box::new(app_roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(encoder_pattern)))
        .build(app_log, Box::new(app_policy))?;

    let audit_log = dir.join("bgate_audit.log");
    let audit_roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join("bgate.audit.{}.log").display()), 7)?;
    let audit_policy =
        CompoundPolicy::new(Box::new(SizeTrigger::new(10 * 1024 * 1024)), Box::new(audit_roller));
    let audit_appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(encoder_pattern)))
        .build(audit_log, Box::new(audit_policy))?;

    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(appender)))
        .appender(Appender::builder().build("audit", Box::new(audit_appender)))
        .logger(
            Logger::builder()
                .appender("audit")
                .additive(false)
                .build("bgate::audit", LevelFilter::Info),
        )
        .build(Root::builder().appender("app").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

/// One audit-log line for a completed move.
pub fn audit_move(src: &Path, dst: &Path, size: u64, tier: crate::types::Tier) {
    log::info!(target: "bgate::audit", "move src={} dst={} size={} tier={:?}", src.display(), dst.display(), size, tier);
}
