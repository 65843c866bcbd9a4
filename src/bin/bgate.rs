//! The `bgate` invoker binary: a thin clap front-end over
//! `bgate::cli::{Command, run}` — parse args, load layered config, dispatch
//! to the `cli` module.

use bgate::cli::{Command, OutputMode, run};
use bgate::config::GateConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bgate", about = "Content-addressed file dedup gate")]
struct Cli {
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Human,
    Plain,
    Json,
}

impl From<OutputFormat> for OutputMode {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Plain => OutputMode::Plain,
            OutputFormat::Json => OutputMode::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database (and vault directory tree root) if missing.
    Init {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        vault: Option<PathBuf>,
        #[arg(long)]
        hdd: bool,
    },
    /// Process a single file, printing its decision record.
    Process {
        file: PathBuf,
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        vault: Option<PathBuf>,
        #[arg(long)]
        hdd: bool,
    },
    /// Stream decision records for every file under a directory.
    Scan {
        dir: PathBuf,
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        vault: Option<PathBuf>,
        #[arg(long)]
        hdd: bool,
        #[arg(long)]
        recursive: bool,
    },
    /// Print index sizes and pending journal/orphan row counts.
    Stats {
        #[arg(long)]
        db: PathBuf,
    },
    /// Force a recovery pass outside of normal session open.
    Recover {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        vault: Option<PathBuf>,
        #[arg(long)]
        hdd: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base_config = GateConfig::default().merged_with_files(cli.config.as_deref());

    let command = match cli.command {
        Commands::Init { db, vault, hdd } => {
            Command::Init { db, vault: vault.or(base_config.vault_path), hdd: hdd || base_config.hdd_mode.unwrap_or(false) }
        }
        Commands::Process { file, db, vault, hdd } => Command::Process {
            file,
            db,
            vault: vault.or(base_config.vault_path),
            hdd: hdd || base_config.hdd_mode.unwrap_or(false),
        },
        Commands::Scan { dir, db, vault, hdd, recursive } => Command::Scan {
            dir,
            db,
            vault: vault.or(base_config.vault_path),
            hdd: hdd || base_config.hdd_mode.unwrap_or(false),
            recursive,
        },
        Commands::Stats { db } => Command::Stats { db },
        Commands::Recover { db, vault, hdd } => Command::Recover {
            db,
            vault: vault.or(base_config.vault_path),
            hdd: hdd || base_config.hdd_mode.unwrap_or(false),
        },
    };

    run(command, cli.format.into())
}
