use clap::{Parser, Subcommand};
use driftsync::commands;
use driftsync::config::{ConflictStrategy, Direction, SyncOptions};
use driftsync::remote::{DirStore, RetryingStore};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "driftsync", version, about = "Three-way local/remote directory synchronizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one synchronization pass
    Sync {
        /// Local directory to synchronize
        local_dir: PathBuf,

        /// Directory acting as the remote store root
        remote_dir: PathBuf,

        /// Restrict which way transfers flow
        #[arg(long, value_enum, default_value_t = Direction::Both)]
        direction: Direction,

        /// Propagate deletions to the orphaned side
        #[arg(long)]
        delete: bool,

        /// Show the full action plan without transferring anything
        #[arg(long)]
        dry_run: bool,

        /// Exclusion pattern; repeatable
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Conflict resolution strategy
        #[arg(long, value_enum, default_value_t = ConflictStrategy::Newer)]
        strategy: ConflictStrategy,

        /// Timestamp delta (ms) below which both sides count as unchanged
        #[arg(long, default_value_t = 1_000)]
        tolerance_ms: i64,
    },

    /// Show pending differences without transferring
    Status {
        /// Local directory to inspect
        local_dir: PathBuf,

        /// Directory acting as the remote store root; omit to check the
        /// local tree against the prior sync state only
        remote_dir: Option<PathBuf>,

        /// Exclusion pattern; repeatable
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Timestamp delta (ms) below which both sides count as unchanged
        #[arg(long, default_value_t = 1_000)]
        tolerance_ms: i64,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        // Fatal: scan, state, or configuration failure. Per-file errors
        // never land here; they map to exit code 1 inside run().
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Sync {
            local_dir,
            remote_dir,
            direction,
            delete,
            dry_run,
            exclude,
            strategy,
            tolerance_ms,
        } => {
            let store = RetryingStore::new(DirStore::new(remote_dir));
            let options = SyncOptions {
                direction,
                delete_orphans: delete,
                dry_run,
                exclude,
                strategy,
                tolerance_ms,
            };
            let report = commands::sync::run(&store, &local_dir, DirStore::ROOT_ID, options, None)?;
            Ok(ExitCode::from(commands::exit_code(&report) as u8))
        }
        Command::Status {
            local_dir,
            remote_dir,
            exclude,
            tolerance_ms,
        } => {
            let options = SyncOptions {
                exclude,
                tolerance_ms,
                ..Default::default()
            };
            match remote_dir {
                Some(remote_dir) => {
                    let store = RetryingStore::new(DirStore::new(remote_dir));
                    commands::status::run(&store, &local_dir, DirStore::ROOT_ID, options)?;
                }
                None => commands::status::run_offline(&local_dir, options)?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
