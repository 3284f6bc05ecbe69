//! transync — sync repository resource files with Transifex.
//!
//! # Usage
//!
//! ```text
//! transync up        -r <spec> -n <repo> -c <clone> -t <creds> (--file-list <FILE|all> | --file-hash -k <dir> -b <branch>)
//! transync down      -r <spec> -n <repo> -c <clone> -t <creds> -k <dir> -b <branch> [-d <dir>] [--download-list-file <FILE>]
//! transync cksumfile -r <spec> -n <repo> -c <clone> -k <dir> -b <branch> [-d <dir>]
//! ```
//!
//! Exit status: `0` success, `1` error, `100` when `down` found nothing new.

mod commands;
mod credentials;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{cksumfile::CksumfileArgs, down::DownArgs, up::UpArgs};
use transync_sync::SyncStatus;

/// Exit status of a pull that downloaded nothing new.
const EXIT_NO_CHANGES: u8 = 100;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "transync",
    version,
    about = "Upload English resources to Transifex and download translations",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload English source files.
    Up(UpArgs),

    /// Download translated files and report completion.
    Down(DownArgs),

    /// Record hashes of the translated files on disk.
    Cksumfile(CksumfileArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Up(args) => args.run().map(|()| SyncStatus::Ok),
        Commands::Down(args) => args.run(),
        Commands::Cksumfile(args) => args.run().map(|()| SyncStatus::Ok),
    };

    match result {
        Ok(SyncStatus::Ok) => ExitCode::SUCCESS,
        Ok(SyncStatus::NoChanges) => ExitCode::from(EXIT_NO_CHANGES),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
