//! `transync cksumfile` — snapshot the translated files on disk.
//!
//! Works offline: no credentials, no project lookup.

use anyhow::{Context, Result};
use clap::Args;

use transync_sync::Orchestrator;

use super::SharedArgs;

/// Arguments for `transync cksumfile`.
#[derive(Args, Debug)]
pub struct CksumfileArgs {
    #[command(flatten)]
    pub shared: SharedArgs,
}

impl CksumfileArgs {
    pub fn run(self) -> Result<()> {
        let location = self.shared.snapshot_location()?;
        let resolver = self.shared.resolver()?;

        let mut orchestrator = Orchestrator::new((), resolver, self.shared.settings());
        let hashes = orchestrator
            .write_snapshot(&location, None, false)
            .context("failed to write checksum file")?;
        println!("recorded {} file hash(es)", hashes.len());
        Ok(())
    }
}
