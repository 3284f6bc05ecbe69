//! `transync up` — upload English source files.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use transync_sync::{Orchestrator, PushFilter, PushMode, PushOutcome};

use super::SharedArgs;
use crate::credentials::expand_path;

/// `--file-list` value selecting every English resource.
const ALL_FILES: &str = "all";

/// Arguments for `transync up`.
#[derive(Args, Debug)]
pub struct UpArgs {
    #[command(flatten)]
    pub shared: SharedArgs,

    /// File listing changed paths (e.g. a git diff), or `all`.
    #[arg(long)]
    pub file_list: Option<String>,

    /// Select files whose hash differs from the last upload.
    #[arg(long)]
    pub file_hash: bool,
}

impl UpArgs {
    pub fn run(self) -> Result<()> {
        let filter = self.filter()?;
        let resolver = self.shared.resolver()?;
        let client = self.shared.client()?;

        let mut orchestrator = Orchestrator::new(client, resolver, self.shared.settings());
        let outcome = orchestrator.push(&filter).context("upload failed")?;
        print_outcome(&outcome);
        Ok(())
    }

    fn filter(&self) -> Result<PushFilter> {
        let mode = PushMode::from_selectors(self.file_list.is_some(), self.file_hash)
            .context("use --file-list or --file-hash")?;
        let filter = match (mode, self.file_list.as_deref()) {
            (PushMode::FileList, Some(list)) if list != ALL_FILES => {
                PushFilter::ChangedFiles(read_file_list(&expand_path(list))?)
            }
            (PushMode::FileList, _) => PushFilter::All,
            (PushMode::HashCompare, _) => PushFilter::HashCompare(self.shared.snapshot_location()?),
        };
        Ok(filter)
    }
}

fn read_file_list(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file list {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn print_outcome(outcome: &PushOutcome) {
    println!("{}", outcome.summary());
    for upload in &outcome.uploads {
        println!(
            "  {} {} ({})",
            upload.action.to_string().green(),
            upload.path.display(),
            upload.format
        );
    }
    if outcome.snapshot_written {
        println!("English hashes updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_list_skips_blank_lines_and_trims() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("gitdiff.txt");
        std::fs::write(&path, "proj/a.po\r\n\n  proj/b.po  \nREADME.md\n").unwrap();
        assert_eq!(
            read_file_list(&path).unwrap(),
            ["proj/a.po", "proj/b.po", "README.md"]
        );
    }
}
