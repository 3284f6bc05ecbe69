//! `transync down` — download translations and print completion stats.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use transync_sync::{Orchestrator, PullOutcome, PullRow, SyncStatus};

use super::SharedArgs;

/// Arguments for `transync down`.
#[derive(Args, Debug)]
pub struct DownArgs {
    #[command(flatten)]
    pub shared: SharedArgs,

    /// Write the downloaded paths, one per line, to this file.
    #[arg(long)]
    pub download_list_file: Option<PathBuf>,
}

impl DownArgs {
    pub fn run(self) -> Result<SyncStatus> {
        let location = self.shared.snapshot_location()?;
        let resolver = self.shared.resolver()?;
        let client = self.shared.client()?;

        let mut orchestrator = Orchestrator::new(client, resolver, self.shared.settings());
        let outcome = orchestrator.pull(&location).context("download failed")?;
        print_report(&outcome);

        if let Some(list) = &self.download_list_file {
            orchestrator
                .write_download_list(list, &outcome)
                .context("failed to write download list")?;
        }
        Ok(outcome.status())
    }
}

#[derive(Tabled)]
struct PullTableRow {
    #[tabled(rename = "Completed")]
    completed: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Words")]
    words: String,
    #[tabled(rename = "Entities")]
    entities: String,
    #[tabled(rename = "Committer")]
    committer: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&PullRow> for PullTableRow {
    fn from(row: &PullRow) -> Self {
        let marker = if row.changed { "*** " } else { "" };
        Self {
            completed: format!("{marker}{}", row.stats.completed),
            resource: row.relative.clone(),
            words: format!("{}/{}", row.stats.translated_words, row.stats.total_words()),
            entities: format!(
                "{}/{}",
                row.stats.translated_entities,
                row.stats.total_entities()
            ),
            committer: row.stats.last_committer.clone(),
            updated: row.stats.last_update.clone(),
        }
    }
}

fn print_report(outcome: &PullOutcome) {
    println!("{} changed/new file(s)", outcome.changed.len());
    if outcome.rows.is_empty() {
        return;
    }
    let rows: Vec<PullTableRow> = outcome.rows.iter().map(PullTableRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
