pub mod cksumfile;
pub mod down;
pub mod up;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use transync_core::{spec, Resolver, ResolverConfig};
use transync_sync::{SnapshotLocation, SyncSettings, DEFAULT_PROJECT_PREFIX};
use transync_transifex::{TransifexClient, DEFAULT_BASE_URL};

use crate::credentials::{expand_path, Credentials};

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct SharedArgs {
    /// Resource spec JSON, relative to the clone path.
    #[arg(short = 'r', long)]
    pub localize_info: PathBuf,

    /// Repository name; also names the Transifex project.
    #[arg(short = 'n', long)]
    pub repo_name: String,

    /// Root of the repository checkout.
    #[arg(short = 'c', long)]
    pub clone_path: PathBuf,

    /// Transifex credentials file (JSON), e.g. `~/.transifex.json`.
    #[arg(short = 't', long)]
    pub credentials: Option<String>,

    /// Folder holding hash snapshots from previous runs.
    #[arg(short = 'k', long)]
    pub checksum_folder: Option<String>,

    /// Git branch; part of the snapshot file name.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Where translated files are written. Defaults to the clone path.
    #[arg(short = 'd', long)]
    pub download_path: Option<PathBuf>,

    /// Use the bare repository name as the project slug.
    #[arg(long)]
    pub no_project_prefix: bool,

    /// Transifex API root.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,
}

impl SharedArgs {
    /// Checksum folder and branch, both required; the folder must exist.
    pub fn snapshot_location(&self) -> Result<SnapshotLocation> {
        let (Some(folder), Some(branch)) = (&self.checksum_folder, &self.branch) else {
            bail!("--checksum-folder and --branch are required");
        };
        let folder = expand_path(folder);
        if !folder.is_dir() {
            bail!("checksum folder does not exist: {}", folder.display());
        }
        Ok(SnapshotLocation::new(folder, branch.clone()))
    }

    pub fn resolver(&self) -> Result<Resolver> {
        let spec = spec::load_at(&self.clone_path, &self.localize_info)
            .context("failed to load resource spec")?;
        Ok(Resolver::new(spec, &self.clone_path, &ResolverConfig::default()))
    }

    pub fn settings(&self) -> SyncSettings {
        let prefix = (!self.no_project_prefix).then_some(DEFAULT_PROJECT_PREFIX);
        let mut settings = SyncSettings::new(&self.repo_name).with_project_prefix(prefix);
        if let Some(download) = &self.download_path {
            settings = settings.with_download_path(download);
        }
        settings
    }

    pub fn client(&self) -> Result<TransifexClient> {
        let raw = self
            .credentials
            .as_deref()
            .context("--credentials is required")?;
        let creds = Credentials::load(&expand_path(raw))?;
        Ok(TransifexClient::new(&creds.username, &creds.password).with_base_url(&self.api_url))
    }
}
