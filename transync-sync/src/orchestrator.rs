//! Push / pull orchestration.
//!
//! ## Phases
//!
//! `Idle → Resolving → Filtering (push) | Fetching (pull) → Persisting → Done`
//!
//! `Persisting` is only entered when a snapshot is written: after a push in
//! hash-compare mode and for [`Orchestrator::write_snapshot`]. Pull reads the
//! snapshot for reporting and never writes it.
//!
//! Every service call is issued sequentially in resolved-list order. A failed
//! call aborts the flow; work already done is not rolled back.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use transync_core::{slugify, Resolver, ResourceStats, TranslationService};

use crate::change;
use crate::error::{io_err, SyncError};
use crate::formats::FormatTable;
use crate::snapshot::{self, HashSnapshot, SnapshotKey};

/// Prefix prepended to the repo name to form the project slug.
pub const DEFAULT_PROJECT_PREFIX: &str = "onshape-";

/// Snapshot suffix used for English hashes written by push.
pub const ENGLISH_SNAPSHOT_SUFFIX: &str = "english";

// ---------------------------------------------------------------------------
// Settings and inputs
// ---------------------------------------------------------------------------

/// Per-run settings passed in at construction.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Repository name; used in snapshot file names.
    pub repo_name: String,
    /// Remote project slug.
    pub project_slug: String,
    /// Where translations are written and hashed. `None` means the clone path.
    pub download_path: Option<PathBuf>,
    pub formats: FormatTable,
}

impl SyncSettings {
    /// Settings for `repo_name` with the default project prefix.
    pub fn new(repo_name: impl Into<String>) -> Self {
        let repo_name = repo_name.into();
        Self {
            project_slug: slugify(&format!("{DEFAULT_PROJECT_PREFIX}{repo_name}")),
            repo_name,
            download_path: None,
            formats: FormatTable::default(),
        }
    }

    /// Recompute the project slug with `prefix` (`None` uses the bare repo name).
    pub fn with_project_prefix(mut self, prefix: Option<&str>) -> Self {
        self.project_slug = slugify(&format!("{}{}", prefix.unwrap_or_default(), self.repo_name));
        self
    }

    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = Some(path.into());
        self
    }

    pub fn with_formats(mut self, formats: FormatTable) -> Self {
        self.formats = formats;
        self
    }
}

/// Checksum folder and branch identifying a run's snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLocation {
    pub folder: PathBuf,
    pub branch: String,
}

impl SnapshotLocation {
    pub fn new(folder: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            branch: branch.into(),
        }
    }
}

/// How push selects the English files to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFilter {
    /// Upload every English file.
    All,
    /// Upload English files named in this list of repository-relative paths.
    ChangedFiles(Vec<String>),
    /// Upload English files whose hash differs from the `english` snapshot,
    /// then rewrite that snapshot.
    HashCompare(SnapshotLocation),
}

/// Which of the two push selectors was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    FileList,
    HashCompare,
}

impl PushMode {
    /// Exactly one selector must be given.
    pub fn from_selectors(file_list: bool, hash_compare: bool) -> Result<Self, SyncError> {
        match (file_list, hash_compare) {
            (true, false) => Ok(Self::FileList),
            (false, true) => Ok(Self::HashCompare),
            _ => Err(SyncError::Config(
                "exactly one of a file list or hash comparison must be supplied".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Orchestrator progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Filtering,
    Fetching,
    Persisting,
    Done,
}

/// Whether a pull brought anything new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Ok,
    NoChanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    Created,
    Updated,
}

impl fmt::Display for UploadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadAction::Created => write!(f, "created"),
            UploadAction::Updated => write!(f, "updated"),
        }
    }
}

/// One uploaded English file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub path: PathBuf,
    pub format: String,
    pub action: UploadAction,
}

/// Result of [`Orchestrator::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub uploads: Vec<Upload>,
    /// Size of the pool the filter picked from: the supplied list for
    /// `ChangedFiles`, every English file otherwise.
    pub considered: usize,
    pub snapshot_written: bool,
    kind: PushKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushKind {
    All,
    ChangedFiles,
    HashCompare,
}

impl PushOutcome {
    /// One-line summary of what was selected.
    pub fn summary(&self) -> String {
        let n = self.uploads.len();
        match self.kind {
            PushKind::All => format!("About to upload all resources ({n})"),
            PushKind::ChangedFiles => {
                format!("{n} resource(s) found in {} changed files", self.considered)
            }
            PushKind::HashCompare => {
                format!("{n} changed/new resource(s) out of {} total", self.considered)
            }
        }
    }
}

/// One downloaded translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRow {
    /// Path relative to the download path.
    pub relative: String,
    pub resource: String,
    pub language: String,
    pub stats: ResourceStats,
    /// New or changed since the last snapshot.
    pub changed: bool,
}

/// Result of [`Orchestrator::pull`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub rows: Vec<PullRow>,
    /// Sorted relative paths of new or changed translations.
    pub changed: Vec<String>,
}

impl PullOutcome {
    pub fn status(&self) -> SyncStatus {
        if self.changed.is_empty() {
            SyncStatus::NoChanges
        } else {
            SyncStatus::Ok
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives push, pull and snapshot writes for one repository.
pub struct Orchestrator<S> {
    service: S,
    resolver: Resolver,
    settings: SyncSettings,
    phase: Phase,
}

impl<S> Orchestrator<S> {
    /// `resolver` must be rooted at the repository clone path.
    pub fn new(service: S, resolver: Resolver, settings: SyncSettings) -> Self {
        Self {
            service,
            resolver,
            settings,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn clone_path(&self) -> &Path {
        self.resolver.root()
    }

    fn download_path(&self) -> &Path {
        self.settings
            .download_path
            .as_deref()
            .unwrap_or_else(|| self.resolver.root())
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn snapshot_key(&self, branch: &str) -> SnapshotKey {
        SnapshotKey::new(branch, self.settings.repo_name.clone())
    }

    /// Translated path under the download path for a path under the clone.
    fn download_target(&self, path: &Path) -> PathBuf {
        self.download_path()
            .join(change::relative_key(path, self.clone_path()))
    }
}

impl<S: TranslationService> Orchestrator<S> {
    /// Fail with [`SyncError::ProjectNotFound`] unless the project exists.
    fn ensure_project(&self) -> Result<String, SyncError> {
        let slug = &self.settings.project_slug;
        if !self.service.project_exists(slug)? {
            return Err(SyncError::ProjectNotFound { slug: slug.clone() });
        }
        Ok(slug.clone())
    }

    // -----------------------------------------------------------------------
    // Push
    // -----------------------------------------------------------------------

    /// Upload English resources selected by `filter`.
    ///
    /// Formats for every selected file are resolved before the first upload,
    /// so an unsupported extension uploads nothing.
    pub fn push(&mut self, filter: &PushFilter) -> Result<PushOutcome, SyncError> {
        let project = self.ensure_project()?;
        // Resource name → slug of what already exists remotely.
        let mut remote: HashMap<String, String> = self
            .service
            .list_resources(&project)?
            .into_iter()
            .map(|r| (r.name, r.slug))
            .collect();

        self.enter(Phase::Resolving);
        let english = self.resolver.english_files()?;

        self.enter(Phase::Filtering);
        let (selected, considered, kind) = match filter {
            PushFilter::All => (english.clone(), english.len(), PushKind::All),
            PushFilter::ChangedFiles(list) => {
                let selected = self.select_listed(&english, list);
                (selected, list.len(), PushKind::ChangedFiles)
            }
            PushFilter::HashCompare(location) => {
                let key = self
                    .snapshot_key(&location.branch)
                    .with_suffix(ENGLISH_SNAPSHOT_SUFFIX);
                let previous = snapshot::load_at(&location.folder, &key);
                let changed = change::detect(&english, self.clone_path(), &previous)?;
                let selected: Vec<PathBuf> =
                    changed.iter().map(|rel| self.clone_path().join(rel)).collect();
                (selected, english.len(), PushKind::HashCompare)
            }
        };

        let plan = selected
            .into_iter()
            .map(|path| {
                let format = self.settings.formats.lookup(&path)?.to_string();
                Ok((path, format))
            })
            .collect::<Result<Vec<_>, SyncError>>()?;

        let mut uploads = Vec::with_capacity(plan.len());
        for (path, format) in plan {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let action = if let Some(slug) = remote.get(&name) {
                self.service
                    .update_resource_source(&project, slug, &path, &format)?;
                UploadAction::Updated
            } else {
                self.service.create_resource(&project, &path, &name, &format)?;
                let slug = slugify(&name);
                remote.insert(name, slug);
                UploadAction::Created
            };
            tracing::info!("uploaded ({action}): {}", path.display());
            uploads.push(Upload {
                path,
                format,
                action,
            });
        }

        let mut snapshot_written = false;
        if let PushFilter::HashCompare(location) = filter {
            self.enter(Phase::Persisting);
            let fresh = change::current_hashes(&english, self.clone_path())?;
            let key = self
                .snapshot_key(&location.branch)
                .with_suffix(ENGLISH_SNAPSHOT_SUFFIX);
            snapshot::save_at(&location.folder, &key, &fresh)?;
            snapshot_written = true;
        }

        self.enter(Phase::Done);
        Ok(PushOutcome {
            uploads,
            considered,
            snapshot_written,
            kind,
        })
    }

    /// English files named in `list`, in list order.
    fn select_listed(&self, english: &[PathBuf], list: &[String]) -> Vec<PathBuf> {
        let mut selected = Vec::new();
        for line in list {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            let candidate = self.clone_path().join(line);
            if english.contains(&candidate) && !selected.contains(&candidate) {
                selected.push(candidate);
            } else {
                tracing::debug!("not an English resource: {line}");
            }
        }
        selected
    }

    // -----------------------------------------------------------------------
    // Pull
    // -----------------------------------------------------------------------

    /// Download every translation, then classify them against the snapshot
    /// at `location` for reporting.
    pub fn pull(&mut self, location: &SnapshotLocation) -> Result<PullOutcome, SyncError> {
        let project = self.ensure_project()?;

        self.enter(Phase::Resolving);
        let files = self.resolver.translated_files()?;

        self.enter(Phase::Fetching);
        let mut stats_by_file: HashMap<String, ResourceStats> = HashMap::new();
        let mut targets = Vec::with_capacity(files.len());
        for entry in files.iter() {
            let target = self.download_target(entry.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            let resource = slugify(entry.resource);
            tracing::info!("downloading: {}", target.display());
            self.service
                .fetch_translation(&project, &resource, entry.language, &target)?;
            let stats = self
                .service
                .fetch_statistics(&project, &resource, entry.language)?;
            stats_by_file.insert(change::relative_key(&target, self.download_path()), stats);
            targets.push(target);
        }

        let previous = snapshot::load_at(&location.folder, &self.snapshot_key(&location.branch));
        let changed = change::detect(&targets, self.download_path(), &previous)?;

        let mut rows = Vec::with_capacity(targets.len());
        for (entry, target) in files.iter().zip(&targets) {
            let relative = change::relative_key(target, self.download_path());
            let stats = stats_by_file
                .get(&relative)
                .cloned()
                .ok_or_else(|| SyncError::StatsMissing {
                    file: relative.clone(),
                })?;
            rows.push(PullRow {
                changed: changed.binary_search(&relative).is_ok(),
                relative,
                resource: entry.resource.to_string(),
                language: entry.language.to_string(),
                stats,
            });
        }

        self.enter(Phase::Done);
        Ok(PullOutcome { rows, changed })
    }
}

impl<S> Orchestrator<S> {
    /// Write one relative path per line for every pulled file.
    pub fn write_download_list(&self, path: &Path, outcome: &PullOutcome) -> Result<(), SyncError> {
        let mut contents = String::new();
        for row in &outcome.rows {
            contents.push_str(&row.relative);
            contents.push('\n');
        }
        std::fs::write(path, contents).map_err(|e| io_err(path, e))
    }

    // -----------------------------------------------------------------------
    // Snapshot command
    // -----------------------------------------------------------------------

    /// Hash the resolved files and overwrite the snapshot at `location`.
    ///
    /// English mode hashes sources relative to the clone path; translation
    /// mode hashes translations relative to the download path. Makes no
    /// service calls, so `S` may be `()`.
    pub fn write_snapshot(
        &mut self,
        location: &SnapshotLocation,
        suffix: Option<&str>,
        english_mode: bool,
    ) -> Result<HashSnapshot, SyncError> {
        self.enter(Phase::Resolving);
        let (files, base) = if english_mode {
            (self.resolver.english_files()?, self.clone_path().to_path_buf())
        } else {
            let files: Vec<PathBuf> = self
                .resolver
                .translated_files()?
                .paths()
                .iter()
                .map(|p| self.download_target(p))
                .collect();
            (files, self.download_path().to_path_buf())
        };

        self.enter(Phase::Persisting);
        let hashes = change::current_hashes(&files, &base)?;
        let mut key = self.snapshot_key(&location.branch);
        if let Some(suffix) = suffix {
            key = key.with_suffix(suffix);
        }
        snapshot::save_at(&location.folder, &key, &hashes)?;

        self.enter(Phase::Done);
        Ok(hashes)
    }
}
