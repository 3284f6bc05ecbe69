use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;
use transync_core::{
    slugify, spec, RemoteResource, Resolver, ResolverConfig, ResourceStats, ServiceError,
    TranslationService,
};
use transync_sync::{
    snapshot, Orchestrator, Phase, PushFilter, SnapshotKey, SnapshotLocation, SyncError,
    SyncSettings, SyncStatus, UploadAction, ENGLISH_SNAPSHOT_SUFFIX,
};

// ---------------------------------------------------------------------------
// In-memory service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    ProjectExists(String),
    ListResources,
    Create { name: String, format: String },
    Update { slug: String, file: String, format: String },
    FetchTranslation { resource: String, language: String },
    FetchStatistics { resource: String, language: String },
}

#[derive(Default)]
struct FakeService {
    missing_project: bool,
    /// Remote resource name → slug.
    remote: RefCell<BTreeMap<String, String>>,
    /// (resource slug, language) → translated file contents.
    translations: RefCell<BTreeMap<(String, String), String>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeService {
    fn with_remote(names: &[&str]) -> Self {
        let pairs: Vec<(&str, String)> = names.iter().map(|n| (*n, slugify(n))).collect();
        let service = Self::default();
        service
            .remote
            .borrow_mut()
            .extend(pairs.into_iter().map(|(n, s)| (n.to_string(), s)));
        service
    }

    fn with_remote_slugs(entries: &[(&str, &str)]) -> Self {
        let service = Self::default();
        service
            .remote
            .borrow_mut()
            .extend(entries.iter().map(|(n, s)| (n.to_string(), s.to_string())));
        service
    }

    fn set_translation(&self, resource: &str, language: &str, content: &str) {
        self.translations
            .borrow_mut()
            .insert((resource.to_string(), language.to_string()), content.to_string());
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn uploads(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create { .. } | Call::Update { .. }))
            .collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

impl TranslationService for FakeService {
    fn project_exists(&self, project: &str) -> Result<bool, ServiceError> {
        self.calls
            .borrow_mut()
            .push(Call::ProjectExists(project.to_string()));
        Ok(!self.missing_project)
    }

    fn list_resources(&self, _project: &str) -> Result<Vec<RemoteResource>, ServiceError> {
        self.calls.borrow_mut().push(Call::ListResources);
        Ok(self
            .remote
            .borrow()
            .iter()
            .map(|(name, slug)| RemoteResource {
                slug: slug.clone(),
                name: name.clone(),
            })
            .collect())
    }

    fn create_resource(
        &self,
        _project: &str,
        _path: &Path,
        name: &str,
        format: &str,
    ) -> Result<(), ServiceError> {
        self.remote
            .borrow_mut()
            .insert(name.to_string(), slugify(name));
        self.calls.borrow_mut().push(Call::Create {
            name: name.to_string(),
            format: format.to_string(),
        });
        Ok(())
    }

    fn update_resource_source(
        &self,
        _project: &str,
        resource: &str,
        path: &Path,
        format: &str,
    ) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(Call::Update {
            slug: resource.to_string(),
            file: file_name(path),
            format: format.to_string(),
        });
        Ok(())
    }

    fn fetch_translation(
        &self,
        _project: &str,
        resource: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(Call::FetchTranslation {
            resource: resource.to_string(),
            language: language.to_string(),
        });
        let content = self
            .translations
            .borrow()
            .get(&(resource.to_string(), language.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("msgstr \"{resource} {language}\"\n"));
        fs::write(dest, content).map_err(|source| ServiceError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }

    fn fetch_statistics(
        &self,
        _project: &str,
        resource: &str,
        language: &str,
    ) -> Result<ResourceStats, ServiceError> {
        self.calls.borrow_mut().push(Call::FetchStatistics {
            resource: resource.to_string(),
            language: language.to_string(),
        });
        Ok(ResourceStats {
            translated_words: 8,
            untranslated_words: 2,
            translated_entities: 3,
            untranslated_entities: 1,
            completed: "80%".to_string(),
            last_committer: "translator".to_string(),
            last_update: "2024-01-01 00:00:00".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const PO_SPEC: &str =
    r#"{"resources": [["proj/*.po", "_", null]], "langs": [{"fr": null}, {"de": null}]}"#;

struct Repo {
    clone: TempDir,
    checksums: TempDir,
}

impl Repo {
    fn new(files: &[(&str, &str)]) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let clone = TempDir::new().expect("clone dir");
        for (rel, content) in files {
            let path = clone.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        Self {
            clone,
            checksums: TempDir::new().expect("checksum dir"),
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.clone.path().join(rel)
    }

    fn location(&self) -> SnapshotLocation {
        SnapshotLocation::new(self.checksums.path(), "master")
    }

    fn orchestrator(&self, json: &str, service: FakeService) -> Orchestrator<FakeService> {
        self.orchestrator_with(json, service, SyncSettings::new("newton"))
    }

    fn orchestrator_with(
        &self,
        json: &str,
        service: FakeService,
        settings: SyncSettings,
    ) -> Orchestrator<FakeService> {
        let spec = spec::parse(Path::new("localize_info.json"), json).expect("parse spec");
        let resolver = Resolver::new(spec, self.clone.path(), &ResolverConfig::default());
        Orchestrator::new(service, resolver, settings)
    }
}

fn po_repo() -> Repo {
    Repo::new(&[
        ("proj/a.po", "msgid \"a\"\n"),
        ("proj/b.po", "msgid \"b\"\n"),
    ])
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

#[test]
fn push_all_creates_missing_and_updates_existing() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::with_remote(&["b.po"]));

    let outcome = orch.push(&PushFilter::All).unwrap();

    assert_eq!(outcome.summary(), "About to upload all resources (2)");
    assert_eq!(
        orch.service().uploads(),
        vec![
            Call::Create {
                name: "a.po".into(),
                format: "PO".into()
            },
            Call::Update {
                slug: "bpo".into(),
                file: "b.po".into(),
                format: "PO".into()
            },
        ]
    );
    assert_eq!(outcome.uploads[0].action, UploadAction::Created);
    assert_eq!(outcome.uploads[1].action, UploadAction::Updated);
    assert!(!outcome.snapshot_written);
    assert_eq!(orch.phase(), Phase::Done);
}

#[test]
fn push_updates_under_the_remote_slug() {
    let repo = po_repo();
    let service = FakeService::with_remote_slugs(&[("b.po", "legacy-b")]);
    let mut orch = repo.orchestrator(PO_SPEC, service);

    orch.push(&PushFilter::ChangedFiles(vec!["proj/b.po".into()])).unwrap();

    assert_eq!(
        orch.service().uploads(),
        vec![Call::Update {
            slug: "legacy-b".into(),
            file: "b.po".into(),
            format: "PO".into()
        }]
    );
}

#[test]
fn push_checks_project_under_prefixed_slug() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.push(&PushFilter::All).unwrap();
    assert_eq!(
        orch.service().calls()[0],
        Call::ProjectExists("onshape-newton".into())
    );
}

#[test]
fn push_changed_files_uploads_only_listed_english_files() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());

    let listed = vec![
        "proj/b.po".to_string(),
        "README.md".to_string(),
        "proj/b_fr.po".to_string(),
    ];
    let outcome = orch.push(&PushFilter::ChangedFiles(listed)).unwrap();

    assert_eq!(outcome.summary(), "1 resource(s) found in 3 changed files");
    assert_eq!(outcome.uploads.len(), 1);
    assert_eq!(outcome.uploads[0].path, repo.path("proj/b.po"));
    assert!(!outcome.snapshot_written);
}

#[test]
fn push_hash_compare_uploads_new_files_and_writes_english_snapshot() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());

    let outcome = orch
        .push(&PushFilter::HashCompare(repo.location()))
        .unwrap();

    assert_eq!(outcome.summary(), "2 changed/new resource(s) out of 2 total");
    assert!(outcome.snapshot_written);

    let key = SnapshotKey::new("master", "newton").with_suffix(ENGLISH_SNAPSHOT_SUFFIX);
    let stored = snapshot::load_at(repo.checksums.path(), &key);
    assert_eq!(
        stored.keys().cloned().collect::<Vec<_>>(),
        ["proj/a.po", "proj/b.po"]
    );
    assert!(repo
        .checksums
        .path()
        .join("master_newton_english.json")
        .exists());
}

#[test]
fn second_hash_compare_push_uploads_nothing() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.push(&PushFilter::HashCompare(repo.location())).unwrap();

    let mut again = repo.orchestrator(PO_SPEC, FakeService::with_remote(&["a.po", "b.po"]));
    let outcome = again
        .push(&PushFilter::HashCompare(repo.location()))
        .unwrap();

    assert!(outcome.uploads.is_empty());
    assert!(again.service().uploads().is_empty());
    assert!(outcome.snapshot_written, "snapshot is rewritten even with no uploads");
}

#[test]
fn hash_compare_uploads_only_edited_file() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.push(&PushFilter::HashCompare(repo.location())).unwrap();

    fs::write(repo.path("proj/b.po"), "msgid \"b changed\"\n").unwrap();
    let mut again = repo.orchestrator(PO_SPEC, FakeService::with_remote(&["a.po", "b.po"]));
    let outcome = again
        .push(&PushFilter::HashCompare(repo.location()))
        .unwrap();

    assert_eq!(
        again.service().uploads(),
        vec![Call::Update {
            slug: "bpo".into(),
            file: "b.po".into(),
            format: "PO".into()
        }]
    );
    assert_eq!(outcome.summary(), "1 changed/new resource(s) out of 2 total");
}

#[test]
fn mtime_only_change_is_not_an_upload() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.push(&PushFilter::HashCompare(repo.location())).unwrap();

    let later = FileTime::from_system_time(SystemTime::now() + Duration::from_secs(3600));
    set_file_mtime(repo.path("proj/a.po"), later).unwrap();

    let mut again = repo.orchestrator(PO_SPEC, FakeService::with_remote(&["a.po", "b.po"]));
    let outcome = again
        .push(&PushFilter::HashCompare(repo.location()))
        .unwrap();
    assert!(outcome.uploads.is_empty());
}

#[test]
fn unsupported_format_uploads_nothing() {
    let repo = Repo::new(&[("docs/a.po", "x"), ("docs/notes.txt", "y")]);
    let json = r#"{"resources": [["docs/*", "_", null]], "langs": [{"fr": null}]}"#;
    let mut orch = repo.orchestrator(json, FakeService::default());

    let err = orch.push(&PushFilter::All).unwrap_err();

    assert!(matches!(err, SyncError::UnsupportedFormat { .. }), "got: {err}");
    assert!(orch.service().uploads().is_empty());
}

#[test]
fn missing_project_fails_before_touching_the_filesystem() {
    // The wildcard directory does not exist; resolution would fail if reached.
    let repo = Repo::new(&[]);
    let json = r#"{"resources": [["nowhere/*.po", "_", null]], "langs": [{"fr": null}]}"#;
    let service = FakeService {
        missing_project: true,
        ..FakeService::default()
    };
    let mut orch = repo.orchestrator(json, service);

    let err = orch.push(&PushFilter::All).unwrap_err();
    assert!(matches!(err, SyncError::ProjectNotFound { ref slug } if slug == "onshape-newton"));
    assert_eq!(orch.service().calls().len(), 1);

    let err = orch.pull(&repo.location()).unwrap_err();
    assert!(matches!(err, SyncError::ProjectNotFound { .. }), "got: {err}");
}

#[test]
fn templated_english_file_must_exist_for_hash_compare() {
    let repo = Repo::new(&[]);
    let json = r#"{"resources": [["app/%s.lproj/L.strings", "", "en"]], "langs": [{"fr": null}]}"#;
    let mut orch = repo.orchestrator(json, FakeService::default());

    let err = orch
        .push(&PushFilter::HashCompare(repo.location()))
        .unwrap_err();
    assert!(matches!(err, SyncError::FileMissing { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

#[test]
fn pull_downloads_every_translation_and_reports_changes() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());

    let outcome = orch.pull(&repo.location()).unwrap();

    assert_eq!(outcome.status(), SyncStatus::Ok);
    let relative: Vec<_> = outcome.rows.iter().map(|r| r.relative.as_str()).collect();
    assert_eq!(
        relative,
        ["proj/a_fr.po", "proj/b_fr.po", "proj/a_de.po", "proj/b_de.po"]
    );
    assert!(outcome.rows.iter().all(|r| r.changed));
    assert_eq!(outcome.rows[0].resource, "a.po");
    assert_eq!(outcome.rows[0].language, "fr");
    assert_eq!(outcome.rows[0].stats.completed, "80%");

    assert!(repo.path("proj/a_fr.po").exists());
    assert!(orch.service().calls().contains(&Call::FetchTranslation {
        resource: "apo".into(),
        language: "de".into()
    }));
}

#[test]
fn pull_never_writes_a_snapshot() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.pull(&repo.location()).unwrap();
    assert_eq!(fs::read_dir(repo.checksums.path()).unwrap().count(), 0);
}

#[test]
fn pull_after_snapshot_reports_no_changes() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.pull(&repo.location()).unwrap();
    orch.write_snapshot(&repo.location(), None, false).unwrap();

    let mut again = repo.orchestrator(PO_SPEC, FakeService::default());
    let outcome = again.pull(&repo.location()).unwrap();

    assert_eq!(outcome.status(), SyncStatus::NoChanges);
    assert!(outcome.changed.is_empty());
    assert!(outcome.rows.iter().all(|r| !r.changed));
}

#[test]
fn pull_flags_only_translations_with_new_content() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    orch.pull(&repo.location()).unwrap();
    orch.write_snapshot(&repo.location(), None, false).unwrap();

    let service = FakeService::default();
    service.set_translation("bpo", "fr", "msgstr \"nouveau\"\n");
    let mut again = repo.orchestrator(PO_SPEC, service);
    let outcome = again.pull(&repo.location()).unwrap();

    assert_eq!(outcome.changed, ["proj/b_fr.po"]);
    assert_eq!(outcome.status(), SyncStatus::Ok);
}

#[test]
fn pull_writes_under_download_path() {
    let repo = po_repo();
    let download = TempDir::new().unwrap();
    let settings = SyncSettings::new("newton").with_download_path(download.path());
    let mut orch = repo.orchestrator_with(PO_SPEC, FakeService::default(), settings);

    let outcome = orch.pull(&repo.location()).unwrap();

    assert!(download.path().join("proj/a_fr.po").exists());
    assert!(!repo.path("proj/a_fr.po").exists());
    assert_eq!(outcome.rows[0].relative, "proj/a_fr.po");

    let list = download.path().join("downloads.txt");
    orch.write_download_list(&list, &outcome).unwrap();
    let lines: Vec<_> = fs::read_to_string(&list)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "proj/a_fr.po");
}

// ---------------------------------------------------------------------------
// Snapshot command
// ---------------------------------------------------------------------------

#[test]
fn write_snapshot_english_mode_uses_suffix() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());

    let hashes = orch
        .write_snapshot(&repo.location(), Some("english"), true)
        .unwrap();

    assert_eq!(hashes.len(), 2);
    assert!(repo
        .checksums
        .path()
        .join("master_newton_english.json")
        .exists());
    assert!(orch.service().calls().is_empty());
}

#[test]
fn write_snapshot_translation_mode_needs_files_on_disk() {
    let repo = po_repo();
    let mut orch = repo.orchestrator(PO_SPEC, FakeService::default());
    let err = orch
        .write_snapshot(&repo.location(), None, false)
        .unwrap_err();
    assert!(matches!(err, SyncError::FileMissing { .. }), "got: {err}");
}
