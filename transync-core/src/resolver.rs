//! Resource-set resolution.
//!
//! Turns a [`ResourceSpec`] into concrete paths under a repository root:
//!
//! - **English mode** ([`Resolver::english_files`]) — the source files to upload.
//! - **Translation mode** ([`Resolver::translated_files`]) — one entry per
//!   (English file, language) naming the translated file, the English resource
//!   it derives from and the service language code.
//!
//! Templated rules never touch the filesystem. Wildcard rules list their
//! directory once per call; a matching file whose stem ends in
//! `<separator><excluded code>` is an existing translation, not English.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SpecError};
use crate::spec::split_ext;
use crate::types::{FileList, ResourceRule, ResourceSpec, TemplatedRule, WildcardRule};

/// Construction-time resolver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Language suffixes treated as non-English in addition to every
    /// configured language code.
    pub base_exclusions: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_exclusions: vec!["pig_latin".to_string()],
        }
    }
}

/// Resolves a spec against the repository checked out at `root`.
#[derive(Debug, Clone)]
pub struct Resolver {
    spec: ResourceSpec,
    root: PathBuf,
    excluded: Vec<String>,
}

impl Resolver {
    pub fn new(spec: ResourceSpec, root: impl Into<PathBuf>, config: &ResolverConfig) -> Self {
        let mut excluded = config.base_exclusions.clone();
        for language in &spec.languages {
            if !excluded.contains(&language.code) {
                excluded.push(language.code.clone());
            }
        }
        Self {
            spec,
            root: root.into(),
            excluded,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Language codes whose suffix marks a file as already translated.
    pub fn excluded_codes(&self) -> &[String] {
        &self.excluded
    }

    /// Paths for either mode, without the resource/language pairing.
    pub fn resolve_paths(&self, english_only: bool) -> Result<Vec<PathBuf>, SpecError> {
        if english_only {
            self.english_files()
        } else {
            Ok(self.translated_files()?.into_paths())
        }
    }

    /// Every English source file, in rule order.
    pub fn english_files(&self) -> Result<Vec<PathBuf>, SpecError> {
        let mut files = Vec::new();
        for rule in &self.spec.resources {
            match rule {
                ResourceRule::Templated(rule) => files.push(self.root.join(rule.english_path())),
                ResourceRule::Wildcard(rule) => files.extend(self.english_candidates(rule)?),
            }
        }
        Ok(files)
    }

    /// Every translated file for every configured language, in rule order.
    pub fn translated_files(&self) -> Result<FileList, SpecError> {
        let mut list = FileList::default();
        for rule in &self.spec.resources {
            match rule {
                ResourceRule::Templated(rule) => self.push_templated(rule, &mut list),
                ResourceRule::Wildcard(rule) => self.push_wildcard(rule, &mut list)?,
            }
        }
        Ok(list)
    }

    fn push_templated(&self, rule: &TemplatedRule, list: &mut FileList) {
        let resource = rule.resource_name();
        for language in &self.spec.languages {
            list.push(
                self.root.join(rule.language_path(language)),
                resource.clone(),
                language.code.clone(),
            );
        }
    }

    fn push_wildcard(&self, rule: &WildcardRule, list: &mut FileList) -> Result<(), SpecError> {
        let english = self.english_candidates(rule)?;
        for language in &self.spec.languages {
            for file in &english {
                let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                    tracing::debug!("no resource name for non-UTF-8 file: {}", file.display());
                    continue;
                };
                let dir = file.parent().unwrap_or_else(|| Path::new(""));
                let (stem, ext) = split_ext(name);
                let base = match &rule.marker {
                    Some(marker) => stem
                        .strip_suffix(marker.as_str())
                        .ok_or_else(|| SpecError::MarkerNotSuffix {
                            file: file.clone(),
                            marker: marker.clone(),
                        })?
                        .to_string(),
                    None => format!("{stem}{}", rule.separator),
                };
                list.push(
                    dir.join(format!("{base}{}{ext}", language.native)),
                    name,
                    language.code.clone(),
                );
            }
        }
        Ok(())
    }

    /// List the rule's directory and keep English files, sorted by name.
    fn english_candidates(&self, rule: &WildcardRule) -> Result<Vec<PathBuf>, SpecError> {
        let dir = self.root.join(&rule.directory);
        let entries = std::fs::read_dir(&dir).map_err(|source| SpecError::Filesystem {
            path: dir.clone(),
            source,
        })?;

        // Lossy names only drive matching and ordering; paths come from the entry.
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !rule.matches(&name) {
                continue;
            }
            let (stem, _) = split_ext(&name);
            if self.is_translation(stem, &rule.separator) {
                tracing::debug!("skipping translated sibling: {}", entry.path().display());
                continue;
            }
            found.push((name, entry.path()));
        }
        found.sort();
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    fn is_translation(&self, stem: &str, separator: &str) -> bool {
        self.excluded.iter().any(|code| {
            stem.strip_suffix(code.as_str())
                .is_some_and(|rest| rest.ends_with(separator))
        })
    }
}
