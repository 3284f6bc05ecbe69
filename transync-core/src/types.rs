//! Domain types for resource specs and resolved file lists.
//!
//! A [`ResourceSpec`] is loaded once per run (see [`crate::spec`]) and never
//! mutated afterwards. Rules are classified into [`ResourceRule::Templated`] or
//! [`ResourceRule::Wildcard`] at load time.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::GlobMatcher;

/// Token substituted with a language segment in templated rules.
pub const PLACEHOLDER: &str = "%s";

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

/// A configured target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    /// Code used by the translation service (e.g. `zh_CN`).
    pub code: String,
    /// Code used in file names on disk. Defaults to `code`.
    pub native: String,
}

impl Language {
    pub fn new(code: impl Into<String>, native: Option<String>) -> Self {
        let code = code.into();
        let native = native
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| code.clone());
        Self { code, native }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code == self.native {
            self.code.fmt(f)
        } else {
            write!(f, "{} ({})", self.code, self.native)
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Path template with a single `%s` placeholder, e.g.
/// `app/%s.lproj/Localizable.strings` or `res/values%s/strings.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedRule {
    pub template: String,
    /// Prepended to the native code when rendering a translated path.
    pub language_prefix: String,
    /// Rendered into the placeholder for the English variant.
    pub english_marker: String,
}

impl TemplatedRule {
    /// Render the template with `segment` in place of the placeholder.
    pub fn render(&self, segment: &str) -> String {
        self.template.replacen(PLACEHOLDER, segment, 1)
    }

    pub fn english_path(&self) -> String {
        self.render(&self.english_marker)
    }

    pub fn language_path(&self, language: &Language) -> String {
        self.render(&format!("{}{}", self.language_prefix, language.native))
    }

    /// Base name of the English variant; the service keys resources by it.
    pub fn resource_name(&self) -> String {
        let english = self.english_path();
        Path::new(&english)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(english)
    }
}

/// Directory plus file-name glob, with languages encoded as a stem suffix,
/// e.g. `core/l10n/*.properties` holding `messages.properties` and
/// `messages_fr.properties`.
#[derive(Debug, Clone)]
pub struct WildcardRule {
    /// Directory relative to the repository root.
    pub directory: PathBuf,
    /// Glob every English file name must match.
    pub file_glob: String,
    /// Separates the stem from the language code.
    pub separator: String,
    /// Stem suffix carried by English files (e.g. `en` in `strings_en.po`).
    pub marker: Option<String>,
    pub(crate) matcher: GlobMatcher,
}

impl WildcardRule {
    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }
}

/// One entry of the spec's `resources` array.
#[derive(Debug, Clone)]
pub enum ResourceRule {
    Templated(TemplatedRule),
    Wildcard(WildcardRule),
}

/// Parsed resource spec: which files are localizable and into which languages.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub resources: Vec<ResourceRule>,
    pub languages: Vec<Language>,
}

// ---------------------------------------------------------------------------
// Resolved output
// ---------------------------------------------------------------------------

/// One translated file together with what it is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry<'a> {
    pub path: &'a Path,
    /// Base name of the English file this translation derives from.
    pub resource: &'a str,
    /// Service language code.
    pub language: &'a str,
}

/// Translation-mode resolver output: three aligned sequences.
///
/// Index `i` across [`paths`](Self::paths), [`resource_names`](Self::resource_names)
/// and [`language_codes`](Self::language_codes) describes one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    paths: Vec<PathBuf>,
    resource_names: Vec<String>,
    language_codes: Vec<String>,
}

impl FileList {
    pub fn push(
        &mut self,
        path: PathBuf,
        resource: impl Into<String>,
        language: impl Into<String>,
    ) {
        self.paths.push(path);
        self.resource_names.push(resource.into());
        self.language_codes.push(language.into());
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn resource_names(&self) -> &[String] {
        &self.resource_names
    }

    pub fn language_codes(&self) -> &[String] {
        &self.language_codes
    }

    pub fn iter(&self) -> impl Iterator<Item = FileEntry<'_>> {
        self.paths
            .iter()
            .zip(&self.resource_names)
            .zip(&self.language_codes)
            .map(|((path, resource), language)| FileEntry {
                path,
                resource,
                language,
            })
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}
