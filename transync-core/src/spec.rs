//! Resource spec loading.
//!
//! # File format
//!
//! ```json
//! {
//!   "resources": [
//!     ["project/translations/*.po", "_", null],
//!     ["app/%s.lproj/Localizable.strings", "", "en"]
//!   ],
//!   "langs": [{"fr": null}, {"zh_CN": "zh-Hans"}]
//! }
//! ```
//!
//! A rule whose path contains `%s` is templated; anything else is a wildcard
//! rule. The classification happens here, once, so the resolver never has to
//! re-inspect the raw strings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::Glob;
use serde::Deserialize;

use crate::error::{format_err, io_err, SpecError};
use crate::types::{
    Language, ResourceRule, ResourceSpec, TemplatedRule, WildcardRule, PLACEHOLDER,
};

#[derive(Debug, Deserialize)]
struct RawSpec {
    resources: Vec<(String, String, Option<String>)>,
    langs: Vec<BTreeMap<String, Option<String>>>,
}

/// Load `<root>/<file>`.
///
/// A missing file is [`SpecError::Io`]; malformed JSON, missing keys, or an
/// invalid rule is [`SpecError::SpecFormat`].
pub fn load_at(root: &Path, file: &Path) -> Result<ResourceSpec, SpecError> {
    let path = root.join(file);
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    parse(&path, &contents)
}

/// Parse spec JSON. `origin` is only used in error messages.
pub fn parse(origin: &Path, contents: &str) -> Result<ResourceSpec, SpecError> {
    let raw: RawSpec =
        serde_json::from_str(contents).map_err(|e| format_err(origin, e.to_string()))?;

    let mut languages = Vec::with_capacity(raw.langs.len());
    for (idx, entry) in raw.langs.into_iter().enumerate() {
        if entry.len() != 1 {
            return Err(format_err(
                origin,
                format!("langs[{idx}] must hold exactly one code, found {}", entry.len()),
            ));
        }
        for (code, native) in entry {
            if code.is_empty() {
                return Err(format_err(origin, format!("langs[{idx}] has an empty code")));
            }
            languages.push(Language::new(code, native));
        }
    }

    let resources = raw
        .resources
        .into_iter()
        .enumerate()
        .map(|(idx, (pattern, prefix, marker))| parse_rule(origin, idx, pattern, prefix, marker))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResourceSpec {
        resources,
        languages,
    })
}

fn parse_rule(
    origin: &Path,
    idx: usize,
    pattern: String,
    prefix: String,
    marker: Option<String>,
) -> Result<ResourceRule, SpecError> {
    if pattern.is_empty() {
        return Err(format_err(origin, format!("resources[{idx}] has an empty path")));
    }

    match pattern.matches(PLACEHOLDER).count() {
        0 => parse_wildcard(origin, idx, &pattern, prefix, marker).map(ResourceRule::Wildcard),
        1 => Ok(ResourceRule::Templated(TemplatedRule {
            template: pattern,
            language_prefix: prefix,
            english_marker: marker.unwrap_or_default(),
        })),
        n => Err(format_err(
            origin,
            format!("resources[{idx}] '{pattern}' has {n} '{PLACEHOLDER}' placeholders, expected one"),
        )),
    }
}

fn parse_wildcard(
    origin: &Path,
    idx: usize,
    pattern: &str,
    separator: String,
    marker: Option<String>,
) -> Result<WildcardRule, SpecError> {
    let path = Path::new(pattern);
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Err(format_err(
            origin,
            format!("resources[{idx}] '{pattern}' has no file name"),
        ));
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // An empty marker behaves like no marker at all.
    let marker = marker.filter(|m| !m.is_empty());
    let file_glob = match &marker {
        Some(marker) => {
            let (stem, ext) = split_ext(&file_name);
            format!("{stem}{separator}{marker}{ext}")
        }
        None => file_name,
    };

    let matcher = Glob::new(&file_glob)
        .map_err(|e| format_err(origin, format!("resources[{idx}] bad glob '{file_glob}': {e}")))?
        .compile_matcher();

    Ok(WildcardRule {
        directory,
        file_glob,
        separator,
        marker,
        matcher,
    })
}

/// Split a file name into stem and extension (extension keeps its dot).
///
/// Leading dots belong to the stem, so `.env` has no extension.
pub fn split_ext(name: &str) -> (&str, &str) {
    let lead = name.len() - name.trim_start_matches('.').len();
    match name[lead..].rfind('.') {
        Some(i) => name.split_at(lead + i),
        None => (name, ""),
    }
}
