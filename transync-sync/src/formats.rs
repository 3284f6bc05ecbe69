//! File extension → upload format lookup.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::SyncError;

/// Maps a file extension (without the dot) to the service's format name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTable {
    by_extension: BTreeMap<String, String>,
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::new([
            ("po", "PO"),
            ("properties", "UNICODEPROPERTIES"),
            ("html", "HTML"),
            ("strings", "STRINGS"),
            ("xml", "ANDROID"),
            ("json", "CHROME"),
            ("ts", "QT"),
        ])
    }
}

impl FormatTable {
    pub fn new<I, E, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (E, F)>,
        E: Into<String>,
        F: Into<String>,
    {
        Self {
            by_extension: entries
                .into_iter()
                .map(|(ext, format)| (ext.into(), format.into()))
                .collect(),
        }
    }

    /// Upload format for `path`, or [`SyncError::UnsupportedFormat`].
    pub fn lookup(&self, path: &Path) -> Result<&str, SyncError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_extension.get(ext))
            .map(String::as_str)
            .ok_or_else(|| SyncError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}
