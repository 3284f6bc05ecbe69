//! Transifex credentials file and path expansion.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// `{"username": ..., "password": ...}`
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read credentials file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid credentials file {}", path.display()))
    }
}

/// Expand a leading `~` and `$VAR` / `${VAR}` references.
///
/// Unset variables are left as written.
pub fn expand_path(raw: &str) -> PathBuf {
    let vars = expand_vars(raw);
    if vars == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = vars.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(vars)
}

fn expand_vars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, tail, written) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], &braced[end + 1..], &rest[pos..pos + end + 3]),
                None => ("", after, "$"),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], &after[end..], &rest[pos..pos + end + 1])
        };
        match std::env::var(name) {
            Ok(value) if !name.is_empty() => out.push_str(&value),
            _ => out.push_str(written),
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}
