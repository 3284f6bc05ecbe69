//! Change detection by content hash.
//!
//! Files are hashed with SHA-256 over their raw bytes, read through a fixed
//! size buffer. A file is *changed-or-new* when its relative path is absent
//! from the previous snapshot or maps to a different digest.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};
use crate::snapshot::HashSnapshot;

/// Read buffer used by [`hash_file`].
pub const HASH_BUFFER_SIZE: usize = 8192;

/// Hex SHA-256 of the file at `path`.
pub fn hash_file(path: &Path) -> Result<String, SyncError> {
    hash_file_with_buffer(path, HASH_BUFFER_SIZE)
}

/// Like [`hash_file`] with an explicit read buffer size. The digest does not
/// depend on `buffer_size`.
pub fn hash_file_with_buffer(path: &Path, buffer_size: usize) -> Result<String, SyncError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SyncError::FileMissing {
                path: path.to_path_buf(),
            })
        }
        Err(err) => return Err(io_err(path, err)),
    };

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_err(path, err)),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Snapshot key for `path`: relative to `base`, `/`-separated.
///
/// Paths outside `base` keep their full form.
pub fn relative_key(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    if relative.has_root() {
        return relative.to_string_lossy().into_owned();
    }
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Hash every file in `files`, keyed relative to `base`.
pub fn current_hashes(files: &[PathBuf], base: &Path) -> Result<HashSnapshot, SyncError> {
    let mut hashes = HashSnapshot::new();
    for file in files {
        hashes.insert(relative_key(file, base), hash_file(file)?);
    }
    Ok(hashes)
}

/// Keys of `current` that are new or differ from `previous`, sorted.
pub fn changed_between(current: &HashSnapshot, previous: &HashSnapshot) -> Vec<String> {
    current
        .iter()
        .filter(|(key, hash)| previous.get(*key) != Some(*hash))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Hash `files` and return the relative paths that changed since `previous`.
pub fn detect(
    files: &[PathBuf],
    base: &Path,
    previous: &HashSnapshot,
) -> Result<Vec<String>, SyncError> {
    let current = current_hashes(files, base)?;
    let changed = changed_between(&current, previous);
    tracing::debug!("{} of {} file(s) changed or new", changed.len(), current.len());
    Ok(changed)
}
