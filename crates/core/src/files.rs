// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File sets exchanged with the messaging client.
//!
//! A [`FileSet`] holds two groups keyed by relative path: the client's
//! database files (restored byte-for-byte) and a bounded selection of
//! downloaded files (best effort).

use crate::config::DownloadLimits;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// name -> contents, ordered so encodings are deterministic
pub type FileMap = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Error)]
pub enum FileSetError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid escaped key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
    #[error("unsafe file name {0:?}")]
    UnsafePath(String),
    #[error("base64 decode failed for {name}: {source}")]
    Base64 {
        name: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("archive encoding failed: {0}")]
    Archive(#[from] bincode::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FileSetError + '_ {
    move |source| FileSetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Database and downloaded files for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    pub database_files: FileMap,
    pub downloaded_files: FileMap,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database_file(mut self, name: impl Into<String>, contents: Vec<u8>) -> Self {
        self.database_files.insert(name.into(), contents);
        self
    }

    pub fn with_downloaded_file(mut self, name: impl Into<String>, contents: Vec<u8>) -> Self {
        self.downloaded_files.insert(name.into(), contents);
        self
    }

    pub fn database_size(&self) -> u64 {
        group_size(&self.database_files)
    }

    pub fn downloaded_size(&self) -> u64 {
        group_size(&self.downloaded_files)
    }

    pub fn total_size(&self) -> u64 {
        self.database_size() + self.downloaded_size()
    }

    pub fn file_count(&self) -> usize {
        self.database_files.len() + self.downloaded_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.database_files.is_empty() && self.downloaded_files.is_empty()
    }

    /// Read a client's files from disk.
    ///
    /// Every regular file under `database_dir` is taken. Downloaded files
    /// are taken in name order, skipping files over the size ceiling,
    /// until the count limit is reached.
    pub fn collect(
        database_dir: &Path,
        downloads_dir: Option<&Path>,
        limits: &DownloadLimits,
    ) -> Result<Self, FileSetError> {
        let mut set = FileSet::new();

        for (name, path) in walk(database_dir)? {
            let contents = fs::read(&path).map_err(io_error(&path))?;
            set.database_files.insert(name, contents);
        }

        if let Some(dir) = downloads_dir.filter(|d| d.is_dir()) {
            for (name, path) in walk(dir)? {
                if set.downloaded_files.len() >= limits.max_files {
                    tracing::debug!(max = limits.max_files, "download count limit reached");
                    break;
                }
                let len = fs::metadata(&path).map_err(io_error(&path))?.len();
                if len > limits.max_file_size {
                    tracing::debug!(name = %name, len, "skipping oversized download");
                    continue;
                }
                let contents = fs::read(&path).map_err(io_error(&path))?;
                set.downloaded_files.insert(name, contents);
            }
        }

        Ok(set)
    }

    /// Write the file set back to disk, creating directories as needed.
    pub fn restore(
        &self,
        database_dir: &Path,
        downloads_dir: Option<&Path>,
    ) -> Result<(), FileSetError> {
        write_group(database_dir, &self.database_files)?;
        if let Some(dir) = downloads_dir {
            write_group(dir, &self.downloaded_files)?;
        }
        Ok(())
    }
}

fn group_size(files: &FileMap) -> u64 {
    files.values().map(|v| v.len() as u64).sum()
}

/// Regular files under `root` as (relative name, path), sorted by name.
fn walk(root: &Path) -> Result<Vec<(String, PathBuf)>, FileSetError> {
    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(io_error(&dir))? {
            let entry = entry.map_err(io_error(&dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(io_error(&path))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push((name, path));
            }
        }
    }

    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

fn write_group(root: &Path, files: &FileMap) -> Result<(), FileSetError> {
    for (name, contents) in files {
        let path = safe_join(root, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&path, contents).map_err(io_error(&path))?;
    }
    Ok(())
}

/// Join a stored relative name onto `root`, refusing anything that
/// would land outside it.
pub fn safe_join(root: &Path, name: &str) -> Result<PathBuf, FileSetError> {
    let relative = Path::new(name);
    let clean = !name.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !clean {
        return Err(FileSetError::UnsafePath(name.to_string()));
    }
    Ok(root.join(relative))
}

// =============================================================================
// Document key escaping
// =============================================================================

const ESCAPED: &[(char, &str)] = &[
    ('%', "%25"),
    ('.', "%2E"),
    ('$', "%24"),
    ('/', "%2F"),
    ('\\', "%5C"),
];

/// Escape a file name for use as a document key.
///
/// Document keys may not contain `.` or `$`, and path separators are
/// escaped so nested names stay flat.
pub fn escape_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match ESCAPED.iter().find(|(raw, _)| *raw == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_key`].
pub fn unescape_key(key: &str) -> Result<String, FileSetError> {
    let invalid = |reason: &str| FileSetError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let hex: String = chars.by_ref().take(2).collect();
        let raw = ESCAPED
            .iter()
            .find(|(_, escaped)| escaped[1..].eq_ignore_ascii_case(&hex))
            .map(|(raw, _)| *raw)
            .ok_or_else(|| invalid("unknown escape sequence"))?;
        out.push(raw);
    }
    Ok(out)
}

// =============================================================================
// Encodings
// =============================================================================

/// Escaped name -> Base64 map stored inline on a session record
pub fn encode_inline(files: &FileMap) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(name, contents)| (escape_key(name), BASE64.encode(contents)))
        .collect()
}

/// Inverse of [`encode_inline`].
pub fn decode_inline(encoded: &BTreeMap<String, String>) -> Result<FileMap, FileSetError> {
    let mut files = FileMap::new();
    for (key, value) in encoded {
        let name = unescape_key(key)?;
        let contents = BASE64
            .decode(value)
            .map_err(|source| FileSetError::Base64 {
                name: name.clone(),
                source,
            })?;
        files.insert(name, contents);
    }
    Ok(files)
}

/// Canonical byte stream for a file group
pub fn encode_group(files: &FileMap) -> Result<Vec<u8>, FileSetError> {
    Ok(bincode::serialize(files)?)
}

/// Inverse of [`encode_group`].
pub fn decode_group(stream: &[u8]) -> Result<FileMap, FileSetError> {
    Ok(bincode::deserialize(stream)?)
}

/// Hex SHA-256 over a canonical stream
pub fn integrity_hash(stream: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stream);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
