// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed document store: one JSON file per record.

use super::{encode_document, DocumentStore};
use crate::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use sv_core::files::{escape_key, unescape_key};
use sv_core::SessionRecord;

const EXTENSION: &str = "json";

/// Document store rooted at a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// reader never observes a half-written record.
#[derive(Clone, Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() {
            return Err(StoreError::Other("empty session id".to_string()));
        }
        Ok(self.root.join(format!("{}.{EXTENSION}", escape_key(id))))
    }

    async fn read_record(&self, path: &Path) -> Result<Option<SessionRecord>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_record(&self, path: &Path, record: &SessionRecord) -> Result<(), StoreError> {
        let bytes = encode_document(record)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let path = self.path_for(id)?;
        self.read_record(&path).await
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.id)?;
        self.write_record(&path, record).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let path = self.path_for(id)?;
        let Some(mut record) = self.read_record(&path).await? else {
            return Ok(false);
        };
        record.last_updated = at;
        self.write_record(&path, &record).await?;
        Ok(true)
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match unescape_key(stem) {
                Ok(id) => ids.push(id),
                Err(e) => tracing::warn!(file = %path.display(), error = %e, "skipping unrecognised record file"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
