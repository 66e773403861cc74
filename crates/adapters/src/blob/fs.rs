// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed blob store: `<root>/<bucket>/<id>`

use super::BlobStore;
use crate::StoreError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sv_core::{BlobId, Bucket, IdGen, UuidIdGen};

#[derive(Clone, Debug)]
pub struct FsBlobStore<I = UuidIdGen> {
    root: PathBuf,
    id_gen: I,
}

impl FsBlobStore<UuidIdGen> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_id_gen(root, UuidIdGen)
    }
}

impl<I: IdGen> FsBlobStore<I> {
    pub fn with_id_gen(root: impl Into<PathBuf>, id_gen: I) -> Self {
        Self {
            root: root.into(),
            id_gen,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, bucket: Bucket, id: &BlobId) -> Result<PathBuf, StoreError> {
        if !id.is_well_formed() {
            return Err(StoreError::Other(format!("malformed blob id {id:?}")));
        }
        Ok(self.root.join(bucket.as_str()).join(id.as_str()))
    }
}

#[async_trait]
impl<I: IdGen + 'static> BlobStore for FsBlobStore<I> {
    async fn write(&self, bucket: Bucket, data: &[u8]) -> Result<BlobId, StoreError> {
        let id = self.id_gen.next();
        let path = self.path_for(bucket, &id)?;
        tokio::fs::create_dir_all(self.root.join(bucket.as_str())).await?;

        let tmp = path.with_extension("partial");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(id)
    }

    async fn read(&self, bucket: Bucket, id: &BlobId) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(bucket, id)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, bucket: Bucket, id: &BlobId) -> Result<bool, StoreError> {
        let path = self.path_for(bucket, id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
