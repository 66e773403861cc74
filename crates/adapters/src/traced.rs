// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrappers for consistent observability

use crate::blob::BlobStore;
use crate::document::DocumentStore;
use crate::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Instant;
use sv_core::{BlobId, Bucket, SessionRecord};
use tracing::Instrument;

/// Wrapper that adds tracing to any DocumentStore
#[derive(Clone)]
pub struct TracedDocumentStore<S> {
    inner: S,
}

impl<S> TracedDocumentStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for TracedDocumentStore<S> {
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let span = tracing::info_span!("document.get", session_id = id);
        async {
            let result = self.inner.get(id).await;
            match &result {
                Ok(found) => tracing::debug!(found = found.is_some(), "fetched"),
                Err(e) => tracing::error!(error = %e, "get failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let span = tracing::info_span!("document.upsert", session_id = %record.id);
        async {
            let start = Instant::now();
            let result = self.inner.upsert(record).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(
                    version = record.storage.as_ref().map(|s| s.version()),
                    elapsed_ms,
                    "record written"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "upsert failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let span = tracing::info_span!("document.delete", session_id = id);
        async {
            let result = self.inner.delete(id).await;
            match &result {
                Ok(existed) => tracing::info!(existed, "record deleted"),
                Err(e) => tracing::error!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = self.inner.touch(id, at).await;
        tracing::trace!(session_id = id, touched = ?result.as_ref().ok(), "touched");
        result
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let result = self.inner.list_ids().await;
        match &result {
            Ok(ids) => tracing::debug!(count = ids.len(), "listed records"),
            Err(e) => tracing::error!(error = %e, "list failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any BlobStore
#[derive(Clone)]
pub struct TracedBlobStore<B> {
    inner: B,
}

impl<B> TracedBlobStore<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: BlobStore> BlobStore for TracedBlobStore<B> {
    async fn write(&self, bucket: Bucket, data: &[u8]) -> Result<BlobId, StoreError> {
        let span = tracing::info_span!("blob.write", %bucket, len = data.len());
        async {
            let start = Instant::now();
            let result = self.inner.write(bucket, data).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(id) => tracing::info!(blob_id = %id, elapsed_ms, "blob written"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "write failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn read(&self, bucket: Bucket, id: &BlobId) -> Result<Option<Vec<u8>>, StoreError> {
        let span = tracing::info_span!("blob.read", %bucket, blob_id = %id);
        async {
            let result = self.inner.read(bucket, id).await;
            match &result {
                Ok(Some(data)) => tracing::debug!(len = data.len(), "blob read"),
                Ok(None) => tracing::warn!("blob missing"),
                Err(e) => tracing::error!(error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, bucket: Bucket, id: &BlobId) -> Result<bool, StoreError> {
        let span = tracing::info_span!("blob.delete", %bucket, blob_id = %id);
        async {
            let result = self.inner.delete(bucket, id).await;
            // deleting an already-missing object is routine
            match &result {
                Ok(existed) => tracing::debug!(existed, "blob deleted"),
                Err(e) => tracing::warn!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
