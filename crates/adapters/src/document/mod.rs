// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document store holding one session record per client

mod fs;

pub use fs::FsDocumentStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DocumentCall, DocumentOp, FakeDocumentStore};

use crate::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sv_core::sizing::DOCUMENT_LIMIT;
use sv_core::SessionRecord;

/// Largest serialized record a driver accepts
pub const MAX_DOCUMENT_SIZE: u64 = DOCUMENT_LIMIT;

/// Bounded-size document storage with atomic per-document writes
#[async_trait]
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Fetch a record, `None` if it does not exist
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Insert or replace a record atomically
    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Remove a record; `false` if there was nothing to remove
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Bump a record's last-updated timestamp; `false` if it does not exist
    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Ids of every stored record
    async fn list_ids(&self) -> Result<Vec<String>, StoreError>;
}

/// Serialize a record, enforcing the per-document ceiling.
pub(crate) fn encode_document(record: &SessionRecord) -> Result<Vec<u8>, StoreError> {
    let bytes = serde_json::to_vec(record)?;
    let size = bytes.len() as u64;
    if size > MAX_DOCUMENT_SIZE {
        return Err(StoreError::DocumentTooLarge {
            size,
            limit: MAX_DOCUMENT_SIZE,
        });
    }
    Ok(bytes)
}
