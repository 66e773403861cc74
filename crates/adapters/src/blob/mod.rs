// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overflow store for payloads too large for a document

mod fs;

pub use fs::FsBlobStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BlobCall, BlobOp, FakeBlobStore};

use crate::StoreError;
use async_trait::async_trait;
use sv_core::{BlobId, Bucket};

/// Store for arbitrarily large binary objects keyed by opaque id
#[async_trait]
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// Store `data` under a freshly generated id
    async fn write(&self, bucket: Bucket, data: &[u8]) -> Result<BlobId, StoreError>;

    /// Fetch an object, `None` if it does not exist
    async fn read(&self, bucket: Bucket, id: &BlobId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove an object; `false` if there was nothing to remove
    async fn delete(&self, bucket: Bucket, id: &BlobId) -> Result<bool, StoreError>;
}
