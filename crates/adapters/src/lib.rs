// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Drivers for the document store and the overflow blob store

pub mod blob;
pub mod document;
mod error;
pub mod traced;

pub use blob::{BlobStore, FsBlobStore};
pub use document::{DocumentStore, FsDocumentStore, MAX_DOCUMENT_SIZE};
pub use error::StoreError;
pub use traced::{TracedBlobStore, TracedDocumentStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use blob::{BlobCall, BlobOp, FakeBlobStore};
#[cfg(any(test, feature = "test-support"))]
pub use document::{DocumentCall, DocumentOp, FakeDocumentStore};
